// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        EventRepository, LodgeRepository, PgWorkflowStore, ProfessionRepository,
        RequestRepository, SetupRepository, UserRepository,
    },
    services::{
        approval::ApprovalService,
        auth::AuthService,
        event_sync::EventService,
        google_calendar::GoogleCalendarService,
        notifier::{Notifier, ResendTransport},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,

    pub user_repo: UserRepository,
    pub lodge_repo: LodgeRepository,
    pub event_repo: EventRepository,
    pub request_repo: RequestRepository,
    pub setup_repo: SetupRepository,
    pub profession_repo: ProfessionRepository,

    pub auth_service: AuthService,
    pub approval_service: ApprovalService,
    pub event_service: EventService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let resend_api_key = env::var("RESEND_API_KEY").expect("RESEND_API_KEY deve ser definida");
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "agenda@agendamaconica.site".to_string());
        let google_token_path =
            env::var("GOOGLE_TOKEN_PATH").unwrap_or_else(|_| "token.json".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let lodge_repo = LodgeRepository::new(db_pool.clone());
        let event_repo = EventRepository::new(db_pool.clone());
        let request_repo = RequestRepository::new(db_pool.clone());
        let setup_repo = SetupRepository::new(db_pool.clone());
        let profession_repo = ProfessionRepository::new(db_pool.clone());

        let transport = Arc::new(ResendTransport::new(resend_api_key)?);
        let notifier = Notifier::new(transport, mail_from);

        let calendar = Arc::new(GoogleCalendarService::new(
            google_token_path.into(),
            setup_repo.clone(),
            notifier.clone(),
        ));

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);

        let workflow_store = Arc::new(PgWorkflowStore::new(
            request_repo.clone(),
            lodge_repo.clone(),
            user_repo.clone(),
            setup_repo.clone(),
        ));
        let approval_service = ApprovalService::new(workflow_store, notifier.clone());

        let event_service = EventService::new(
            event_repo.clone(),
            lodge_repo.clone(),
            user_repo.clone(),
            setup_repo.clone(),
            calendar,
            notifier,
        );

        Ok(Self {
            db_pool,
            user_repo,
            lodge_repo,
            event_repo,
            request_repo,
            setup_repo,
            profession_repo,
            auth_service,
            approval_service,
            event_service,
        })
    }
}
