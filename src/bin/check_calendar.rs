// src/bin/check_calendar.rs
//
// Job agendado: um invocador externo (cron) roda este binário para
// consultar a entrada mais recente da agenda e registrar o resultado.
// Falha na consulta vira e-mail para o administrador configurado e log;
// o processo sai com código 0 de qualquer jeito (checagem de melhor
// esforço).

use std::env;
use std::sync::Arc;
use std::time::Duration;

use minijinja::context;
use sqlx::postgres::PgPoolOptions;

use agenda_maconica::db::SetupRepository;
use agenda_maconica::services::google_calendar::{CalendarPort, GoogleCalendarService};
use agenda_maconica::services::notifier::{Notifier, ResendTransport};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
    let resend_api_key = env::var("RESEND_API_KEY").expect("RESEND_API_KEY deve ser definida");
    let mail_from =
        env::var("MAIL_FROM").unwrap_or_else(|_| "agenda@agendamaconica.site".to_string());
    let google_token_path =
        env::var("GOOGLE_TOKEN_PATH").unwrap_or_else(|_| "token.json".to_string());

    let db_pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .expect("Falha ao conectar ao banco de dados");

    let setup_repo = SetupRepository::new(db_pool);
    let transport =
        Arc::new(ResendTransport::new(resend_api_key).expect("Falha ao montar o transporte"));
    let notifier = Notifier::new(transport, mail_from);
    let calendar = GoogleCalendarService::new(
        google_token_path.into(),
        setup_repo.clone(),
        notifier.clone(),
    );

    tracing::info!("Iniciando a checagem do último evento da agenda");

    match calendar.last_event().await {
        Ok(Some(entry)) => {
            tracing::info!(
                "Último evento encontrado: {}",
                entry.summary.as_deref().unwrap_or("(sem título)")
            );
            if let Some(start) = entry.start.and_then(|s| s.date_time) {
                tracing::info!("Início: {}", start);
            }
        }
        Ok(None) => {
            tracing::info!("Nenhum evento encontrado na agenda");
        }
        Err(e) => {
            tracing::error!("Erro ao consultar o último evento: {}", e);

            match setup_repo.get().await {
                Ok(Some(setup)) if !setup.admin_email.is_empty() => {
                    let result = notifier
                        .send(
                            "Erro ao consultar o último evento",
                            "email/google_calendar_error.html",
                            context! {
                                operation => "Checagem do último evento",
                                error_message => e.to_string(),
                            },
                            &[setup.admin_email],
                        )
                        .await;
                    if let Err(mail_error) = result {
                        tracing::error!("Erro ao enviar a notificação de erro: {}", mail_error);
                    }
                }
                Ok(_) => {
                    tracing::warn!("Sem configuração: erro não notificado ao administrador.");
                }
                Err(setup_error) => {
                    tracing::error!("Falha ao ler a configuração: {}", setup_error);
                }
            }
        }
    }

    tracing::info!("Checagem concluída");
}
