// src/services/approval.rs
//
// O motor do fluxo de aprovação. Em vez de gatilhos implícitos de
// gravação, cada aprovação é um método de serviço chamado pelo handler
// que vira a flag, com resultado tipado: o chamador enxerga sucesso,
// sucesso com avisos ou falha do efeito derivado, sem precisar garimpar
// logs. A virada da flag é um compare-and-swap, então dois operadores
// aprovando a mesma solicitação ao mesmo tempo não provisionam duas vezes.
//
// Política de melhor esforço preservada: depois que a flag virou, falha em
// efeito derivado (e-mail, associação de loja) degrada para aviso e o
// fluxo segue para o próximo passo.

use std::sync::Arc;

use async_trait::async_trait;
use minijinja::context;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::user_repo::NewStaffUser,
    models::{
        auth::User,
        lodge::Lodge,
        request::{StoreRequest, SubmitUserRequestPayload, UserRequest},
        setup::Setup,
    },
    services::notifier::Notifier,
};

// A fronteira de persistência do motor. A implementação Postgres fica em
// `db::workflow_store`; os testes usam uma versão em memória.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    // CAS: None quando a linha já estava aprovada.
    async fn approve_store_request(&self, id: Uuid) -> Result<Option<StoreRequest>, AppError>;
    async fn approve_user_request(&self, id: Uuid) -> Result<Option<UserRequest>, AppError>;

    async fn insert_user_request(
        &self,
        payload: &SubmitUserRequestPayload,
    ) -> Result<UserRequest, AppError>;

    async fn get_or_create_lodge(
        &self,
        name: &str,
        city: &str,
        number: Option<&str>,
    ) -> Result<(Lodge, bool), AppError>;

    async fn find_lodge_by_number(&self, number: &str) -> Result<Option<Lodge>, AppError>;
    async fn create_staff_user(&self, new: &NewStaffUser) -> Result<User, AppError>;
    async fn add_user_to_lodge(&self, user_id: Uuid, lodge_id: Uuid) -> Result<(), AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn setup(&self) -> Result<Option<Setup>, AppError>;
}

// O que a aprovação efetivamente produziu.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Provisioned {
    pub lodge_id: Option<Uuid>,
    pub lodge_created: bool,
    pub user_id: Option<Uuid>,
    pub membership_created: bool,
    pub notified: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    Succeeded {
        provisioned: Provisioned,
    },
    SucceededWithWarnings {
        provisioned: Provisioned,
        warnings: Vec<String>,
    },
    // A flag de aprovação persistiu, mas o efeito derivado principal não.
    Failed {
        error: String,
    },
}

impl Outcome {
    fn from_parts(provisioned: Provisioned, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Outcome::Succeeded { provisioned }
        } else {
            Outcome::SucceededWithWarnings {
                provisioned,
                warnings,
            }
        }
    }
}

/// Senha aleatória para contas provisionadas, no mesmo alfabeto das
/// senhas geradas pelo restante do sistema.
pub fn generate_password(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut buf = vec![0u8; length];
    OsRng.fill_bytes(&mut buf);
    buf.iter()
        .map(|b| CHARSET[*b as usize % CHARSET.len()] as char)
        .collect()
}

#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn WorkflowStore>,
    notifier: Notifier,
}

impl ApprovalService {
    pub fn new(store: Arc<dyn WorkflowStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    // --- Solicitação de loja ---

    /// Avisos pós-criação de uma solicitação de loja: alerta o
    /// administrador quando o sistema está configurado.
    pub async fn notify_store_request_created(&self, request: &StoreRequest) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.store.setup().await {
            Ok(Some(setup)) => {
                let result = self
                    .notifier
                    .send(
                        "Nova Solicitação de Criação de Loja",
                        "email/store_request_notification.html",
                        context! { store_request => request, login_url => setup.url },
                        &[setup.admin_email.clone()],
                    )
                    .await;
                if let Err(e) = result {
                    tracing::error!("Erro ao notificar nova solicitação de loja: {}", e);
                    warnings.push(format!("Falha ao notificar o administrador: {e}"));
                }
            }
            Ok(None) => {
                tracing::warn!("Sem configuração: alerta de solicitação de loja não enviado.");
                warnings.push("Sistema sem configuração: administrador não notificado.".into());
            }
            Err(e) => {
                tracing::error!("Falha ao ler a configuração: {}", e);
                warnings.push(format!("Falha ao ler a configuração: {e}"));
            }
        }

        warnings
    }

    /// Aprova a solicitação e materializa a loja. A loja é procurada pela
    /// chave de nome (get-or-create), então reaprovações após um vaivém da
    /// flag não duplicam a loja; a notificação, como no fluxo original,
    /// não é deduplicada.
    pub async fn approve_store_request(&self, id: Uuid) -> Result<Outcome, AppError> {
        let request = self
            .store
            .approve_store_request(id)
            .await?
            .ok_or(AppError::AlreadyApproved)?;

        let mut warnings = Vec::new();
        let mut provisioned = Provisioned::default();

        // Como no fluxo original, sem configuração nada é materializado:
        // a flag fica aprovada e o operador é avisado do que foi pulado.
        let setup = match self.store.setup().await? {
            Some(setup) => setup,
            None => {
                tracing::warn!(
                    "Solicitação de loja {} aprovada sem configuração: criação pulada.",
                    request.id
                );
                warnings.push(
                    "Sistema sem configuração: criação de loja e notificação puladas.".into(),
                );
                return Ok(Outcome::from_parts(provisioned, warnings));
            }
        };

        match self
            .store
            .get_or_create_lodge(&request.name, &request.city, request.number.as_deref())
            .await
        {
            Ok((lodge, created)) => {
                tracing::info!(
                    "Loja {} {}: {}",
                    lodge.id,
                    if created { "criada" } else { "reaproveitada" },
                    lodge.name
                );
                provisioned.lodge_id = Some(lodge.id);
                provisioned.lodge_created = created;

                self.notify_store_approval(&request, &lodge, &setup, &mut provisioned, &mut warnings)
                    .await;
            }
            Err(e) => {
                tracing::error!("Erro ao criar loja para a solicitação {}: {}", request.id, e);
                return Ok(Outcome::Failed {
                    error: format!("Erro ao criar a loja: {e}"),
                });
            }
        }

        Ok(Outcome::from_parts(provisioned, warnings))
    }

    async fn notify_store_approval(
        &self,
        request: &StoreRequest,
        lodge: &Lodge,
        setup: &Setup,
        provisioned: &mut Provisioned,
        warnings: &mut Vec<String>,
    ) {
        let requester = match self.store.find_user(request.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warnings.push("Solicitante não encontrado: aprovação não notificada.".into());
                return;
            }
            Err(e) => {
                warnings.push(format!("Falha ao localizar o solicitante: {e}"));
                return;
            }
        };

        let result = self
            .notifier
            .send(
                "Sua solicitação de loja foi aprovada",
                "email/store_request_approval.html",
                context! { store_request => request, lodge => lodge, login_url => setup.url },
                &[requester.email.clone()],
            )
            .await;

        match result {
            Ok(()) => provisioned.notified.push(requester.email),
            Err(e) => {
                tracing::error!("Erro ao notificar aprovação de loja: {}", e);
                warnings.push(format!("Falha ao notificar {}: {e}", requester.email));
            }
        }
    }

    // --- Solicitação de cadastro de usuário ---

    /// Formulário público: persiste a solicitação e dispara o alerta ao
    /// administrador e a confirmação ao solicitante. A persistência é a
    /// ação primária; os e-mails degradam para aviso.
    pub async fn submit_user_request(
        &self,
        payload: &SubmitUserRequestPayload,
    ) -> Result<(UserRequest, Vec<String>), AppError> {
        let request = self.store.insert_user_request(payload).await?;
        let mut warnings = Vec::new();

        match self.store.setup().await {
            Ok(Some(setup)) => {
                let result = self
                    .notifier
                    .send(
                        "Nova solicitação de cadastro de usuário",
                        "email/user_request_notification.html",
                        context! { user_request => request, login_url => setup.url },
                        &[setup.admin_email.clone()],
                    )
                    .await;
                if let Err(e) = result {
                    tracing::error!("Erro ao alertar o administrador: {}", e);
                    warnings.push(format!("Falha ao notificar o administrador: {e}"));
                }
            }
            Ok(None) => {
                tracing::warn!("Sem configuração: alerta de cadastro não enviado.");
                warnings.push("Sistema sem configuração: administrador não notificado.".into());
            }
            Err(e) => warnings.push(format!("Falha ao ler a configuração: {e}")),
        }

        let confirmation = self
            .notifier
            .send(
                "Sua solicitação de cadastro foi recebida",
                "email/user_request_confirmation.html",
                context! { user_request => request },
                &[request.email.clone()],
            )
            .await;
        if let Err(e) = confirmation {
            tracing::error!("Erro ao confirmar recebimento para {}: {}", request.email, e);
            warnings.push(format!("Falha ao confirmar para {}: {e}", request.email));
        }

        Ok((request, warnings))
    }

    /// Aprova o cadastro: gera senha, cria a conta (username = e-mail),
    /// tenta associar a loja pelo número e envia as credenciais. Conta sem
    /// associação é estado aceito; a falha vira aviso, nunca rollback.
    pub async fn approve_user_request(&self, id: Uuid) -> Result<Outcome, AppError> {
        let request = self
            .store
            .approve_user_request(id)
            .await?
            .ok_or(AppError::AlreadyApproved)?;

        let mut warnings = Vec::new();
        let mut provisioned = Provisioned::default();

        let password = generate_password(12);
        let password_clone = password.clone();
        let password_hash = tokio::task::spawn_blocking(move || {
            bcrypt::hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = NewStaffUser {
            username: request.email.clone(),
            email: request.email.clone(),
            password_hash,
            first_name: request.name.clone(),
            surname: request.surname.clone(),
            phone: Some(request.phone.clone()),
            profession_id: request.profession_id,
        };

        let user = match self.store.create_staff_user(&new_user).await {
            Ok(user) => {
                tracing::info!("Usuário criado com sucesso: {}", user.email);
                provisioned.user_id = Some(user.id);
                user
            }
            Err(e) => {
                tracing::error!("Erro ao criar usuário para {}: {}", request.email, e);
                return Ok(Outcome::Failed {
                    error: format!("Erro ao criar usuário para {}: {e}", request.email),
                });
            }
        };

        // Associação à loja: melhor esforço, a conta fica de pé sem ela.
        match self.store.find_lodge_by_number(&request.lodge_number).await {
            Ok(Some(lodge)) => match self.store.add_user_to_lodge(user.id, lodge.id).await {
                Ok(()) => {
                    tracing::info!("Usuário {} associado à loja {}", user.email, lodge.name);
                    provisioned.lodge_id = Some(lodge.id);
                    provisioned.membership_created = true;
                }
                Err(e) => {
                    tracing::error!("Erro ao associar usuário à loja: {}", e);
                    warnings.push(format!("Falha ao associar à loja {}: {e}", lodge.name));
                }
            },
            Ok(None) => {
                tracing::warn!(
                    "Loja com número {} não encontrada para {}",
                    request.lodge_number,
                    request.email
                );
                warnings.push(format!(
                    "Loja com número {} não encontrada; usuário criado sem associação.",
                    request.lodge_number
                ));
            }
            Err(e) => {
                tracing::error!("Erro ao buscar loja {}: {}", request.lodge_number, e);
                warnings.push(format!("Falha ao buscar a loja: {e}"));
            }
        }

        match self.store.setup().await {
            Ok(Some(setup)) => {
                let result = self
                    .notifier
                    .send(
                        "Sua solicitação de cadastro foi aprovada",
                        "email/user_request_approval.html",
                        context! { user => request, password => password, login_url => setup.url },
                        &[request.email.clone()],
                    )
                    .await;
                match result {
                    Ok(()) => provisioned.notified.push(request.email.clone()),
                    Err(e) => {
                        tracing::error!("Erro ao enviar credenciais para {}: {}", request.email, e);
                        warnings.push(format!("Falha ao enviar credenciais: {e}"));
                    }
                }
            }
            Ok(None) => {
                tracing::warn!(
                    "Sem configuração: credenciais de {} não enviadas.",
                    request.email
                );
                warnings.push("Sistema sem configuração: credenciais não enviadas.".into());
            }
            Err(e) => warnings.push(format!("Falha ao ler a configuração: {e}")),
        }

        Ok(Outcome::from_parts(provisioned, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::normalize_lodge_name;
    use crate::services::notifier::test_support::RecordingTransport;
    use chrono::Utc;
    use std::sync::Mutex;

    // Implementação em memória da fronteira de persistência, suficiente
    // para exercitar o motor sem banco.
    #[derive(Default)]
    struct MemStore {
        store_requests: Mutex<Vec<StoreRequest>>,
        user_requests: Mutex<Vec<UserRequest>>,
        lodges: Mutex<Vec<Lodge>>,
        users: Mutex<Vec<User>>,
        memberships: Mutex<Vec<(Uuid, Uuid)>>,
        setup: Option<Setup>,
    }

    impl MemStore {
        fn with_setup() -> Self {
            Self {
                setup: Some(Setup {
                    url: "https://sistema.example.com".into(),
                    calendar_url: "https://calendar.google.com/calendar".into(),
                    admin_email: "admin@example.com".into(),
                }),
                ..Default::default()
            }
        }

        fn push_store_request(&self, name: &str) -> Uuid {
            let requester = self.push_user("irmao@example.com");
            let request = StoreRequest {
                id: Uuid::new_v4(),
                user_id: requester,
                name: normalize_lodge_name(name),
                city: "ARACAJU".into(),
                number: Some("123".into()),
                approved: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let id = request.id;
            self.store_requests.lock().unwrap().push(request);
            id
        }

        fn push_user_request(&self, email: &str, lodge_number: &str) -> Uuid {
            let request = UserRequest {
                id: Uuid::new_v4(),
                name: "Carlos".into(),
                surname: "Silva".into(),
                email: email.into(),
                phone: "11999990000".into(),
                profession_id: None,
                message: None,
                lodge_name: "LOJA TESTE".into(),
                lodge_number: lodge_number.into(),
                approved: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let id = request.id;
            self.user_requests.lock().unwrap().push(request);
            id
        }

        fn push_user(&self, email: &str) -> Uuid {
            let user = User {
                id: Uuid::new_v4(),
                username: email.into(),
                email: email.into(),
                password_hash: "hash".into(),
                first_name: "Irmão".into(),
                surname: "Teste".into(),
                phone: None,
                profession_id: None,
                is_staff: true,
                is_superuser: false,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let id = user.id;
            self.users.lock().unwrap().push(user);
            id
        }

        fn push_lodge(&self, name: &str, number: &str) -> Uuid {
            let lodge = Lodge {
                id: Uuid::new_v4(),
                name: normalize_lodge_name(name),
                city: "ARACAJU".into(),
                number: Some(number.into()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let id = lodge.id;
            self.lodges.lock().unwrap().push(lodge);
            id
        }
    }

    #[async_trait]
    impl WorkflowStore for MemStore {
        async fn approve_store_request(
            &self,
            id: Uuid,
        ) -> Result<Option<StoreRequest>, AppError> {
            let mut requests = self.store_requests.lock().unwrap();
            match requests.iter_mut().find(|r| r.id == id && !r.approved) {
                Some(request) => {
                    request.approved = true;
                    Ok(Some(request.clone()))
                }
                None => Ok(None),
            }
        }

        async fn approve_user_request(&self, id: Uuid) -> Result<Option<UserRequest>, AppError> {
            let mut requests = self.user_requests.lock().unwrap();
            match requests.iter_mut().find(|r| r.id == id && !r.approved) {
                Some(request) => {
                    request.approved = true;
                    Ok(Some(request.clone()))
                }
                None => Ok(None),
            }
        }

        async fn insert_user_request(
            &self,
            payload: &SubmitUserRequestPayload,
        ) -> Result<UserRequest, AppError> {
            let request = UserRequest {
                id: Uuid::new_v4(),
                name: payload.name.clone(),
                surname: payload.surname.clone(),
                email: payload.email.clone(),
                phone: payload.phone.clone(),
                profession_id: payload.profession_id,
                message: payload.message.clone(),
                lodge_name: payload.lodge_name.clone(),
                lodge_number: payload.lodge_number.clone(),
                approved: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.user_requests.lock().unwrap().push(request.clone());
            Ok(request)
        }

        async fn get_or_create_lodge(
            &self,
            name: &str,
            city: &str,
            number: Option<&str>,
        ) -> Result<(Lodge, bool), AppError> {
            let normalized = normalize_lodge_name(name);
            let mut lodges = self.lodges.lock().unwrap();
            if let Some(existing) = lodges.iter().find(|l| l.name == normalized) {
                return Ok((existing.clone(), false));
            }
            let lodge = Lodge {
                id: Uuid::new_v4(),
                name: normalized,
                city: city.into(),
                number: number.map(str::to_string),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            lodges.push(lodge.clone());
            Ok((lodge, true))
        }

        async fn find_lodge_by_number(&self, number: &str) -> Result<Option<Lodge>, AppError> {
            Ok(self
                .lodges
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.number.as_deref() == Some(number))
                .cloned())
        }

        async fn create_staff_user(&self, new: &NewStaffUser) -> Result<User, AppError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new.email) {
                return Err(AppError::EmailAlreadyExists);
            }
            let user = User {
                id: Uuid::new_v4(),
                username: new.username.clone(),
                email: new.email.clone(),
                password_hash: new.password_hash.clone(),
                first_name: new.first_name.clone(),
                surname: new.surname.clone(),
                phone: new.phone.clone(),
                profession_id: new.profession_id,
                is_staff: true,
                is_superuser: false,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn add_user_to_lodge(&self, user_id: Uuid, lodge_id: Uuid) -> Result<(), AppError> {
            self.memberships.lock().unwrap().push((user_id, lodge_id));
            Ok(())
        }

        async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn setup(&self) -> Result<Option<Setup>, AppError> {
            Ok(self.setup.clone())
        }
    }

    fn service_with(store: Arc<MemStore>) -> (ApprovalService, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::new(transport.clone(), "agenda@example.com".into());
        (ApprovalService::new(store, notifier), transport)
    }

    fn sample_submission() -> SubmitUserRequestPayload {
        SubmitUserRequestPayload {
            name: "Carlos".into(),
            surname: "Silva".into(),
            email: "carlos@example.com".into(),
            phone: "11999990000".into(),
            profession_id: None,
            message: None,
            lodge_name: "LOJA TESTE".into(),
            lodge_number: "123".into(),
            terms_accepted: true,
        }
    }

    #[tokio::test]
    async fn aprovar_cadastro_cria_exatamente_um_usuario() {
        let store = Arc::new(MemStore::with_setup());
        store.push_lodge("LOJA TESTE", "123");
        let request_id = store.push_user_request("carlos@example.com", "123");
        let (service, transport) = service_with(store.clone());

        let outcome = service.approve_user_request(request_id).await.unwrap();

        let users = store.users.lock().unwrap().clone();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "carlos@example.com");
        assert_eq!(users[0].email, "carlos@example.com");
        assert!(users[0].is_staff);
        assert!(matches!(outcome, Outcome::Succeeded { .. }));

        // Credenciais enviadas ao novo usuário
        assert_eq!(
            transport.subjects(),
            vec!["Sua solicitação de cadastro foi aprovada".to_string()]
        );

        // Reaprovar a mesma linha é conflito e não cria segundo usuário
        let err = service.approve_user_request(request_id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyApproved));
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn loja_inexistente_nao_impede_a_criacao_do_usuario() {
        let store = Arc::new(MemStore::with_setup());
        let request_id = store.push_user_request("carlos@example.com", "999");
        let (service, _transport) = service_with(store.clone());

        let outcome = service.approve_user_request(request_id).await.unwrap();

        assert_eq!(store.users.lock().unwrap().len(), 1);
        assert!(store.memberships.lock().unwrap().is_empty());
        match outcome {
            Outcome::SucceededWithWarnings { provisioned, warnings } => {
                assert!(provisioned.user_id.is_some());
                assert!(!provisioned.membership_created);
                assert!(warnings.iter().any(|w| w.contains("999")));
            }
            other => panic!("resultado inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn email_duplicado_vira_falha_observavel() {
        let store = Arc::new(MemStore::with_setup());
        store.push_user("carlos@example.com");
        let request_id = store.push_user_request("carlos@example.com", "123");
        let (service, _transport) = service_with(store.clone());

        let outcome = service.approve_user_request(request_id).await.unwrap();

        assert!(matches!(outcome, Outcome::Failed { .. }));
        // A flag persiste mesmo com o efeito derivado falhando
        assert!(store.user_requests.lock().unwrap()[0].approved);
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn aprovar_loja_cria_uma_unica_loja_normalizada() {
        let store = Arc::new(MemStore::with_setup());
        let request_id = store.push_store_request("loja fulano");
        let (service, _transport) = service_with(store.clone());

        let outcome = service.approve_store_request(request_id).await.unwrap();

        let lodges = store.lodges.lock().unwrap().clone();
        assert_eq!(lodges.len(), 1);
        assert_eq!(lodges[0].name, "LOJA FULANO");
        match outcome {
            Outcome::Succeeded { provisioned } => {
                assert!(provisioned.lodge_created);
                assert_eq!(provisioned.lodge_id, Some(lodges[0].id));
            }
            other => panic!("resultado inesperado: {other:?}"),
        }

        // Outra solicitação com o mesmo nome reaproveita a loja existente
        let second_id = store.push_store_request("LOJA FULANO");
        let outcome = service.approve_store_request(second_id).await.unwrap();
        assert_eq!(store.lodges.lock().unwrap().len(), 1);
        match outcome {
            Outcome::Succeeded { provisioned } => assert!(!provisioned.lodge_created),
            other => panic!("resultado inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn aprovar_loja_sem_configuracao_so_vira_a_flag() {
        let store = Arc::new(MemStore::default());
        let request_id = store.push_store_request("loja fulano");
        let (service, transport) = service_with(store.clone());

        let outcome = service.approve_store_request(request_id).await.unwrap();

        assert!(store.lodges.lock().unwrap().is_empty());
        assert!(store.store_requests.lock().unwrap()[0].approved);
        assert!(transport.subjects().is_empty());
        assert!(matches!(outcome, Outcome::SucceededWithWarnings { .. }));
    }

    #[tokio::test]
    async fn formulario_publico_persiste_e_enfileira_dois_emails() {
        let store = Arc::new(MemStore::with_setup());
        let (service, transport) = service_with(store.clone());

        let (request, warnings) = service
            .submit_user_request(&sample_submission())
            .await
            .unwrap();

        assert!(!request.approved);
        assert_eq!(store.user_requests.lock().unwrap().len(), 1);
        assert!(warnings.is_empty());

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["admin@example.com".to_string()]);
        assert_eq!(sent[0].subject, "Nova solicitação de cadastro de usuário");
        assert_eq!(sent[1].to, vec!["carlos@example.com".to_string()]);
        assert_eq!(sent[1].subject, "Sua solicitação de cadastro foi recebida");
    }

    #[tokio::test]
    async fn falha_de_transporte_degrada_para_aviso() {
        let store = Arc::new(MemStore::with_setup());
        let (service, transport) = service_with(store.clone());
        transport
            .fail
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let (request, warnings) = service
            .submit_user_request(&sample_submission())
            .await
            .unwrap();

        // A ação primária fica de pé; os dois envios viram avisos
        assert!(!request.approved);
        assert_eq!(store.user_requests.lock().unwrap().len(), 1);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn senha_gerada_tem_o_tamanho_e_o_alfabeto_esperados() {
        let password = generate_password(12);
        assert_eq!(password.chars().count(), 12);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
