// src/services/google_calendar.rs
//
// Adaptador do Google Calendar (API REST v3). Traduz o estado interno de
// um evento para a representação externa e devolve falhas ao chamador
// como erro genérico com a mensagem original, depois de notificar o
// administrador. Sem retry.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use minijinja::context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::SetupRepository,
    models::event::Event,
    services::notifier::Notifier,
};

pub const CALENDAR_TIME_ZONE: &str = "America/Sao_Paulo";

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

// A entrada mais recente do calendário, como vista pelo job agendado.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EntryTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryTime {
    pub date_time: Option<String>,
}

#[async_trait]
pub trait CalendarPort: Send + Sync {
    async fn create(&self, event: &Event, lodge_name: Option<&str>) -> Result<String, AppError>;
    async fn update(&self, event: &Event, lodge_name: Option<&str>) -> Result<(), AppError>;
    async fn delete(&self, event: &Event) -> Result<(), AppError>;
    async fn last_event(&self) -> Result<Option<CalendarEntry>, AppError>;
}

/// Título externo: prefixado com a loja quando o evento tem uma.
pub fn compose_summary(title: &str, lodge_name: Option<&str>) -> String {
    match lodge_name {
        Some(name) => format!("LOJA {name} - {title}"),
        None => title.to_string(),
    }
}

/// Corpo da entrada externa: início/término em RFC 3339, fuso fixo.
pub fn event_payload(event: &Event, lodge_name: Option<&str>) -> serde_json::Value {
    json!({
        "summary": compose_summary(&event.title, lodge_name),
        "description": event.description,
        "location": event.address,
        "start": {
            "dateTime": event.start_time.to_rfc3339(),
            "timeZone": CALENDAR_TIME_ZONE,
        },
        "end": {
            "dateTime": event.end_time.to_rfc3339(),
            "timeZone": CALENDAR_TIME_ZONE,
        },
    })
}

// Arquivo de token no formato "authorized user" do Google. O fluxo de
// consentimento que o gera fica fora do sistema; aqui só renovamos.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    refresh_token: String,
    token_uri: String,
    client_id: String,
    client_secret: String,
    #[serde(default)]
    expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= Utc::now() + chrono::Duration::seconds(60),
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

pub struct GoogleCalendarService {
    client: reqwest::Client,
    token_path: PathBuf,
    token: Mutex<Option<StoredToken>>,
    setup_repo: SetupRepository,
    notifier: Notifier,
}

impl GoogleCalendarService {
    pub fn new(token_path: PathBuf, setup_repo: SetupRepository, notifier: Notifier) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("falha ao construir o cliente HTTP");
        Self {
            client,
            token_path,
            token: Mutex::new(None),
            setup_repo,
            notifier,
        }
    }

    // Carrega o token do disco na primeira operação e renova quando
    // expirado, persistindo o resultado de volta.
    async fn access_token(&self) -> Result<String, AppError> {
        let mut guard = self.token.lock().await;

        if guard.is_none() {
            let raw = tokio::fs::read_to_string(&self.token_path)
                .await
                .map_err(|e| {
                    AppError::Calendar(format!(
                        "token de acesso não encontrado em {}: {e}",
                        self.token_path.display()
                    ))
                })?;
            let stored: StoredToken = serde_json::from_str(&raw)
                .map_err(|e| AppError::Calendar(format!("token de acesso inválido: {e}")))?;
            *guard = Some(stored);
        }

        let stored = guard.as_mut().expect("token carregado acima");

        if stored.is_expired() {
            let response = self
                .client
                .post(stored.token_uri.as_str())
                .form(&[
                    ("client_id", stored.client_id.as_str()),
                    ("client_secret", stored.client_secret.as_str()),
                    ("refresh_token", stored.refresh_token.as_str()),
                    ("grant_type", "refresh_token"),
                ])
                .send()
                .await
                .map_err(|e| AppError::Calendar(format!("falha ao renovar token: {e}")))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Calendar(format!(
                    "falha ao renovar token: HTTP {status}: {body}"
                )));
            }

            let refreshed: RefreshResponse = response
                .json()
                .await
                .map_err(|e| AppError::Calendar(format!("resposta de renovação inválida: {e}")))?;

            stored.token = refreshed.access_token;
            stored.expiry = Some(Utc::now() + chrono::Duration::seconds(refreshed.expires_in));

            let serialized = serde_json::to_string_pretty(&stored)
                .map_err(|e| AppError::Calendar(format!("falha ao serializar token: {e}")))?;
            if let Err(e) = tokio::fs::write(&self.token_path, serialized).await {
                tracing::warn!("Não foi possível persistir o token renovado: {}", e);
            }
        }

        Ok(stored.token.clone())
    }

    // E-mail de erro para o administrador configurado; falha aqui só loga.
    async fn send_error_notification(
        &self,
        event: Option<&Event>,
        operation: &str,
        error_message: &str,
    ) {
        let setup = match self.setup_repo.get().await {
            Ok(Some(setup)) => setup,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Falha ao ler a configuração para notificar erro: {}", e);
                return;
            }
        };

        let result = self
            .notifier
            .send(
                &format!("Erro no Google Calendar - {operation}"),
                "email/google_calendar_error.html",
                context! { event => event, operation => operation, error_message => error_message },
                &[setup.admin_email],
            )
            .await;

        if let Err(e) = result {
            tracing::error!("Falha ao enviar notificação de erro do calendário: {}", e);
        }
    }

    async fn check_response(
        &self,
        response: reqwest::Response,
        event: Option<&Event>,
        operation: &str,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = format!("HTTP {status}: {body}");
        self.send_error_notification(event, operation, &message).await;
        Err(AppError::Calendar(message))
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendarService {
    async fn create(&self, event: &Event, lodge_name: Option<&str>) -> Result<String, AppError> {
        const OPERATION: &str = "Criação de Evento";

        let token = self.access_token().await?;
        let response = self
            .client
            .post(EVENTS_URL)
            .bearer_auth(&token)
            .json(&event_payload(event, lodge_name))
            .send()
            .await
            .map_err(|e| AppError::Calendar(e.to_string()))?;

        let response = self.check_response(response, Some(event), OPERATION).await?;
        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Calendar(e.to_string()))?;

        created["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Calendar("resposta sem id de evento".into()))
    }

    async fn update(&self, event: &Event, lodge_name: Option<&str>) -> Result<(), AppError> {
        const OPERATION: &str = "Atualização de Evento";

        let google_event_id = event
            .google_event_id
            .as_deref()
            .ok_or_else(|| AppError::Calendar("evento sem id externo".into()))?;

        let token = self.access_token().await?;
        let response = self
            .client
            .put(format!("{EVENTS_URL}/{google_event_id}"))
            .bearer_auth(&token)
            .json(&event_payload(event, lodge_name))
            .send()
            .await
            .map_err(|e| AppError::Calendar(e.to_string()))?;

        self.check_response(response, Some(event), OPERATION).await?;
        Ok(())
    }

    async fn delete(&self, event: &Event) -> Result<(), AppError> {
        const OPERATION: &str = "Exclusão de Evento";

        let google_event_id = event
            .google_event_id
            .as_deref()
            .ok_or_else(|| AppError::Calendar("evento sem id externo".into()))?;

        let token = self.access_token().await?;
        let response = self
            .client
            .delete(format!("{EVENTS_URL}/{google_event_id}"))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::Calendar(e.to_string()))?;

        self.check_response(response, Some(event), OPERATION).await?;
        Ok(())
    }

    // Diferente das operações de escrita, a consulta não notifica o
    // administrador: o job agendado que a chama é quem decide avisar.
    async fn last_event(&self) -> Result<Option<CalendarEntry>, AppError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(EVENTS_URL)
            .bearer_auth(&token)
            .query(&[("maxResults", "1"), ("orderBy", "updated")])
            .send()
            .await
            .map_err(|e| AppError::Calendar(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Calendar(format!("HTTP {status}: {body}")));
        }

        #[derive(Deserialize)]
        struct Listing {
            #[serde(default)]
            items: Vec<CalendarEntry>,
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| AppError::Calendar(e.to_string()))?;

        Ok(listing.items.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn sample_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            lodge_id: None,
            title: "Sessão Magna".into(),
            description: "Sessão comemorativa".into(),
            start_time: Utc.with_ymd_and_hms(2025, 6, 24, 22, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 25, 0, 0, 0).unwrap(),
            address: "Rua do Templo, 100".into(),
            google_event_id: None,
            is_cancelled: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn titulo_externo_prefixa_a_loja_quando_existe() {
        assert_eq!(
            compose_summary("Sessão Magna", Some("ACÁCIA Nº 12")),
            "LOJA ACÁCIA Nº 12 - Sessão Magna"
        );
        assert_eq!(compose_summary("Sessão Magna", None), "Sessão Magna");
    }

    #[test]
    fn corpo_externo_usa_rfc3339_e_fuso_fixo() {
        let event = sample_event();
        let payload = event_payload(&event, Some("ACÁCIA Nº 12"));

        assert_eq!(payload["summary"], "LOJA ACÁCIA Nº 12 - Sessão Magna");
        assert_eq!(payload["location"], "Rua do Templo, 100");
        assert_eq!(payload["start"]["timeZone"], CALENDAR_TIME_ZONE);
        assert_eq!(payload["end"]["timeZone"], CALENDAR_TIME_ZONE);
        assert_eq!(payload["start"]["dateTime"], "2025-06-24T22:00:00+00:00");
        assert_eq!(payload["end"]["dateTime"], "2025-06-25T00:00:00+00:00");
    }

    #[test]
    fn token_expirado_considera_margem_de_renovacao() {
        let mut token = StoredToken {
            token: "abc".into(),
            refresh_token: "def".into(),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
            expiry: Some(Utc::now() + chrono::Duration::hours(1)),
        };
        assert!(!token.is_expired());

        token.expiry = Some(Utc::now() - chrono::Duration::minutes(1));
        assert!(token.is_expired());

        // Sem expiry registrado, assumimos válido e deixamos a API acusar.
        token.expiry = None;
        assert!(!token.is_expired());
    }
}
