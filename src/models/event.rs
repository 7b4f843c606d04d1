// src/models/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lodge_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub address: String,

    // Preenchido automaticamente após o evento ser criado no Google Calendar.
    pub google_event_id: Option<String>,
    pub is_cancelled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    pub lodge_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(length(min = 1, max = 500, message = "O endereço é obrigatório."))]
    pub address: String,
}

// Campos editáveis de um evento. `google_event_id` nunca é gravável
// pela superfície administrativa.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventPayload {
    pub user_id: Option<Uuid>,
    pub lodge_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 500, message = "O endereço é obrigatório."))]
    pub address: Option<String>,
}

/// A data e hora de início do evento deve ser anterior à de término.
/// Regra aplicada na camada de formulário, não no banco.
pub fn validate_period(start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
    start < end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn inicio_deve_ser_anterior_ao_termino() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 19, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 21, 0, 0).unwrap();
        assert!(validate_period(&start, &end));
        assert!(!validate_period(&end, &start));
        assert!(!validate_period(&start, &start));
    }
}
