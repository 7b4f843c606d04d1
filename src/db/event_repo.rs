// src/db/event_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::event::Event};

const EVENT_COLUMNS: &str = "id, user_id, lodge_id, title, description, start_time, end_time, \
                             address, google_event_id, is_cancelled, created_at, updated_at";

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    pub async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_time DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    // Um irmão vê apenas os próprios eventos.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = $1 ORDER BY start_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn insert(
        &self,
        user_id: Uuid,
        lodge_id: Option<Uuid>,
        title: &str,
        description: &str,
        start_time: chrono::DateTime<chrono::Utc>,
        end_time: chrono::DateTime<chrono::Utc>,
        address: &str,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (user_id, lodge_id, title, description, start_time, end_time, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(lodge_id)
        .bind(title)
        .bind(description)
        .bind(start_time)
        .bind(end_time)
        .bind(address)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    // Regrava os campos editáveis do evento já carregado e validado.
    pub async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let updated = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events \
             SET user_id = $2, lodge_id = $3, title = $4, description = $5, start_time = $6, \
                 end_time = $7, address = $8, is_cancelled = $9, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.lodge_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.address)
        .bind(event.is_cancelled)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    // Gravação pontual do id externo, sem regravar a linha inteira.
    pub async fn set_google_event_id(
        &self,
        event_id: Uuid,
        google_event_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET google_event_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(event_id)
            .bind(google_event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
