// src/db/request_repo.rs
//
// Repositório das três solicitações do fluxo de aprovação. As viradas de
// flag de aprovação são feitas com compare-and-swap: o UPDATE só atinge a
// linha se ela ainda não estava aprovada, então uma aprovação dupla
// concorrente retorna zero linhas para o segundo operador.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::request::{
        normalize_lodge_name, CancelEventRequest, StoreRequest, SubmitUserRequestPayload,
        UserRequest,
    },
};

const STORE_COLUMNS: &str = "id, user_id, name, city, number, approved, created_at, updated_at";
const CANCEL_COLUMNS: &str = "id, user_id, event_id, reason, reviewed, created_at, updated_at";
const USER_REQ_COLUMNS: &str = "id, name, surname, email, phone, profession_id, message, \
                                lodge_name, lodge_number, approved, created_at, updated_at";

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Solicitações de loja ---

    pub async fn insert_store_request(
        &self,
        user_id: Uuid,
        name: &str,
        city: &str,
        number: Option<&str>,
    ) -> Result<StoreRequest, AppError> {
        let request = sqlx::query_as::<_, StoreRequest>(&format!(
            "INSERT INTO store_requests (user_id, name, city, number) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(normalize_lodge_name(name))
        .bind(city)
        .bind(number)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn find_store_request(&self, id: Uuid) -> Result<Option<StoreRequest>, AppError> {
        let request = sqlx::query_as::<_, StoreRequest>(&format!(
            "SELECT {STORE_COLUMNS} FROM store_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn list_store_requests(
        &self,
        only_user: Option<Uuid>,
    ) -> Result<Vec<StoreRequest>, AppError> {
        let requests = match only_user {
            Some(user_id) => {
                sqlx::query_as::<_, StoreRequest>(&format!(
                    "SELECT {STORE_COLUMNS} FROM store_requests WHERE user_id = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StoreRequest>(&format!(
                    "SELECT {STORE_COLUMNS} FROM store_requests ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(requests)
    }

    pub async fn update_store_request(
        &self,
        request: &StoreRequest,
    ) -> Result<StoreRequest, AppError> {
        let updated = sqlx::query_as::<_, StoreRequest>(&format!(
            "UPDATE store_requests \
             SET user_id = $2, name = $3, city = $4, number = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(request.id)
        .bind(request.user_id)
        .bind(normalize_lodge_name(&request.name))
        .bind(&request.city)
        .bind(&request.number)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    // CAS: None quando a linha já estava aprovada (ou não existe).
    pub async fn approve_store_request(&self, id: Uuid) -> Result<Option<StoreRequest>, AppError> {
        let approved = sqlx::query_as::<_, StoreRequest>(&format!(
            "UPDATE store_requests SET approved = TRUE, updated_at = NOW() \
             WHERE id = $1 AND approved = FALSE \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(approved)
    }

    pub async fn delete_store_request(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM store_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- Solicitações de cancelamento de evento ---

    pub async fn insert_cancel_request(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        reason: &str,
    ) -> Result<CancelEventRequest, AppError> {
        let request = sqlx::query_as::<_, CancelEventRequest>(&format!(
            "INSERT INTO cancel_event_requests (user_id, event_id, reason) \
             VALUES ($1, $2, $3) \
             RETURNING {CANCEL_COLUMNS}"
        ))
        .bind(user_id)
        .bind(event_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn find_cancel_request(
        &self,
        id: Uuid,
    ) -> Result<Option<CancelEventRequest>, AppError> {
        let request = sqlx::query_as::<_, CancelEventRequest>(&format!(
            "SELECT {CANCEL_COLUMNS} FROM cancel_event_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn list_cancel_requests(
        &self,
        only_user: Option<Uuid>,
    ) -> Result<Vec<CancelEventRequest>, AppError> {
        let requests = match only_user {
            Some(user_id) => {
                sqlx::query_as::<_, CancelEventRequest>(&format!(
                    "SELECT {CANCEL_COLUMNS} FROM cancel_event_requests WHERE user_id = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CancelEventRequest>(&format!(
                    "SELECT {CANCEL_COLUMNS} FROM cancel_event_requests ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(requests)
    }

    pub async fn set_cancel_request_reviewed(
        &self,
        id: Uuid,
        reviewed: bool,
    ) -> Result<Option<CancelEventRequest>, AppError> {
        let updated = sqlx::query_as::<_, CancelEventRequest>(&format!(
            "UPDATE cancel_event_requests SET reviewed = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CANCEL_COLUMNS}"
        ))
        .bind(id)
        .bind(reviewed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn delete_cancel_request(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cancel_event_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- Solicitações de cadastro de usuário ---

    pub async fn insert_user_request(
        &self,
        payload: &SubmitUserRequestPayload,
    ) -> Result<UserRequest, AppError> {
        let request = sqlx::query_as::<_, UserRequest>(&format!(
            "INSERT INTO user_requests (name, surname, email, phone, profession_id, message, \
                                        lodge_name, lodge_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_REQ_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(&payload.surname)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(payload.profession_id)
        .bind(&payload.message)
        .bind(&payload.lodge_name)
        .bind(&payload.lodge_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn find_user_request(&self, id: Uuid) -> Result<Option<UserRequest>, AppError> {
        let request = sqlx::query_as::<_, UserRequest>(&format!(
            "SELECT {USER_REQ_COLUMNS} FROM user_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn list_user_requests(&self) -> Result<Vec<UserRequest>, AppError> {
        let requests = sqlx::query_as::<_, UserRequest>(&format!(
            "SELECT {USER_REQ_COLUMNS} FROM user_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn set_user_request_profession(
        &self,
        id: Uuid,
        profession_id: Option<Uuid>,
    ) -> Result<Option<UserRequest>, AppError> {
        let updated = sqlx::query_as::<_, UserRequest>(&format!(
            "UPDATE user_requests SET profession_id = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_REQ_COLUMNS}"
        ))
        .bind(id)
        .bind(profession_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn approve_user_request(&self, id: Uuid) -> Result<Option<UserRequest>, AppError> {
        let approved = sqlx::query_as::<_, UserRequest>(&format!(
            "UPDATE user_requests SET approved = TRUE, updated_at = NOW() \
             WHERE id = $1 AND approved = FALSE \
             RETURNING {USER_REQ_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(approved)
    }

    pub async fn delete_user_request(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
