// src/db/lodge_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        lodge::{Lodge, UserLodge},
        request::normalize_lodge_name,
    },
};

const LODGE_COLUMNS: &str = "id, name, city, number, created_at, updated_at";

#[derive(Clone)]
pub struct LodgeRepository {
    pool: PgPool,
}

impl LodgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Lodge>, AppError> {
        let lodges = sqlx::query_as::<_, Lodge>(&format!(
            "SELECT {LODGE_COLUMNS} FROM lodges ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(lodges)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lodge>, AppError> {
        let lodge = sqlx::query_as::<_, Lodge>(&format!(
            "SELECT {LODGE_COLUMNS} FROM lodges WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lodge)
    }

    pub async fn find_by_number(&self, number: &str) -> Result<Option<Lodge>, AppError> {
        let lodge = sqlx::query_as::<_, Lodge>(&format!(
            "SELECT {LODGE_COLUMNS} FROM lodges WHERE number = $1 LIMIT 1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lodge)
    }

    // Nome sempre em caixa alta, em toda gravação.
    pub async fn create(
        &self,
        name: &str,
        city: &str,
        number: Option<&str>,
    ) -> Result<Lodge, AppError> {
        let lodge = sqlx::query_as::<_, Lodge>(&format!(
            "INSERT INTO lodges (name, city, number) VALUES ($1, $2, $3) \
             RETURNING {LODGE_COLUMNS}"
        ))
        .bind(normalize_lodge_name(name))
        .bind(city)
        .bind(number)
        .fetch_one(&self.pool)
        .await?;
        Ok(lodge)
    }

    // Busca pela chave de nome; cria com os padrões quando não existe.
    // Retorna também se a loja foi criada agora.
    pub async fn get_or_create_by_name(
        &self,
        name: &str,
        city: &str,
        number: Option<&str>,
    ) -> Result<(Lodge, bool), AppError> {
        let normalized = normalize_lodge_name(name);

        let existing = sqlx::query_as::<_, Lodge>(&format!(
            "SELECT {LODGE_COLUMNS} FROM lodges WHERE name = $1 LIMIT 1"
        ))
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(lodge) = existing {
            return Ok((lodge, false));
        }

        let lodge = self.create(&normalized, city, number).await?;
        Ok((lodge, true))
    }

    pub async fn add_member(&self, user_id: Uuid, lodge_id: Uuid) -> Result<UserLodge, AppError> {
        let membership = sqlx::query_as::<_, UserLodge>(
            "INSERT INTO user_lodges (user_id, lodge_id) VALUES ($1, $2) \
             RETURNING id, user_id, lodge_id",
        )
        .bind(user_id)
        .bind(lodge_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(membership)
    }

    // As lojas em que o usuário tem associação. Usada para restringir as
    // opções de loja de um irmão ao criar eventos.
    pub async fn lodges_for_user(&self, user_id: Uuid) -> Result<Vec<Lodge>, AppError> {
        let lodges = sqlx::query_as::<_, Lodge>(&format!(
            "SELECT DISTINCT l.id, l.name, l.city, l.number, l.created_at, l.updated_at \
             FROM lodges l \
             JOIN user_lodges ul ON ul.lodge_id = l.id \
             WHERE ul.user_id = $1 \
             ORDER BY l.name"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lodges)
    }

    pub async fn is_member(&self, user_id: Uuid, lodge_id: Uuid) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_lodges WHERE user_id = $1 AND lodge_id = $2",
        )
        .bind(user_id)
        .bind(lodge_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
