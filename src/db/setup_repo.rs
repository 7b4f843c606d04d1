// src/db/setup_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::setup::{Profession, Setup},
};

#[derive(Clone)]
pub struct SetupRepository {
    pool: PgPool,
}

impl SetupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Registro único (id = 1). None significa "sistema não configurado".
    pub async fn get(&self) -> Result<Option<Setup>, AppError> {
        let setup = sqlx::query_as::<_, Setup>(
            "SELECT url, calendar_url, admin_email FROM setup WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(setup)
    }

    pub async fn upsert(
        &self,
        url: &str,
        calendar_url: &str,
        admin_email: &str,
    ) -> Result<Setup, AppError> {
        let setup = sqlx::query_as::<_, Setup>(
            "INSERT INTO setup (id, url, calendar_url, admin_email) \
             VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE \
             SET url = EXCLUDED.url, calendar_url = EXCLUDED.calendar_url, \
                 admin_email = EXCLUDED.admin_email \
             RETURNING url, calendar_url, admin_email",
        )
        .bind(url)
        .bind(calendar_url)
        .bind(admin_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(setup)
    }
}

#[derive(Clone)]
pub struct ProfessionRepository {
    pool: PgPool,
}

impl ProfessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, only_active: bool) -> Result<Vec<Profession>, AppError> {
        let professions = if only_active {
            sqlx::query_as::<_, Profession>(
                "SELECT id, name, is_active FROM professions WHERE is_active = TRUE ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Profession>(
                "SELECT id, name, is_active FROM professions ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(professions)
    }

    pub async fn create(&self, name: &str, is_active: bool) -> Result<Profession, AppError> {
        let profession = sqlx::query_as::<_, Profession>(
            "INSERT INTO professions (name, is_active) VALUES ($1, $2) \
             RETURNING id, name, is_active",
        )
        .bind(name)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(profession)
    }
}
