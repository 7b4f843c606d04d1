// src/handlers/setup.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Operator,
    models::setup::{CreateProfessionPayload, Profession, Setup, UpdateSetupPayload},
};

pub async fn get_setup(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
) -> Result<Json<Option<Setup>>, AppError> {
    let setup = app_state.setup_repo.get().await?;
    Ok(Json(setup))
}

pub async fn update_setup(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
    Json(payload): Json<UpdateSetupPayload>,
) -> Result<Json<Setup>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let setup = app_state
        .setup_repo
        .upsert(&payload.url, &payload.calendar_url, &payload.admin_email)
        .await?;
    Ok(Json(setup))
}

#[derive(Debug, Deserialize)]
pub struct ProfessionFilter {
    // Por padrão só as ativas, que é o que o formulário público precisa
    #[serde(default = "default_only_active")]
    pub only_active: bool,
}

fn default_only_active() -> bool {
    true
}

// Pública: alimenta o seletor de profissão do formulário de cadastro.
pub async fn list_professions(
    State(app_state): State<AppState>,
    Query(filter): Query<ProfessionFilter>,
) -> Result<Json<Vec<Profession>>, AppError> {
    let professions = app_state.profession_repo.list(filter.only_active).await?;
    Ok(Json(professions))
}

pub async fn create_profession(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
    Json(payload): Json<CreateProfessionPayload>,
) -> Result<(StatusCode, Json<Profession>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let profession = app_state
        .profession_repo
        .create(&payload.name, payload.is_active)
        .await?;
    Ok((StatusCode::CREATED, Json(profession)))
}
