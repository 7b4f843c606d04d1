// src/handlers/lodges.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, Operator},
    models::lodge::{CreateLodgePayload, Lodge},
};

pub async fn list_lodges(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<Vec<Lodge>>, AppError> {
    let lodges = app_state.lodge_repo.list().await?;
    Ok(Json(lodges))
}

// As lojas do próprio usuário: são as opções válidas ao agendar um evento.
pub async fn list_my_lodges(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Lodge>>, AppError> {
    let lodges = app_state.lodge_repo.lodges_for_user(user.id).await?;
    Ok(Json(lodges))
}

// Criação direta de loja, fora do fluxo de aprovação (exclusiva do operador)
pub async fn create_lodge(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
    Json(payload): Json<CreateLodgePayload>,
) -> Result<(StatusCode, Json<Lodge>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lodge = app_state
        .lodge_repo
        .create(&payload.name, &payload.city, payload.number.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(lodge)))
}
