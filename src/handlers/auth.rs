// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, Operator},
    models::auth::{AuthResponse, LoginPayload, User},
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler da rota protegida /me
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// Listagem de irmãos, exclusiva do operador
pub async fn list_brothers(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
) -> Result<Json<Vec<User>>, AppError> {
    let brothers = app_state.user_repo.list_brothers().await?;
    Ok(Json(brothers))
}
