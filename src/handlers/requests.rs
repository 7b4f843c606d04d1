// src/handlers/requests.rs
//
// Superfície administrativa das três solicitações, mais o formulário
// público de cadastro. A visibilidade é limitada ao dono para quem não é
// operador; a mutabilidade vem da tabela de capacidades.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        capabilities::{cancel_request_caps, store_request_caps, user_request_caps, Caps, Role},
        error::AppError,
    },
    config::AppState,
    middleware::auth::{AuthenticatedUser, Operator},
    models::request::{
        CancelEventRequest, CreateCancelRequestPayload, CreateStoreRequestPayload, StoreRequest,
        SubmitUserRequestPayload, UpdateStoreRequestPayload, UpdateUserRequestPayload, UserRequest,
    },
    services::approval::Outcome,
};

fn ensure_fields_allowed(caps: &Caps, provided: &[(&str, bool)]) -> Result<(), AppError> {
    if !caps.can_edit {
        return Err(AppError::Forbidden(
            "Este registro é somente leitura.".into(),
        ));
    }
    for (field, was_provided) in provided {
        if *was_provided && !caps.allows(field) {
            return Err(AppError::Forbidden(format!(
                "O campo '{field}' não pode ser alterado."
            )));
        }
    }
    Ok(())
}

// --- Formulário público de cadastro ---

#[utoipa::path(
    post,
    path = "/api/requests/membership",
    request_body = SubmitUserRequestPayload,
    responses(
        (status = 201, description = "Solicitação registrada"),
        (status = 400, description = "Campos inválidos")
    )
)]
pub async fn submit_membership_request(
    State(app_state): State<AppState>,
    Json(payload): Json<SubmitUserRequestPayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (request, warnings) = app_state
        .approval_service
        .submit_user_request(&payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Sua solicitação foi enviada com sucesso! Você receberá um email \
                        quando sua solicitação for analisada.",
            "request": request,
            "warnings": warnings,
        })),
    ))
}

// --- Solicitações de loja ---

pub async fn list_store_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<StoreRequest>>, AppError> {
    let scope = match Role::of(&user) {
        Role::Operator => None,
        Role::Brother => Some(user.id),
    };
    let requests = app_state.request_repo.list_store_requests(scope).await?;
    Ok(Json(requests))
}

pub async fn create_store_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateStoreRequestPayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // O dono é sempre quem está criando
    let request = app_state
        .request_repo
        .insert_store_request(user.id, &payload.name, &payload.city, payload.number.as_deref())
        .await?;

    let warnings = app_state
        .approval_service
        .notify_store_request_created(&request)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "request": request, "warnings": warnings })),
    ))
}

async fn load_store_request_scoped(
    app_state: &AppState,
    user_id: Uuid,
    role: Role,
    id: Uuid,
) -> Result<StoreRequest, AppError> {
    let request = app_state
        .request_repo
        .find_store_request(id)
        .await?
        .ok_or(AppError::NotFound)?;
    if role == Role::Brother && request.user_id != user_id {
        return Err(AppError::NotFound);
    }
    Ok(request)
}

pub async fn get_store_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StoreRequest>, AppError> {
    let request = load_store_request_scoped(&app_state, user.id, Role::of(&user), id).await?;
    Ok(Json(request))
}

pub async fn update_store_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStoreRequestPayload>,
) -> Result<Json<StoreRequest>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let role = Role::of(&user);
    let mut request = load_store_request_scoped(&app_state, user.id, role, id).await?;

    let caps = store_request_caps(request.approved, role);
    ensure_fields_allowed(
        &caps,
        &[
            ("name", payload.name.is_some()),
            ("city", payload.city.is_some()),
            ("number", payload.number.is_some()),
            ("user_id", payload.user_id.is_some()),
        ],
    )?;

    if let Some(name) = payload.name {
        request.name = name;
    }
    if let Some(city) = payload.city {
        request.city = city;
    }
    if let Some(number) = payload.number {
        request.number = Some(number);
    }
    if let Some(user_id) = payload.user_id {
        request.user_id = user_id;
    }

    let updated = app_state.request_repo.update_store_request(&request).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/admin/store-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Id da solicitação")),
    responses(
        (status = 200, description = "Resultado da aprovação", body = Outcome),
        (status = 409, description = "Já aprovada")
    )
)]
pub async fn approve_store_request(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
    Path(id): Path<Uuid>,
) -> Result<Json<Outcome>, AppError> {
    let existing = app_state
        .request_repo
        .find_store_request(id)
        .await?
        .ok_or(AppError::NotFound)?;
    if existing.approved {
        return Err(AppError::AlreadyApproved);
    }

    let outcome = app_state.approval_service.approve_store_request(id).await?;
    Ok(Json(outcome))
}

pub async fn delete_store_request(
    State(app_state): State<AppState>,
    Operator(operator): Operator,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let request = app_state
        .request_repo
        .find_store_request(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let caps = store_request_caps(request.approved, Role::of(&operator));
    if !caps.can_delete {
        return Err(AppError::Forbidden(
            "Solicitação aprovada não pode ser excluída.".into(),
        ));
    }

    app_state.request_repo.delete_store_request(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Solicitações de cancelamento de evento ---

pub async fn list_cancel_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<CancelEventRequest>>, AppError> {
    let scope = match Role::of(&user) {
        Role::Operator => None,
        Role::Brother => Some(user.id),
    };
    let requests = app_state.request_repo.list_cancel_requests(scope).await?;
    Ok(Json(requests))
}

pub async fn create_cancel_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCancelRequestPayload>,
) -> Result<(StatusCode, Json<CancelEventRequest>), AppError> {
    // O evento precisa existir; o dono da solicitação é sempre o autor
    app_state
        .event_repo
        .find_by_id(payload.event_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let request = app_state
        .request_repo
        .insert_cancel_request(user.id, payload.event_id, &payload.reason)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct ReviewCancelRequestPayload {
    pub reviewed: bool,
}

pub async fn review_cancel_request(
    State(app_state): State<AppState>,
    Operator(operator): Operator,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewCancelRequestPayload>,
) -> Result<Json<CancelEventRequest>, AppError> {
    let caps = cancel_request_caps(Role::of(&operator));
    ensure_fields_allowed(&caps, &[("reviewed", true)])?;

    // Sem efeito derivado: a revisão é apenas um registro de triagem; o
    // cancelamento do evento em si é feito na tela de eventos.
    let updated = app_state
        .request_repo
        .set_cancel_request_reviewed(id, payload.reviewed)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

pub async fn delete_cancel_request(
    State(app_state): State<AppState>,
    Operator(operator): Operator,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let caps = cancel_request_caps(Role::of(&operator));
    if !caps.can_delete {
        return Err(AppError::Forbidden(
            "Apenas o operador pode excluir esta solicitação.".into(),
        ));
    }

    app_state
        .request_repo
        .find_cancel_request(id)
        .await?
        .ok_or(AppError::NotFound)?;
    app_state.request_repo.delete_cancel_request(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Solicitações de cadastro de usuário ---

pub async fn list_user_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<Vec<UserRequest>>, AppError> {
    let requests = app_state.request_repo.list_user_requests().await?;
    Ok(Json(requests))
}

pub async fn get_user_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRequest>, AppError> {
    let request = app_state
        .request_repo
        .find_user_request(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(request))
}

pub async fn update_user_request(
    State(app_state): State<AppState>,
    Operator(operator): Operator,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequestPayload>,
) -> Result<Json<UserRequest>, AppError> {
    let request = app_state
        .request_repo
        .find_user_request(id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Os campos de conteúdo são somente leitura; só a profissão é ajustável
    let caps = user_request_caps(request.approved, Role::of(&operator));
    ensure_fields_allowed(&caps, &[("profession_id", true)])?;

    let updated = app_state
        .request_repo
        .set_user_request_profession(id, payload.profession_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/admin/user-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Id da solicitação")),
    responses(
        (status = 200, description = "Resultado da aprovação", body = Outcome),
        (status = 409, description = "Já aprovada")
    )
)]
pub async fn approve_user_request(
    State(app_state): State<AppState>,
    Operator(_operator): Operator,
    Path(id): Path<Uuid>,
) -> Result<Json<Outcome>, AppError> {
    let existing = app_state
        .request_repo
        .find_user_request(id)
        .await?
        .ok_or(AppError::NotFound)?;
    if existing.approved {
        return Err(AppError::AlreadyApproved);
    }

    let outcome = app_state.approval_service.approve_user_request(id).await?;
    Ok(Json(outcome))
}

pub async fn delete_user_request(
    State(app_state): State<AppState>,
    Operator(operator): Operator,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let request = app_state
        .request_repo
        .find_user_request(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let caps = user_request_caps(request.approved, Role::of(&operator));
    if !caps.can_delete {
        return Err(AppError::Forbidden(
            "Solicitação aprovada não pode ser excluída.".into(),
        ));
    }

    app_state.request_repo.delete_user_request(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
