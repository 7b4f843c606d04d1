// src/handlers/events.rs
//
// Eventos nunca são excluídos pela superfície: o cancelamento é lógico e
// congela o registro. A sincronização com a agenda externa fica por conta
// do serviço de eventos.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::{
        capabilities::{event_caps, Role},
        error::AppError,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::User,
        event::{validate_period, CreateEventPayload, Event, UpdateEventPayload},
    },
};

fn period_error() -> AppError {
    let mut err = ValidationError::new("period");
    err.message = Some(
        "A data e hora de início do evento deve ser anterior à data e hora de término.".into(),
    );
    let mut errors = ValidationErrors::new();
    errors.add("startTime", err);
    AppError::ValidationError(errors)
}

// O irmão só agenda para lojas em que tem associação.
async fn check_lodge_choice(
    app_state: &AppState,
    user: &User,
    lodge_id: Option<Uuid>,
) -> Result<(), AppError> {
    match (Role::of(user), lodge_id) {
        (Role::Operator, _) => Ok(()),
        (Role::Brother, None) => Err(AppError::Forbidden("Selecione a loja do evento.".into())),
        (Role::Brother, Some(lodge_id)) => {
            if app_state.lodge_repo.is_member(user.id, lodge_id).await? {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Você só pode agendar eventos para lojas em que tem associação.".into(),
                ))
            }
        }
    }
}

pub async fn list_events(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = match Role::of(&user) {
        Role::Operator => app_state.event_repo.list_all().await?,
        Role::Brother => app_state.event_repo.list_for_user(user.id).await?,
    };
    Ok(Json(events))
}

async fn load_event_scoped(
    app_state: &AppState,
    user: &User,
    id: Uuid,
) -> Result<Event, AppError> {
    let event = app_state
        .event_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    if Role::of(user) == Role::Brother && event.user_id != user.id {
        return Err(AppError::NotFound);
    }
    Ok(event)
}

pub async fn get_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let event = load_event_scoped(&app_state, &user, id).await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/api/admin/events",
    request_body = CreateEventPayload,
    responses(
        (status = 201, description = "Evento criado e sincronizado", body = Event),
        (status = 400, description = "Campos inválidos")
    )
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateEventPayload>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    if !validate_period(&payload.start_time, &payload.end_time) {
        return Err(period_error());
    }
    check_lodge_choice(&app_state, &user, payload.lodge_id).await?;

    // O dono é sempre quem está criando
    let event = app_state
        .event_service
        .create_event(
            &user,
            payload.lodge_id,
            &payload.title,
            &payload.description,
            payload.start_time,
            payload.end_time,
            &payload.address,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventPayload>,
) -> Result<Json<Event>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let role = Role::of(&user);
    let mut event = load_event_scoped(&app_state, &user, id).await?;
    let was_cancelled = event.is_cancelled;

    let caps = event_caps(event.is_cancelled, role);
    let provided: &[(&str, bool)] = &[
        ("user_id", payload.user_id.is_some()),
        ("lodge_id", payload.lodge_id.is_some()),
        ("title", payload.title.is_some()),
        ("description", payload.description.is_some()),
        ("start_time", payload.start_time.is_some()),
        ("end_time", payload.end_time.is_some()),
        ("address", payload.address.is_some()),
    ];
    if !caps.can_edit {
        return Err(AppError::Forbidden(
            "Evento cancelado é somente leitura.".into(),
        ));
    }
    for (field, was_provided) in provided {
        if *was_provided && !caps.allows(field) {
            return Err(AppError::Forbidden(format!(
                "O campo '{field}' não pode ser alterado."
            )));
        }
    }

    if let Some(lodge_id) = payload.lodge_id {
        check_lodge_choice(&app_state, &user, Some(lodge_id)).await?;
        event.lodge_id = Some(lodge_id);
    }
    if let Some(user_id) = payload.user_id {
        event.user_id = user_id;
    }
    if let Some(title) = payload.title {
        event.title = title;
    }
    if let Some(description) = payload.description {
        event.description = description;
    }
    if let Some(start_time) = payload.start_time {
        event.start_time = start_time;
    }
    if let Some(end_time) = payload.end_time {
        event.end_time = end_time;
    }
    if let Some(address) = payload.address {
        event.address = address;
    }

    if !validate_period(&event.start_time, &event.end_time) {
        return Err(period_error());
    }

    let updated = app_state
        .event_service
        .update_event(event, was_cancelled)
        .await?;
    Ok(Json(updated))
}

// Cancelamento lógico: dispara a exclusão na agenda externa e o aviso ao
// dono. Não existe rota de exclusão de eventos.
pub async fn cancel_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let mut event = load_event_scoped(&app_state, &user, id).await?;
    if event.is_cancelled {
        return Err(AppError::Forbidden("Este evento já foi cancelado.".into()));
    }

    let was_cancelled = event.is_cancelled;
    event.is_cancelled = true;

    let updated = app_state
        .event_service
        .update_event(event, was_cancelled)
        .await?;
    Ok(Json(updated))
}
