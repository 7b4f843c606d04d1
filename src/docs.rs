// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Formulário público ---
        handlers::requests::submit_membership_request,

        // --- Aprovações ---
        handlers::requests::approve_store_request,
        handlers::requests::approve_user_request,

        // --- Eventos ---
        handlers::events::create_event,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Lojas ---
            models::lodge::Lodge,
            models::lodge::UserLodge,
            models::lodge::CreateLodgePayload,

            // --- Eventos ---
            models::event::Event,
            models::event::CreateEventPayload,
            models::event::UpdateEventPayload,

            // --- Solicitações ---
            models::request::StoreRequest,
            models::request::CreateStoreRequestPayload,
            models::request::UpdateStoreRequestPayload,
            models::request::CancelEventRequest,
            models::request::CreateCancelRequestPayload,
            models::request::UserRequest,
            models::request::SubmitUserRequestPayload,
            models::request::UpdateUserRequestPayload,

            // --- Configuração ---
            models::setup::Setup,
            models::setup::UpdateSetupPayload,
            models::setup::Profession,
            models::setup::CreateProfessionPayload,

            // --- Resultado de aprovação ---
            services::approval::Outcome,
            services::approval::Provisioned,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
