// src/models/setup.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Registro único de configuração do sistema (linha de id fixo = 1).
// Consultado pelo notificador e pelo adaptador de calendário; a ausência
// é um estado explícito ("não configurado"), não um erro.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub url: String,
    pub calendar_url: String,
    pub admin_email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSetupPayload {
    #[validate(length(min = 1, max = 255, message = "Escreva a URL do sistema."))]
    pub url: String,
    #[validate(length(min = 1, max = 255, message = "Escreva a URL do Google Calendar."))]
    pub calendar_url: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub admin_email: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profession {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfessionPayload {
    #[validate(length(min = 1, max = 255, message = "Escreva o nome da profissão."))]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
