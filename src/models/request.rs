// src/models/request.rs
//
// As três solicitações pendentes do fluxo de aprovação: loja, cadastro
// de usuário e cancelamento de evento.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lodge::validate_city;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub city: String,
    pub number: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequestPayload {
    // Ex: LOJA FULANO DE TAL Nº 0000
    #[validate(length(min = 1, max = 255, message = "Escreva o nome completo da sua loja."))]
    pub name: String,
    #[validate(custom(function = "validate_city"))]
    pub city: String,
    #[validate(length(max = 20, message = "Número muito longo."))]
    pub number: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequestPayload {
    #[validate(length(min = 1, max = 255, message = "Escreva o nome completo da sua loja."))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_city"))]
    pub city: Option<String>,
    pub number: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelEventRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub reason: String,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCancelRequestPayload {
    pub event_id: Uuid,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub profession_id: Option<Uuid>,
    pub message: Option<String>,
    pub lodge_name: String,
    pub lodge_number: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Formulário público de solicitação de cadastro.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitUserRequestPayload {
    #[validate(length(min = 1, max = 255, message = "Escreva o nome do usuário."))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Escreva o sobrenome do usuário."))]
    pub surname: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 8, max = 15, message = "Escreva o telefone do usuário."))]
    pub phone: String,
    pub profession_id: Option<Uuid>,
    pub message: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Escreva o nome da loja."))]
    pub lodge_name: String,
    #[validate(length(min = 1, max = 20, message = "Escreva o número da loja."))]
    pub lodge_number: String,
    // Autorizo compartilhar minhas informações com a plataforma.
    #[validate(custom(function = "validate_terms"))]
    pub terms_accepted: bool,
}

fn validate_terms(accepted: &bool) -> Result<(), validator::ValidationError> {
    if *accepted {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("terms_accepted");
        err.message = Some("Você precisa aceitar os termos para continuar.".into());
        Err(err)
    }
}

// Na superfície administrativa os campos de conteúdo da solicitação de
// usuário são somente leitura; o operador ajusta apenas a profissão.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequestPayload {
    pub profession_id: Option<Uuid>,
}

/// Nomes de loja são sempre gravados em caixa alta, em toda gravação.
pub fn normalize_lodge_name(name: &str) -> String {
    name.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nome_de_loja_sobe_para_caixa_alta() {
        assert_eq!(normalize_lodge_name("loja fulano"), "LOJA FULANO");
        assert_eq!(normalize_lodge_name("Loja Acácia Nº 12"), "LOJA ACÁCIA Nº 12");
    }

    #[test]
    fn normalizacao_e_idempotente_em_regravacoes() {
        let once = normalize_lodge_name("loja fulano");
        assert_eq!(normalize_lodge_name(&once), once);
    }

    #[test]
    fn termos_precisam_ser_aceitos() {
        assert!(validate_terms(&true).is_ok());
        assert!(validate_terms(&false).is_err());
    }
}
