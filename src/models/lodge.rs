// src/models/lodge.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Cidades atendidas pelo sistema. Gravadas como texto para que a lista
// possa crescer sem migração de banco.
pub const CITY_CHOICES: &[&str] = &[
    "ARACAJU",
    "BARRA DOS COQUEIROS",
    "ESTÂNCIA",
    "ITABAIANA",
    "LAGARTO",
    "NOSSA SENHORA DO SOCORRO",
    "PROPRIÁ",
    "SÃO CRISTÓVÃO",
    "TOBIAS BARRETO",
    "OUTRA",
];

pub fn validate_city(city: &str) -> Result<(), ValidationError> {
    if CITY_CHOICES.contains(&city) {
        Ok(())
    } else {
        let mut err = ValidationError::new("city");
        err.message = Some("Cidade inválida.".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lodge {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Associação usuário x loja. O par não é único: associações repetidas
// são aceitas pelo banco.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLodge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lodge_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLodgePayload {
    #[validate(length(min = 1, max = 255, message = "Escreva o nome completo da loja."))]
    pub name: String,
    #[validate(custom(function = "validate_city"))]
    pub city: String,
    #[validate(length(max = 20, message = "Número muito longo."))]
    pub number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidade_conhecida_passa_na_validacao() {
        assert!(validate_city("ARACAJU").is_ok());
        assert!(validate_city("OUTRA").is_ok());
    }

    #[test]
    fn cidade_desconhecida_e_rejeitada() {
        assert!(validate_city("GOTHAM").is_err());
        assert!(validate_city("aracaju").is_err());
    }
}
