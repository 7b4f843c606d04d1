use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Registro não encontrado")]
    NotFound,

    #[error("Solicitação já aprovada")]
    AlreadyApproved,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Falhas nas integrações externas. São capturadas nas bordas e
    // degradadas para log; só chegam à resposta HTTP quando o chamador
    // decide propagar.
    #[error("Erro no envio de e-mail: {0}")]
    Mail(String),

    #[error("Erro no Google Calendar: {0}")]
    Calendar(String),

    #[error("Erro de template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Erro de cliente HTTP: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden(reason) => (StatusCode::FORBIDDEN, reason),
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, "Registro não encontrado.".to_string())
            }
            AppError::AlreadyApproved => (
                StatusCode::CONFLICT,
                "Esta solicitação já foi aprovada.".to_string(),
            ),
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }

            // Todos os outros erros viram 500. O `tracing` loga a mensagem
            // detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro interno do servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
