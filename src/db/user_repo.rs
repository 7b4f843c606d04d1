// src/db/user_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, surname, phone, \
                            profession_id, is_staff, is_superuser, is_active, created_at, updated_at";

// Dados de uma conta provisionada pelo fluxo de aprovação.
#[derive(Debug, Clone)]
pub struct NewStaffUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub profession_id: Option<Uuid>,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Listagem de irmãos para a superfície administrativa
    pub async fn list_brothers(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY first_name, surname"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Cria a conta de um usuário aprovado (username = e-mail, is_staff).
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_staff_user(&self, new: &NewStaffUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, first_name, surname, phone, \
                                profession_id, is_staff) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.surname)
        .bind(&new.phone)
        .bind(new.profession_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Os nomes que o Postgres dá às chaves únicas de username/email
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;

        Ok(user)
    }
}
