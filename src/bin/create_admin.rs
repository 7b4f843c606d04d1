// src/bin/create_admin.rs
//
// Bootstrap do operador: cria a conta privilegiada inicial, já que não
// existe auto-cadastro (as demais contas nascem do fluxo de aprovação).
//
// Uso: create_admin <email> <senha>

use std::env;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();
    dotenvy::dotenv().ok();

    let mut args = env::args().skip(1);
    let email = args.next().expect("Uso: create_admin <email> <senha>");
    let password = args.next().expect("Uso: create_admin <email> <senha>");

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
    let db_pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&db_pool).await?;

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;

    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, first_name, surname, \
                            is_staff, is_superuser) \
         VALUES ($1, $2, $3, 'Administrador', '', TRUE, TRUE) \
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(&email)
    .bind(&email)
    .bind(&password_hash)
    .execute(&db_pool)
    .await?;

    if result.rows_affected() == 1 {
        tracing::info!("✅ Operador {} criado com sucesso!", email);
    } else {
        tracing::warn!("Já existe um usuário com o e-mail {}; nada foi feito.", email);
    }

    Ok(())
}
