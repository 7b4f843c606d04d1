//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

use agenda_maconica::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/brothers", get(handlers::auth::list_brothers))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lodge_routes = Router::new()
        .route(
            "/",
            get(handlers::lodges::list_lodges).post(handlers::lodges::create_lodge),
        )
        .route("/mine", get(handlers::lodges::list_my_lodges))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let store_request_routes = Router::new()
        .route(
            "/",
            get(handlers::requests::list_store_requests)
                .post(handlers::requests::create_store_request),
        )
        .route(
            "/{id}",
            get(handlers::requests::get_store_request)
                .patch(handlers::requests::update_store_request)
                .delete(handlers::requests::delete_store_request),
        )
        .route(
            "/{id}/approve",
            post(handlers::requests::approve_store_request),
        );

    let cancel_request_routes = Router::new()
        .route(
            "/",
            get(handlers::requests::list_cancel_requests)
                .post(handlers::requests::create_cancel_request),
        )
        .route(
            "/{id}",
            axum::routing::patch(handlers::requests::review_cancel_request)
                .delete(handlers::requests::delete_cancel_request),
        );

    let user_request_routes = Router::new()
        .route("/", get(handlers::requests::list_user_requests))
        .route(
            "/{id}",
            get(handlers::requests::get_user_request)
                .patch(handlers::requests::update_user_request)
                .delete(handlers::requests::delete_user_request),
        )
        .route(
            "/{id}/approve",
            post(handlers::requests::approve_user_request),
        );

    // Eventos: sem rota de exclusão, apenas cancelamento lógico
    let event_routes = Router::new()
        .route(
            "/",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/{id}",
            get(handlers::events::get_event).patch(handlers::events::update_event),
        )
        .route("/{id}/cancel", post(handlers::events::cancel_event));

    let setup_routes = Router::new()
        .route(
            "/",
            get(handlers::setup::get_setup).put(handlers::setup::update_setup),
        )
        .route("/professions", post(handlers::setup::create_profession));

    // A superfície administrativa inteira atrás do guardião de autenticação
    let admin_routes = Router::new()
        .nest("/store-requests", store_request_routes)
        .nest("/cancel-requests", cancel_request_routes)
        .nest("/user-requests", user_request_routes)
        .nest("/events", event_routes)
        .nest("/setup", setup_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal. Login, formulário de cadastro e
    // profissões ativas são as únicas rotas públicas.
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/requests/membership",
            post(handlers::requests::submit_membership_request),
        )
        .route("/api/professions", get(handlers::setup::list_professions))
        .nest("/api/users", user_routes)
        .nest("/api/lodges", lodge_routes)
        .nest("/api/admin", admin_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
