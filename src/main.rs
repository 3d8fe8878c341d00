//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização; esquema desatualizado
    // também impede o servidor de subir.
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Faturas de compra e seus rateios por projeto
    let procurement_routes = Router::new()
        .route(
            "/",
            post(handlers::procurements::create_procurement)
                .get(handlers::procurements::list_procurements),
        )
        .route(
            "/{id}",
            get(handlers::procurements::get_procurement)
                .put(handlers::procurements::update_procurement)
                .delete(handlers::procurements::delete_procurement),
        );

    // Pagamentos (sem GET individual; a listagem já traz a fatura de origem)
    let payment_routes = Router::new()
        .route(
            "/",
            post(handlers::payments::create_payment).get(handlers::payments::list_payments),
        )
        .route(
            "/{id}",
            put(handlers::payments::update_payment).delete(handlers::payments::delete_payment),
        );

    // Faturas de venda
    let sale_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::list_sales),
        )
        .route(
            "/{id}",
            get(handlers::sales::get_sale)
                .put(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        );

    // Razão financeiro consolidado por projeto
    let finance_routes =
        Router::new().route("/project-entries", get(handlers::finance::project_entries));

    // Tudo que é negócio passa pelo guarda de autenticação; o contexto de
    // tenant sai das claims do token, nunca de header.
    let api_routes = Router::new()
        .nest("/api/procurements", procurement_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/sales", sale_routes)
        .nest("/api/finance", finance_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(api_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
