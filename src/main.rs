//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod router;
mod services;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() {
    // Logger: RUST_LOG controla o nível (padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().expect("Falha ao carregar a configuração.");
    let addr = config.server_addr.clone();

    let app_state = AppState::new(config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let app = router::create_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
