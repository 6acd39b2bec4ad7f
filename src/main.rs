mod api;
mod config;
mod gate;
mod render;
mod routes;
mod session;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // A missing .env is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let client = api::ApiClient::new(config.api.clone()).expect("backend client init failed");
    tracing::info!(base_url = client.base_url(), "backend client initialized");
    tracing::info!(mode = ?config.gate.mode, public_paths = ?config.gate.public_paths(), "request gate configured");

    let state = state::AppState::new(
        Arc::new(client),
        session::SessionCookie::new(config.cookie),
        config.gate,
    );

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "trackpoints-web listening");
    axum::serve(listener, app).await.expect("server failed");
}
