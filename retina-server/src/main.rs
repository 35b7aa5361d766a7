//! Retina Server - reverse image search for an image board
//!
//! Endpoints:
//! - GET  /iqdb_queries - search by url or post_id (html or json)
//! - POST /iqdb_queries - search by uploaded file (multipart)
//! - POST /session      - log in (name + password, IP-ban enforced)
//! - DELETE /session    - log out
//! - GET  /health, /ready - monitoring

use tracing_subscriber::EnvFilter;

use retina_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let addr = config.socket_addr();

    if config.similarity_service_url.is_none() {
        tracing::warn!("SIMILARITY_SERVICE_URL not set; search requests will fail until configured");
    }

    let state = AppState::new(&config);
    let app = create_router_with_config(&config, state);

    tracing::info!(%addr, "retina-server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
