use quality_gates::config::{ServerConfig, load_env_file};
use quality_gates::{routes, state};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if load_env_file(".env") {
        tracing::debug!("loaded .env");
    }

    let config = ServerConfig::from_env().expect("invalid server configuration");
    let state = state::AppState::from_config(&config).await;

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(
        port = config.port,
        is_admin = config.is_admin,
        id_strategy = ?config.id_strategy,
        "quality gate emulator listening"
    );
    axum::serve(listener, app).await.expect("server failed");
}
