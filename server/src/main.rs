mod config;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("gateway configuration incomplete");
    let client_config =
        hamkke_client::config::AuthConfig::from_build_env().expect("client sign-in configuration missing at build time");

    let http = reqwest::Client::new();
    let metadata = services::gateway::discover(&http, &config.issuer_url)
        .await
        .expect("provider discovery failed");
    tracing::info!(issuer = %metadata.issuer, "identity provider discovered");

    let port = config.port;
    let state = state::AppState::new(config, metadata, http);

    let app = routes::app(state, client_config).expect("router init failed");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "hamkke listening");
    axum::serve(listener, app).await.expect("server failed");
}
