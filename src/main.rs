mod config;
mod provider;
mod routes;
mod services;
mod state;
mod views;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xplr=info,tower_http=info")))
        .init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let provider = provider::gotrue::GoTrueClient::new(&config.provider_url, config.provider_anon_key.clone(), config.timeouts)
        .expect("identity provider client init failed");
    let views = views::Views::new().expect("template compilation failed");

    tracing::info!(
        project_ref = %config.project_ref,
        sign_out_policy = ?config.sign_out_policy,
        cookie_secure = config.cookie_secure,
        "identity provider configured"
    );

    let port = config.port;
    let state = state::AppState::new(config, Arc::new(provider), views);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "xplr listening");
    axum::serve(listener, app).await.expect("server failed");
}
