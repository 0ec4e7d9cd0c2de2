use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use image_enhance_relay::{router, AppState, Config, OpenAIClient};

#[tokio::main]
async fn main() {
    // Load .env first so RUST_LOG from it applies
    Config::dotenv_load();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::new();
    Config::print_env_vars();
    if config.openai_api_key.is_none() {
        tracing::warn!("No OpenAI API key configured; enhance requests will fail until one is set");
    }

    let client = match OpenAIClient::new(config.openai_base_url.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState::new(&config, Arc::new(client)));
    let app = router(state);

    // Run our application with safe parsing
    let ip: std::net::IpAddr = config.api_host.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_HOST '{}', falling back to 127.0.0.1", config.api_host);
        std::net::IpAddr::from([127, 0, 0, 1])
    });
    let port: u16 = config.api_port.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_PORT '{}', falling back to 8080", config.api_port);
        8080
    });
    let socket_address = SocketAddr::new(ip, port);
    tracing::info!("listening on {}", socket_address);
    if let Err(e) = axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}
