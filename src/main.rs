use std::env;
use std::error::Error;

use dotenvy::dotenv;
use tracing::info;

use institute_engine::api::{AppState, create_router};
use institute_engine::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/institute";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .with_level(true)
        .init();

    let config_dir = env::var("INSTITUTE_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr = env::var("INSTITUTE_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        domains = config.domains().count(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Server starting...");

    axum::serve(listener, app).await?;
    Ok(())
}
