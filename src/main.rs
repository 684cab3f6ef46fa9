mod calls;
mod config;
mod db;
mod error;
mod matchmaking;
mod presence;
mod rooms;
mod routes;
mod state;
mod ws;

use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "hobby_matcher_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "hobby_matcher_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!(
        "Hobby Matcher signaling server v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize the account store (online flags live here; everything else
    // about accounts belongs to the HTTP account API)
    let db = db::init_db(&config.data_dir)?;

    // All matchmaking/signaling state is in-memory and dies with the process
    let app_state = state::AppState::new(db);

    // Build router
    let app = routes::build_router(app_state, &config.allowed_origins);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
