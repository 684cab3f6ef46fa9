use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Hobby Matcher signaling server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(
    name = "hobby-matcher-server",
    version,
    about = "Hobby Matcher matchmaking and signaling server"
)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "MATCHER_PORT", default_value = "5000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "MATCHER_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./matcher.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "MATCHER_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Data directory for the account store database
    #[arg(long, env = "MATCHER_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    /// Browser origins allowed to reach the HTTP API and WebSocket endpoint
    #[arg(
        long,
        env = "MATCHER_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = default_allowed_origins()
    )]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_address: "0.0.0.0".to_string(),
            config: "./matcher.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (MATCHER_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("MATCHER_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Hobby Matcher Signaling Server Configuration
# Place this file at ./matcher.toml or specify with --config <path>
# All settings can be overridden via environment variables (MATCHER_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 5000)
# port = 5000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the account store database
# data_dir = "./data"

# Browser origins allowed to reach the HTTP API and WebSocket endpoint.
# The deployed front-end origin(s) go here.
# allowed_origins = ["http://localhost:5173"]
"#
    .to_string()
}
