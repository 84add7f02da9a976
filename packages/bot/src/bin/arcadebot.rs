//! Chat-room automation bot with an HTTP control API.
//!
//! Settings come from flags, environment variables or a `.env` file.
//!
//! Run with:
//! ```not_rust
//! BOT_PASSWORD=... cargo run --bin arcadebot -- --rooms life,games --masters boss
//! cargo run --bin arcadebot -- --autostart --port 5000
//! ```

use std::sync::Arc;

use arcadebot::{
    client::BotSupervisor,
    config::{BotConfig, DEFAULT_LOGIN_URL, DEFAULT_USERNAME, DEFAULT_WS_URL},
    infrastructure::auth::HttpTokenProvider,
    ui::Server,
};
use arcadebot_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "arcadebot")]
#[command(about = "Chat-room bot: quiz auto-solver, cycle mode and room roamer", long_about = None)]
struct Args {
    /// Bot account username
    #[arg(short = 'u', long, env = "BOT_USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,

    /// Bot account password
    #[arg(long, env = "BOT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Rooms joined after login (comma separated)
    #[arg(short = 'r', long, env = "ROOMS_TO_JOIN", value_delimiter = ',', default_value = "life")]
    rooms: Vec<String>,

    /// Usernames allowed to run master-only commands (comma separated)
    #[arg(short = 'm', long, env = "BOT_MASTERS", value_delimiter = ',')]
    masters: Vec<String>,

    /// Username that receives roam reports by direct message
    #[arg(long, env = "BOT_OPERATOR")]
    operator: Option<String>,

    /// Key required by the start/stop endpoints
    #[arg(long, env = "CONTROL_KEY", hide_env_values = true)]
    control_key: Option<String>,

    /// Host address to bind the control API to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the control API to
    #[arg(short = 'p', long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Login API endpoint
    #[arg(long, env = "LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
    login_url: String,

    /// WebSocket endpoint
    #[arg(long, env = "WS_URL", default_value = DEFAULT_WS_URL)]
    ws_url: String,

    /// Start the bot immediately instead of waiting for the control API
    #[arg(long, env = "BOT_AUTOSTART")]
    autostart: bool,

    /// Start the room roamer together with the bot
    #[arg(long, env = "ROAM_AUTOSTART")]
    roam: bool,
}

impl Args {
    fn into_config(self) -> BotConfig {
        let mut config = BotConfig {
            username: self.username,
            password: self.password,
            login_url: self.login_url,
            ws_url: self.ws_url,
            startup_rooms: self.rooms,
            masters: self.masters,
            operator: self.operator,
            ..BotConfig::default()
        };
        config.roam.autostart = self.roam;
        config
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let (host, port, control_key, autostart) =
        (args.host.clone(), args.port, args.control_key.clone(), args.autostart);

    let config = match args.into_config().validated() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if config.password.is_none() {
        tracing::warn!("🔴 BOT_PASSWORD is not set, the bot will not be able to log in");
    }
    tracing::info!(
        "--- Starting {} (rooms: {}, masters: {}) ---",
        config.username,
        config.startup_rooms.join(", "),
        config.masters.len()
    );

    let tokens = match HttpTokenProvider::new(config.login_url.clone()) {
        Ok(tokens) => Arc::new(tokens),
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let supervisor = Arc::new(BotSupervisor::new(config, tokens, Arc::new(SystemClock)));
    if autostart {
        supervisor.start().await;
    }

    let server = Server::new(supervisor, control_key);
    if let Err(e) = server.run(host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
