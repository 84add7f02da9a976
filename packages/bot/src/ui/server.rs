//! Control API server.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::client::BotSupervisor;

use super::{
    handler::{get_status, health_check, start_bot, stop_bot},
    signal::shutdown_signal,
    state::AppState,
};

/// HTTP control surface of the bot
///
/// # Example
///
/// ```ignore
/// let server = Server::new(supervisor, Some("secret".to_string()));
/// server.run("0.0.0.0".to_string(), 5000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(supervisor: Arc<BotSupervisor>, control_key: Option<String>) -> Self {
        Self {
            state: Arc::new(AppState {
                supervisor,
                control_key,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health_check))
            .route("/api/status", get(get_status))
            .route("/api/bot/start", post(start_bot))
            .route("/api/bot/stop", post(stop_bot))
            // 外部の死活監視サービスから叩けるように GET でも起動できる
            .route("/start", get(start_bot))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until Ctrl+C / SIGTERM, then stop the bot
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        tracing::info!("Control API listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.state.supervisor.stop().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
