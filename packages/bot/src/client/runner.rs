//! Connection loop with reconnection support.

use std::sync::Arc;

use crate::{
    bot::Bot,
    domain::{AuthError, TokenProvider},
    usecase::sleep_or_cancel,
};

use super::{
    domain::next_reconnect_delay,
    error::ClientError,
    session::{SessionEnd, run_session},
};

/// Keep the bot connected until shutdown is raised.
///
/// Token failures and lost connections wait for the backoff delay (doubled
/// after each failure, back to the initial delay once a connection was made)
/// and then try again. The wait is cut short by shutdown.
pub async fn run_bot(bot: Arc<Bot>, tokens: Arc<dyn TokenProvider>) {
    let ctx = bot.context().clone();
    let connection = &ctx.config.connection;
    let mut delay = connection.initial_reconnect_delay;

    while !ctx.is_shutting_down() {
        let connected = match connect_once(&bot, tokens.as_ref()).await {
            Ok(SessionEnd::Shutdown) => break,
            Ok(SessionEnd::Closed) => {
                tracing::warn!("--- WebSocket closed unexpectedly ---");
                true
            }
            Err(ClientError::Auth(e)) => {
                tracing::error!("Could not get token ({}). Bot will not connect.", e);
                false
            }
            Err(e) => {
                tracing::warn!("{}", e);
                e.was_connected()
            }
        };
        if connected {
            delay = connection.initial_reconnect_delay;
        }
        if ctx.is_shutting_down() {
            break;
        }

        tracing::info!("Reconnecting in {:?}...", delay);
        if !sleep_or_cancel(&ctx.shutdown, delay).await {
            break;
        }
        delay = next_reconnect_delay(delay, connection.max_reconnect_delay);
    }

    bot.sender().detach().await;
    tracing::info!("--- Bot stopped ---");
}

async fn connect_once(bot: &Bot, tokens: &dyn TokenProvider) -> Result<SessionEnd, ClientError> {
    let config = &bot.context().config;
    let password = config
        .password
        .as_deref()
        .ok_or(ClientError::Auth(AuthError::MissingPassword))?;

    let token = tokio::select! {
        _ = bot.shutdown_token().cancelled() => return Ok(SessionEnd::Shutdown),
        token = tokens.fetch_token(&config.username, password) => token?,
    };
    run_session(bot, &token).await
}
