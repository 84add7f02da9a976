//! One WebSocket session with the chat service.
//!
//! Connects with the token in the query string, sends the login frame and then
//! pumps frames both ways until the connection closes or shutdown is raised.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message},
};

use crate::{
    bot::Bot,
    domain::{AuthToken, InboundEvent, OutboundCommand},
    infrastructure::{auth::browser_headers, dto::decode_event},
};

use super::{
    domain::{LOG_PAYLOAD_LIMIT, truncate_for_log},
    error::ClientError,
};

const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// How a session that did connect came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown was requested
    Shutdown,
    /// The server closed the connection
    Closed,
}

/// Run one session
pub async fn run_session(bot: &Bot, token: &AuthToken) -> Result<SessionEnd, ClientError> {
    let ctx = bot.context();
    let config = &ctx.config;

    let mut request = format!("{}?token={}", config.ws_url, token.as_str())
        .into_client_request()
        .map_err(|e| ClientError::Connect(e.to_string()))?;
    request.headers_mut().extend(browser_headers());

    let (ws_stream, _response) = tokio::select! {
        _ = ctx.shutdown.cancelled() => return Ok(SessionEnd::Shutdown),
        result = connect_async(request) => {
            result.map_err(|e| ClientError::Connect(e.to_string()))?
        }
    };
    tracing::info!("🚀 WebSocket connection opened. Logging in...");

    let (mut write, mut read) = ws_stream.split();
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<String>();
    bot.sender().attach(queue_tx).await;

    // 送信キューの内容をソケットに書き込む
    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = queue_rx.recv().await {
            if let Err(e) = write.send(Message::Text(frame.into())).await {
                tracing::warn!("Failed to write frame: {}", e);
                return;
            }
        }
        let _ = write.send(Message::Close(None)).await;
    });

    ctx.send(OutboundCommand::Login {
        username: config.username.clone(),
        password: config.password.clone().unwrap_or_default(),
        token: token.clone(),
    })
    .await;

    let result = loop {
        tokio::select! {
            _ = ctx.shutdown.cancelled() => break Ok(SessionEnd::Shutdown),
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(bot, text.as_str()).await,
                Some(Ok(Message::Close(frame))) => {
                    tracing::warn!("Server closed the connection: {:?}", frame);
                    break Ok(SessionEnd::Closed);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(ClientError::ConnectionLost(e.to_string())),
                None => break Ok(SessionEnd::Closed),
            },
        }
    };

    // キューを外すと書き込みタスクが Close を送って終わる
    bot.sender().detach().await;
    if tokio::time::timeout(CLOSE_GRACE, &mut write_task)
        .await
        .is_err()
    {
        tracing::debug!("Writer did not finish within {:?}", CLOSE_GRACE);
        write_task.abort();
    }
    result
}

async fn handle_frame(bot: &Bot, text: &str) {
    match decode_event(text) {
        Ok(InboundEvent::Ping) => {}
        Ok(event) => {
            tracing::debug!("<-- RECEIVED: {}", truncate_for_log(text, LOG_PAYLOAD_LIMIT));
            bot.handle_event(event).await;
        }
        Err(e) => {
            tracing::warn!(
                "Dropping malformed frame ({}): {}",
                e,
                truncate_for_log(text, LOG_PAYLOAD_LIMIT)
            );
        }
    }
}
