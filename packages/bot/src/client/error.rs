//! Error types for the chat service connection.

use thiserror::Error;

use crate::domain::AuthError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No token could be obtained; the attempt never reached the socket
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The WebSocket handshake failed
    #[error("connection failed: {0}")]
    Connect(String),

    /// An established connection broke
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

impl ClientError {
    /// Whether the socket had been opened before the failure
    pub fn was_connected(&self) -> bool {
        matches!(self, Self::ConnectionLost(_))
    }
}
