//! WebSocket を使った ChatSender 実装
//!
//! ## 責務
//!
//! - 現在の接続の送信キュー（`UnboundedSender<String>`）を保持
//! - `OutboundCommand` を JSON にエンコードしてキューに積む
//!
//! 接続の確立と書き込みループはクライアント層（`client::session`）が担当し、
//! 接続ごとに `attach` / `detach` でキューを差し替えます。

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{ChatSender, OutboundCommand, SendError};
use crate::infrastructure::dto::encode_command;

pub type OutboundQueue = mpsc::UnboundedSender<String>;

#[derive(Default)]
pub struct WebSocketChatSender {
    queue: Mutex<Option<OutboundQueue>>,
}

impl WebSocketChatSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route outbound frames to a freshly opened connection
    pub async fn attach(&self, queue: OutboundQueue) {
        *self.queue.lock().await = Some(queue);
        tracing::debug!("Outbound queue attached");
    }

    pub async fn detach(&self) {
        if self.queue.lock().await.take().is_some() {
            tracing::debug!("Outbound queue detached");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.queue
            .lock()
            .await
            .as_ref()
            .is_some_and(|queue| !queue.is_closed())
    }
}

#[async_trait]
impl ChatSender for WebSocketChatSender {
    async fn send(&self, command: OutboundCommand) -> Result<(), SendError> {
        let queue = self.queue.lock().await;
        let Some(queue) = queue.as_ref() else {
            return Err(SendError::NotConnected);
        };

        // パスワードとトークンはログに出さない
        let summary = match &command {
            OutboundCommand::Login { username, .. } => Some(format!("login as '{}'", username)),
            _ => None,
        };
        let frame = encode_command(command).map_err(|e| SendError::Encode(e.to_string()))?;
        tracing::info!("--> SENDING: {}", summary.as_deref().unwrap_or(&frame));

        queue
            .send(frame)
            .map_err(|e| SendError::ChannelClosed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthToken, RoomId};

    // ========================================
    // 【何をテストするか】
    // - 接続前・切断後の送信は NotConnected になる
    // - 接続中はエンコード済みフレームがキューに積まれる
    // - 書き込み側が閉じたキューへの送信は ChannelClosed になる
    // ========================================

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_send_without_connection_fails() {
        // テスト項目: 接続していない状態の送信は NotConnected で失敗する
        // given (前提条件):
        let sender = WebSocketChatSender::new();

        // when (操作):
        let result = sender
            .send(OutboundCommand::room_message(&room("1"), "hi"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendError::NotConnected));
        assert!(!sender.is_connected().await);
    }

    #[tokio::test]
    async fn test_send_queues_encoded_frame() {
        // テスト項目: 接続中はエンコードされたフレームが送信キューに積まれる
        // given (前提条件):
        let sender = WebSocketChatSender::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        sender.attach(tx).await;

        // when (操作):
        let result = sender
            .send(OutboundCommand::room_message(&room("42"), "7"))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(sender.is_connected().await);
        assert_eq!(
            rx.recv().await,
            Some(r#"{"handler":"chatroommessage","type":"text","roomid":42,"text":"7"}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_send_after_detach_fails() {
        // テスト項目: 切断（detach）後の送信は NotConnected で失敗する
        // given (前提条件):
        let sender = WebSocketChatSender::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        sender.attach(tx).await;
        sender.detach().await;

        // when (操作):
        let result = sender
            .send(OutboundCommand::LeaveRoom { room_id: room("1") })
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendError::NotConnected));
    }

    #[tokio::test]
    async fn test_send_to_closed_queue_fails() {
        // テスト項目: 書き込みループが終わったキューへの送信は ChannelClosed になる
        // given (前提条件):
        let sender = WebSocketChatSender::new();
        let (tx, rx) = mpsc::unbounded_channel();
        sender.attach(tx).await;
        drop(rx);

        // when (操作):
        let result = sender
            .send(OutboundCommand::Login {
                username: "ArcadeBot".to_string(),
                password: "secret".to_string(),
                token: AuthToken::new("tok".to_string()).unwrap(),
            })
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendError::ChannelClosed(_))));
        assert!(!sender.is_connected().await);
    }
}
