//! 送信（`ChatSender`）の実装
//!
//! - `websocket`: WebSocket 接続の送信キューを使った実装

pub mod websocket;

pub use websocket::{OutboundQueue, WebSocketChatSender};
