//! チャットサービスとやり取りするイベントのドメイン表現
//!
//! ワイヤ形式（`handler` 付き JSON）との変換は
//! `infrastructure::dto::conversion` が担当します。

use super::value_object::{AuthToken, RoomId, UserId};

/// ルームに投稿されたテキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub room_id: RoomId,
    pub sender_id: Option<UserId>,
    pub sender_name: String,
    pub text: String,
}

/// ルーム一覧の 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListingEntry {
    pub name: String,
    pub occupancy: u32,
}

/// 受信イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    LoginSucceeded {
        user_id: Option<UserId>,
    },
    LoginRejected {
        reason: String,
    },
    RoomJoined {
        room_id: RoomId,
        name: String,
    },
    JoinFailed {
        name: Option<String>,
        reason: String,
    },
    /// Someone was kicked; only relevant when `user_id` is the bot itself
    Kicked {
        room_id: RoomId,
        user_id: Option<UserId>,
    },
    RoomMessage(RoomMessage),
    RoomListing(Vec<RoomListingEntry>),
    Ping,
    /// Any handler the bot does not react to
    Unhandled {
        handler: String,
    },
}

/// Provenance tag attached to join requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSource {
    Startup,
    Roamer,
}

impl JoinSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup_join",
            Self::Roamer => "roamer",
        }
    }
}

/// 送信コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    Login {
        username: String,
        password: String,
        token: AuthToken,
    },
    RoomMessage {
        room_id: RoomId,
        text: String,
    },
    JoinRoom {
        name: String,
        source: Option<JoinSource>,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    DirectMessage {
        to: String,
        text: String,
    },
}

impl OutboundCommand {
    pub fn room_message(room_id: &RoomId, text: impl Into<String>) -> Self {
        Self::RoomMessage {
            room_id: room_id.clone(),
            text: text.into(),
        }
    }
}
