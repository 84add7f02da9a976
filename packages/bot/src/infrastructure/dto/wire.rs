//! WebSocket フレームの DTO
//!
//! すべてのフレームは `handler` フィールドで種類を判別する JSON オブジェクトです。
//! ID は数値と文字列のどちらでも届くため `WireId` で受けます。

use serde::{Deserialize, Serialize};

/// Room / user id as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    /// Numeric-looking ids go back out as JSON numbers
    pub fn from_domain(value: &str) -> Self {
        value
            .parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(value.to_string()))
    }

    pub fn into_domain(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
}

// ========================================
// Inbound
// ========================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "handler")]
pub enum InboundFrame {
    #[serde(rename = "login")]
    Login {
        #[serde(default)]
        status: Option<String>,
        #[serde(rename = "userID", alias = "userid", default)]
        user_id: Option<WireId>,
        #[serde(default)]
        message: Option<String>,
    },

    #[serde(rename = "joinchatroom")]
    JoinChatRoom {
        #[serde(default)]
        error: Option<serde_json::Value>,
        #[serde(default)]
        roomid: Option<WireId>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },

    #[serde(rename = "userkicked")]
    UserKicked {
        roomid: WireId,
        #[serde(default)]
        userid: Option<WireId>,
    },

    #[serde(rename = "chatroommessage")]
    ChatRoomMessage {
        roomid: WireId,
        #[serde(default)]
        userid: Option<WireId>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        text: String,
    },

    #[serde(rename = "chatroomlist")]
    ChatRoomList {
        #[serde(default)]
        rooms: Vec<RoomListItem>,
    },

    #[serde(rename = "ping")]
    Ping,

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomListItem {
    pub name: String,
    #[serde(rename = "userCount", alias = "count", alias = "users", default)]
    pub user_count: u32,
}

// ========================================
// Outbound
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "handler")]
pub enum OutboundFrame {
    #[serde(rename = "login")]
    Login {
        username: String,
        password: String,
        token: String,
    },

    #[serde(rename = "chatroommessage")]
    ChatRoomMessage {
        r#type: MessageType,
        roomid: WireId,
        text: String,
    },

    #[serde(rename = "joinchatroom")]
    JoinChatRoom {
        name: String,
        #[serde(rename = "roomPassword")]
        room_password: String,
        #[serde(rename = "__source", skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    #[serde(rename = "leavechatroom")]
    LeaveChatRoom { roomid: WireId },

    #[serde(rename = "message")]
    DirectMessage {
        r#type: MessageType,
        to: String,
        text: String,
    },
}

impl OutboundFrame {
    pub fn handler(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::ChatRoomMessage { .. } => "chatroommessage",
            Self::JoinChatRoom { .. } => "joinchatroom",
            Self::LeaveChatRoom { .. } => "leavechatroom",
            Self::DirectMessage { .. } => "message",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_wire_id_accepts_numbers_and_strings() {
        // テスト項目: ID は数値でも文字列でも受け取れる
        // given (前提条件):
        let number = json!(42);
        let text = json!("abc");

        // when (操作):
        let number: WireId = serde_json::from_value(number).unwrap();
        let text: WireId = serde_json::from_value(text).unwrap();

        // then (期待する結果):
        assert_eq!(number, WireId::Number(42));
        assert_eq!(text, WireId::Text("abc".to_string()));
    }

    #[test]
    fn test_wire_id_from_domain_prefers_numbers() {
        // テスト項目: 数値に見える ID は数値として送り返される
        // given (前提条件):
        let numeric = "42";
        let textual = "room-a";

        // when (操作):
        let numeric = serde_json::to_value(WireId::from_domain(numeric)).unwrap();
        let textual = serde_json::to_value(WireId::from_domain(textual)).unwrap();

        // then (期待する結果):
        assert_eq!(numeric, json!(42));
        assert_eq!(textual, json!("room-a"));
    }

    #[test]
    fn test_join_frame_omits_missing_source() {
        // テスト項目: 参加フレームは source が無ければ __source を含めない
        // given (前提条件):
        let frame = OutboundFrame::JoinChatRoom {
            name: "life".to_string(),
            room_password: String::new(),
            source: None,
        };

        // when (操作):
        let value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"handler": "joinchatroom", "name": "life", "roomPassword": ""})
        );
    }

    #[test]
    fn test_unknown_handler_is_tolerated() {
        // テスト項目: 未知の handler はエラーにならず Unknown になる
        // given (前提条件):
        let raw = r#"{"handler":"profileupdate","foo":1}"#;

        // when (操作):
        let frame: InboundFrame = serde_json::from_str(raw).unwrap();

        // then (期待する結果):
        assert_eq!(frame, InboundFrame::Unknown);
    }
}
