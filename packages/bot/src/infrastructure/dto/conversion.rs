//! Conversion between wire frames and domain events / commands.

use thiserror::Error;

use crate::domain::{
    InboundEvent, OutboundCommand, RoomId, RoomListingEntry, RoomMessage, UserId,
    ValueObjectError,
};

use super::wire::{InboundFrame, MessageType, OutboundFrame, WireId};

/// 受信フレームのデコード失敗
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame has no handler")]
    MissingHandler,

    #[error("invalid value in frame: {0}")]
    InvalidValue(#[from] ValueObjectError),
}

// ========================================
// Wire → Domain
// ========================================

/// Decode one inbound text frame
pub fn decode_event(text: &str) -> Result<InboundEvent, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let handler = value
        .get("handler")
        .and_then(serde_json::Value::as_str)
        .ok_or(DecodeError::MissingHandler)?
        .to_string();

    let frame: InboundFrame = serde_json::from_value(value)?;
    let event = match frame {
        InboundFrame::Login {
            status,
            user_id,
            message,
        } => {
            if status.as_deref() == Some("success") {
                InboundEvent::LoginSucceeded {
                    user_id: user_id.map(user_id_of).transpose()?,
                }
            } else {
                InboundEvent::LoginRejected {
                    reason: message
                        .or(status)
                        .unwrap_or_else(|| "unknown reason".to_string()),
                }
            }
        }
        InboundFrame::JoinChatRoom {
            error,
            roomid,
            name,
            message,
        } => {
            let succeeded = error.as_ref().and_then(serde_json::Value::as_i64) == Some(0);
            match (succeeded, roomid, name) {
                (true, Some(roomid), Some(name)) => InboundEvent::RoomJoined {
                    room_id: room_id_of(roomid)?,
                    name,
                },
                (_, _, name) => InboundEvent::JoinFailed {
                    name,
                    reason: message.unwrap_or_else(|| match error {
                        Some(error) => format!("error {}", error),
                        None => "no error code".to_string(),
                    }),
                },
            }
        }
        InboundFrame::UserKicked { roomid, userid } => InboundEvent::Kicked {
            room_id: room_id_of(roomid)?,
            user_id: userid.map(user_id_of).transpose()?,
        },
        InboundFrame::ChatRoomMessage {
            roomid,
            userid,
            username,
            text,
        } => InboundEvent::RoomMessage(RoomMessage {
            room_id: room_id_of(roomid)?,
            sender_id: userid.map(user_id_of).transpose()?,
            sender_name: username.unwrap_or_default(),
            text: text.trim().to_string(),
        }),
        InboundFrame::ChatRoomList { rooms } => InboundEvent::RoomListing(
            rooms
                .into_iter()
                .map(|room| RoomListingEntry {
                    name: room.name,
                    occupancy: room.user_count,
                })
                .collect(),
        ),
        InboundFrame::Ping => InboundEvent::Ping,
        InboundFrame::Unknown => InboundEvent::Unhandled { handler },
    };
    Ok(event)
}

fn room_id_of(id: WireId) -> Result<RoomId, ValueObjectError> {
    RoomId::new(id.into_domain())
}

fn user_id_of(id: WireId) -> Result<UserId, ValueObjectError> {
    UserId::new(id.into_domain())
}

// ========================================
// Domain → Wire
// ========================================

impl From<OutboundCommand> for OutboundFrame {
    fn from(command: OutboundCommand) -> Self {
        match command {
            OutboundCommand::Login {
                username,
                password,
                token,
            } => Self::Login {
                username,
                password,
                token: token.as_str().to_string(),
            },
            OutboundCommand::RoomMessage { room_id, text } => Self::ChatRoomMessage {
                r#type: MessageType::Text,
                roomid: WireId::from_domain(room_id.as_str()),
                text,
            },
            OutboundCommand::JoinRoom { name, source } => Self::JoinChatRoom {
                name,
                room_password: String::new(),
                source: source.map(|source| source.as_str().to_string()),
            },
            OutboundCommand::LeaveRoom { room_id } => Self::LeaveChatRoom {
                roomid: WireId::from_domain(room_id.as_str()),
            },
            OutboundCommand::DirectMessage { to, text } => Self::DirectMessage {
                r#type: MessageType::Text,
                to,
                text,
            },
        }
    }
}

/// Encode a command as a JSON text frame
pub fn encode_command(command: OutboundCommand) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundFrame::from(command))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{AuthToken, JoinSource};

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn encode_value(command: OutboundCommand) -> serde_json::Value {
        serde_json::from_str(&encode_command(command).unwrap()).unwrap()
    }

    #[test]
    fn test_decode_login_success() {
        // テスト項目: ログイン成功フレームからボットのユーザー ID を取り出す
        // given (前提条件):
        let raw = r#"{"handler":"login","status":"success","userID":1}"#;

        // when (操作):
        let event = decode_event(raw).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::LoginSucceeded {
                user_id: Some(user("1"))
            }
        );
    }

    #[test]
    fn test_decode_login_rejected() {
        // テスト項目: 成功以外のログイン応答は拒否として扱う
        // given (前提条件):
        let raw = r#"{"handler":"login","status":"error","message":"bad token"}"#;

        // when (操作):
        let event = decode_event(raw).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::LoginRejected {
                reason: "bad token".to_string()
            }
        );
    }

    #[test]
    fn test_decode_join_result() {
        // テスト項目: error が 0 の参加応答だけが参加成功になる
        // given (前提条件):
        let ok = r#"{"handler":"joinchatroom","error":0,"roomid":42,"name":"life"}"#;
        let failed = r#"{"handler":"joinchatroom","error":3,"name":"vip","message":"locked"}"#;

        // when (操作):
        let ok = decode_event(ok).unwrap();
        let failed = decode_event(failed).unwrap();

        // then (期待する結果):
        assert_eq!(
            ok,
            InboundEvent::RoomJoined {
                room_id: room("42"),
                name: "life".to_string()
            }
        );
        assert_eq!(
            failed,
            InboundEvent::JoinFailed {
                name: Some("vip".to_string()),
                reason: "locked".to_string()
            }
        );
    }

    #[test]
    fn test_decode_room_message_trims_text() {
        // テスト項目: ルームメッセージの本文は前後の空白が除かれる
        // given (前提条件):
        let raw = r#"{"handler":"chatroommessage","roomid":"42","userid":7,"username":"QuizBot","text":"  *Maths - 3+4=?*  #77 "}"#;

        // when (操作):
        let event = decode_event(raw).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::RoomMessage(RoomMessage {
                room_id: room("42"),
                sender_id: Some(user("7")),
                sender_name: "QuizBot".to_string(),
                text: "*Maths - 3+4=?*  #77".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_kick_and_listing() {
        // テスト項目: キックとルーム一覧のフレームをデコードできる
        // given (前提条件):
        let kicked = r#"{"handler":"userkicked","roomid":42,"userid":1}"#;
        let listing = r#"{"handler":"chatroomlist","rooms":[{"name":"arcade","userCount":5},{"name":"empty","count":0}]}"#;

        // when (操作):
        let kicked = decode_event(kicked).unwrap();
        let listing = decode_event(listing).unwrap();

        // then (期待する結果):
        assert_eq!(
            kicked,
            InboundEvent::Kicked {
                room_id: room("42"),
                user_id: Some(user("1"))
            }
        );
        assert_eq!(
            listing,
            InboundEvent::RoomListing(vec![
                RoomListingEntry {
                    name: "arcade".to_string(),
                    occupancy: 5
                },
                RoomListingEntry {
                    name: "empty".to_string(),
                    occupancy: 0
                },
            ])
        );
    }

    #[test]
    fn test_decode_unknown_and_malformed_frames() {
        // テスト項目: 未知の handler は Unhandled、壊れたフレームはエラーになる
        // given (前提条件):
        let unknown = r#"{"handler":"typing","roomid":1}"#;
        let no_handler = r#"{"roomid":1}"#;
        let broken = r#"{"handler":"chatroommessage""#;
        let missing_room = r#"{"handler":"chatroommessage","text":"hi"}"#;

        // when (操作):
        let unknown = decode_event(unknown).unwrap();

        // then (期待する結果):
        assert_eq!(
            unknown,
            InboundEvent::Unhandled {
                handler: "typing".to_string()
            }
        );
        assert!(matches!(
            decode_event(no_handler),
            Err(DecodeError::MissingHandler)
        ));
        assert!(matches!(decode_event(broken), Err(DecodeError::Json(_))));
        assert!(matches!(
            decode_event(missing_room),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_encode_room_message_with_numeric_room_id() {
        // テスト項目: ルームメッセージは type=text で、数値の roomid は数値で送られる
        // given (前提条件):
        let command = OutboundCommand::room_message(&room("42"), "7");

        // when (操作):
        let value = encode_value(command);

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"handler": "chatroommessage", "type": "text", "roomid": 42, "text": "7"})
        );
    }

    #[test]
    fn test_encode_join_leave_and_direct_message() {
        // テスト項目: 参加・退出・DM のフレームが期待する形になる
        // given (前提条件):
        let join = OutboundCommand::JoinRoom {
            name: "games".to_string(),
            source: Some(JoinSource::Roamer),
        };
        let leave = OutboundCommand::LeaveRoom {
            room_id: room("room-a"),
        };
        let dm = OutboundCommand::DirectMessage {
            to: "boss".to_string(),
            text: "hi".to_string(),
        };

        // when (操作):
        let join = encode_value(join);
        let leave = encode_value(leave);
        let dm = encode_value(dm);

        // then (期待する結果):
        assert_eq!(
            join,
            json!({"handler": "joinchatroom", "name": "games", "roomPassword": "", "__source": "roamer"})
        );
        assert_eq!(leave, json!({"handler": "leavechatroom", "roomid": "room-a"}));
        assert_eq!(
            dm,
            json!({"handler": "message", "type": "text", "to": "boss", "text": "hi"})
        );
    }

    #[test]
    fn test_encode_login() {
        // テスト項目: ログインフレームにユーザー名・パスワード・トークンが含まれる
        // given (前提条件):
        let command = OutboundCommand::Login {
            username: "ArcadeBot".to_string(),
            password: "secret".to_string(),
            token: AuthToken::new("tok".to_string()).unwrap(),
        };

        // when (操作):
        let value = encode_value(command);

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"handler": "login", "username": "ArcadeBot", "password": "secret", "token": "tok"})
        );
    }
}
