//! Value Object 定義
//!
//! チャットサービス側の ID は JSON 上で数値にも文字列にもなり得るため、
//! ドメイン層では文字列として保持し、ワイヤ形式への変換は DTO 層で行います。

use std::fmt;

use super::error::ValueObjectError;

/// ルーム ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("RoomId"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ユーザー ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("UserId"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// クイズの問題番号（`#123` の数字部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionId(u64);

impl QuestionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// チャットサービスのログイン API が返すトークン
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("AuthToken"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// トークンはログに出さない
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_rejects_empty() {
        // テスト項目: 空文字列や空白のみの RoomId は生成できない
        // given (前提条件):
        let empty = String::new();
        let blank = "   ".to_string();

        // when (操作):
        let result_empty = RoomId::new(empty);
        let result_blank = RoomId::new(blank);

        // then (期待する結果):
        assert_eq!(result_empty, Err(ValueObjectError::Empty("RoomId")));
        assert_eq!(result_blank, Err(ValueObjectError::Empty("RoomId")));
    }

    #[test]
    fn test_room_id_roundtrip_string() {
        // テスト項目: RoomId は元の文字列をそのまま保持する
        // given (前提条件):
        let room_id = RoomId::new("4242".to_string()).unwrap();

        // when (操作):
        let display = room_id.to_string();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "4242");
        assert_eq!(display, "4242");
        assert_eq!(room_id.into_string(), "4242");
    }

    #[test]
    fn test_user_id_rejects_empty() {
        // テスト項目: 空の UserId は生成できない
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = UserId::new(value);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_token_debug_is_redacted() {
        // テスト項目: AuthToken の Debug 出力にトークン本体は含まれない
        // given (前提条件):
        let token = AuthToken::new("secret-token".to_string()).unwrap();

        // when (操作):
        let debug = format!("{:?}", token);

        // then (期待する結果):
        assert!(!debug.contains("secret-token"));
        assert_eq!(token.as_str(), "secret-token");
    }

    #[test]
    fn test_question_id_display() {
        // テスト項目: QuestionId は `#番号` 形式で表示される
        // given (前提条件):
        let id = QuestionId::new(77);

        // when (操作):
        let display = id.to_string();

        // then (期待する結果):
        assert_eq!(display, "#77");
        assert_eq!(id.value(), 77);
    }
}
