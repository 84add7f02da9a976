//! Domain logic for the connection loop.
//!
//! Pure functions without side effects, kept apart so they are easy to test.

use std::time::Duration;

/// Inbound payloads are cut to this many characters in logs
pub const LOG_PAYLOAD_LIMIT: usize = 500;

/// Next reconnect wait: double the current one, capped at `max`
pub fn next_reconnect_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Cut a payload to `limit` characters on a char boundary
pub fn truncate_for_log(payload: &str, limit: usize) -> &str {
    match payload.char_indices().nth(limit) {
        Some((index, _)) => &payload[..index],
        None => payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_reconnect_delay_doubles() {
        // テスト項目: 再接続の待ち時間は倍々に増える
        // given (前提条件):
        let current = Duration::from_secs(10);

        // when (操作):
        let next = next_reconnect_delay(current, Duration::from_secs(300));

        // then (期待する結果):
        assert_eq!(next, Duration::from_secs(20));
    }

    #[test]
    fn test_next_reconnect_delay_is_capped() {
        // テスト項目: 再接続の待ち時間は上限を超えない
        // given (前提条件):
        let current = Duration::from_secs(160);

        // when (操作):
        let next = next_reconnect_delay(current, Duration::from_secs(300));
        let after_cap = next_reconnect_delay(next, Duration::from_secs(300));

        // then (期待する結果):
        assert_eq!(next, Duration::from_secs(300));
        assert_eq!(after_cap, Duration::from_secs(300));
    }

    #[test]
    fn test_truncate_for_log_short_payload() {
        // テスト項目: 上限以下のペイロードはそのまま
        // given (前提条件):
        let payload = r#"{"handler":"ping"}"#;

        // when (操作):
        let truncated = truncate_for_log(payload, LOG_PAYLOAD_LIMIT);

        // then (期待する結果):
        assert_eq!(truncated, payload);
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // テスト項目: マルチバイト文字の途中で切らずに文字数で切り詰める
        // given (前提条件):
        let payload = "🎉".repeat(600);

        // when (操作):
        let truncated = truncate_for_log(&payload, LOG_PAYLOAD_LIMIT);

        // then (期待する結果):
        assert_eq!(truncated.chars().count(), 500);
    }
}
