//! Best-effort prize extraction from roam reward messages.

/// Keywords that mark a reward message (matched case-insensitively)
pub const PRIZE_KEYWORDS: [&str; 6] = [
    "won",
    "gets",
    "prize",
    "congratulations",
    "unlocked",
    "received",
];

/// Used when a reward message was seen but its prize could not be read
pub const UNKNOWN_PRIZE: &str = "Unknown prize";

/// Used when no reward message arrived during the listening window
pub const NO_PRIZE: &str = "No prize message";

/// Extracted prizes at or above this many characters are discarded
pub const MAX_PRIZE_CHARS: usize = 50;

const FILLER_PHRASES: [&str; 11] = [
    "you have won",
    "you won",
    "has won",
    "have won",
    "just won",
    "won",
    "gets",
    "got",
    "received",
    "unlocked",
    "has unlocked",
];

/// Whether `text` looks like a reward addressed to `bot_username`
pub fn is_prize_message(text: &str, bot_username: &str) -> bool {
    let lowered = text.to_lowercase();
    find_ignore_ascii_case(text, bot_username).is_some()
        && PRIZE_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
}

/// Extract the prize description following the bot's username.
///
/// Falls back to [`UNKNOWN_PRIZE`] when the username is missing, nothing is left
/// after stripping filler, or the remainder is implausibly long.
pub fn extract_prize(text: &str, bot_username: &str) -> String {
    let Some(start) = find_ignore_ascii_case(text, bot_username) else {
        return UNKNOWN_PRIZE.to_string();
    };

    let mut rest = strip_punctuation(&text[start + bot_username.len()..]);
    // longest match first so "has unlocked" wins over "unlocked"
    let mut fillers = FILLER_PHRASES;
    fillers.sort_by_key(|phrase| std::cmp::Reverse(phrase.len()));
    if let Some(phrase) = fillers
        .iter()
        .find(|phrase| starts_with_ignore_ascii_case(rest, phrase))
    {
        rest = strip_punctuation(&rest[phrase.len()..]);
    }

    let prize = rest
        .trim_end_matches(|c: char| c == '.' || c == '!' || c.is_whitespace())
        .trim();

    if prize.is_empty() || prize.chars().count() >= MAX_PRIZE_CHARS {
        return UNKNOWN_PRIZE.to_string();
    }
    prize.to_string()
}

fn strip_punctuation(text: &str) -> &str {
    text.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | ':' | '!' | '-' | '@' | '*' | '\'')
    })
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        && text[prefix.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric())
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        haystack
            .get(i..i + needle.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "ArcadeBot";

    #[test]
    fn test_is_prize_message_requires_username_and_keyword() {
        // テスト項目: ボット名とキーワードの両方を含むメッセージだけが賞品メッセージ
        // given (前提条件):
        let cases = [
            ("Congratulations arcadebot! You won 50 coins", true),
            ("ArcadeBot gets a Golden Ticket", true),
            ("alice won 10 coins", false),
            ("hello ArcadeBot", false),
        ];

        for (text, expected) in cases {
            // when (操作):
            let result = is_prize_message(text, BOT);

            // then (期待する結果):
            assert_eq!(result, expected, "text: {}", text);
        }
    }

    #[test]
    fn test_extract_prize_after_username() {
        // テスト項目: ボット名の後ろの文字列から定型句を除いて賞品を取り出す
        // given (前提条件):
        let cases = [
            ("ArcadeBot won 50 coins!", "50 coins"),
            ("🎉 arcadebot has won a Golden Crown.", "a Golden Crown"),
            ("Congrats @ArcadeBot: received 3 gems", "3 gems"),
            ("ArcadeBot has unlocked Neon Font", "Neon Font"),
            ("Congratulations ArcadeBot! You won 50 coins", "50 coins"),
        ];

        for (text, expected) in cases {
            // when (操作):
            let prize = extract_prize(text, BOT);

            // then (期待する結果):
            assert_eq!(prize, expected, "text: {}", text);
        }
    }

    #[test]
    fn test_extract_prize_does_not_strip_partial_words() {
        // テスト項目: 定型句と前方一致するだけの単語は削られない
        // given (前提条件):
        let text = "ArcadeBot gotcha badge";

        // when (操作):
        let prize = extract_prize(text, BOT);

        // then (期待する結果):
        assert_eq!(prize, "gotcha badge");
    }

    #[test]
    fn test_extract_prize_falls_back_when_too_long() {
        // テスト項目: 50 文字以上の抽出結果は汎用の文言に置き換えられる
        // given (前提条件):
        let text = format!("ArcadeBot won {}", "x".repeat(60));

        // when (操作):
        let prize = extract_prize(&text, BOT);

        // then (期待する結果):
        assert_eq!(prize, UNKNOWN_PRIZE);
    }

    #[test]
    fn test_extract_prize_falls_back_when_missing() {
        // テスト項目: ボット名が無い、または何も残らない場合は汎用の文言になる
        // given (前提条件):
        let missing_name = "someone won a prize";
        let nothing_left = "ArcadeBot won!";

        // when (操作):
        let first = extract_prize(missing_name, BOT);
        let second = extract_prize(nothing_left, BOT);

        // then (期待する結果):
        assert_eq!(first, UNKNOWN_PRIZE);
        assert_eq!(second, UNKNOWN_PRIZE);
    }
}
