//! Quiz message classification.
//!
//! Pure functions: the dedup state lives in [`super::quiz_book::QuizBook`] and is
//! applied by the quiz use case.

use std::sync::LazyLock;

use regex::Regex;

use super::value_object::QuestionId;

/// Substrings the quiz bot uses when a round is over.
pub const END_OF_ROUND_MARKERS: [&str; 9] = [
    "The answer was",
    "New Record",
    "Lightning Fast",
    "Hat-trick",
    "Right Answer",
    "Too Slow",
    "Late",
    "Super",
    "Speedy",
];

static HINT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Hint\s*:\s*(.*)").expect("valid hint regex"));

static QUESTION_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Question\s*#|#)(\d+)").expect("valid question regex"));

// The quiz bot sometimes spells "Maths" with a Cyrillic "а".
static PROBLEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\*\s*M[аa]ths\s*-\s*(.*?)\s*\*").expect("valid problem regex")
});

/// Result of classifying one chat line from a watched quiz bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Not from the watched bot, or nothing quiz-related
    Ignore,
    /// The current round is over; the pending question must be released
    EndOfRound,
    /// The quiz bot revealed a hint that is itself an equation
    Hint { problem: String },
    /// A new question was announced; `problem` is `None` when no
    /// `*Maths - ...*` segment could be extracted
    NewQuestion {
        id: QuestionId,
        problem: Option<String>,
    },
}

/// Classify a chat line.
///
/// # Arguments
///
/// * `text` - The chat text
/// * `sender_name` - Username of the author
/// * `watched_bot` - The quiz bot watched in this room, if any
pub fn classify(text: &str, sender_name: &str, watched_bot: Option<&str>) -> QuizEvent {
    let Some(watched_bot) = watched_bot else {
        return QuizEvent::Ignore;
    };
    if !sender_name.eq_ignore_ascii_case(watched_bot) {
        return QuizEvent::Ignore;
    }

    if END_OF_ROUND_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
    {
        return QuizEvent::EndOfRound;
    }

    if let Some(captures) = HINT_PATTERN.captures(text) {
        let problem = captures
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        return QuizEvent::Hint { problem };
    }

    if let Some(id) = extract_question_id(text) {
        return QuizEvent::NewQuestion {
            id,
            problem: extract_problem(text),
        };
    }

    QuizEvent::Ignore
}

fn extract_question_id(text: &str) -> Option<QuestionId> {
    QUESTION_ID_PATTERN
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(QuestionId::new)
}

fn extract_problem(text: &str) -> Option<String> {
    PROBLEM_PATTERN
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|problem| !problem.is_empty())
}
