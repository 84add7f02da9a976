//! Per-room quiz state: watches, pending question ids and cycle states.
//!
//! All three live in one book so that removing a watch also removes the room's
//! pending question and cycle; a room never has a cycle without a watch.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use super::{
    error::CycleError,
    value_object::{QuestionId, RoomId},
};

/// Marks that text from `watched_bot` in a room is fed to the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizWatch {
    /// Lowercased username of the external quiz bot
    pub watched_bot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Working,
    Break,
}

/// Cycle mode state of one room
#[derive(Debug, Clone)]
pub struct CycleState {
    pub phase: CyclePhase,
    pub working_ends_at: Option<i64>,
    pub break_ends_at: Option<i64>,
    /// Cancels the room's scheduled transition task
    pub cancel: CancellationToken,
}

impl CycleState {
    /// A freshly started cycle: working, first break not yet scheduled
    pub fn started(cancel: CancellationToken) -> Self {
        Self {
            phase: CyclePhase::Working,
            working_ends_at: None,
            break_ends_at: None,
            cancel,
        }
    }

    pub fn enter_working(&mut self, working_ends_at: i64) {
        self.phase = CyclePhase::Working;
        self.working_ends_at = Some(working_ends_at);
        self.break_ends_at = None;
    }

    pub fn enter_break(&mut self, break_ends_at: i64) {
        self.phase = CyclePhase::Break;
        self.working_ends_at = None;
        self.break_ends_at = Some(break_ends_at);
    }

    /// Whether `now` falls inside the recorded break window
    pub fn is_on_break(&self, now: i64) -> bool {
        self.break_ends_at.is_some_and(|ends_at| now < ends_at)
    }
}

/// What was dropped when a room's watch went away
#[derive(Debug)]
pub struct RemovedWatch {
    pub watch: QuizWatch,
    pub cycle: Option<CycleState>,
}

#[derive(Debug, Default)]
pub struct QuizBook {
    watches: HashMap<RoomId, QuizWatch>,
    pending: HashMap<RoomId, QuestionId>,
    cycles: HashMap<RoomId, CycleState>,
}

impl QuizBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or retarget) the quiz watch of a room; any pending question is released
    pub fn watch(&mut self, room_id: RoomId, watched_bot: &str) {
        self.pending.remove(&room_id);
        self.watches.insert(
            room_id,
            QuizWatch {
                watched_bot: watched_bot.to_lowercase(),
            },
        );
    }

    /// Stop watching a room, dropping its pending question and cycle
    pub fn unwatch(&mut self, room_id: &RoomId) -> Option<RemovedWatch> {
        let watch = self.watches.remove(room_id)?;
        self.pending.remove(room_id);
        let cycle = self.cycles.remove(room_id);
        Some(RemovedWatch { watch, cycle })
    }

    pub fn watched_bot(&self, room_id: &RoomId) -> Option<&str> {
        self.watches
            .get(room_id)
            .map(|watch| watch.watched_bot.as_str())
    }

    pub fn is_watching(&self, room_id: &RoomId) -> bool {
        self.watches.contains_key(room_id)
    }

    /// Check-and-set of the pending question.
    ///
    /// Returns `true` when `id` is new for the room (and is now pending),
    /// `false` when it duplicates the pending one.
    pub fn lock_question(&mut self, room_id: &RoomId, id: QuestionId) -> bool {
        if self.pending.get(room_id) == Some(&id) {
            return false;
        }
        self.pending.insert(room_id.clone(), id);
        true
    }

    /// Release the pending question; returns whether one was pending
    pub fn clear_question(&mut self, room_id: &RoomId) -> bool {
        self.pending.remove(room_id).is_some()
    }

    pub fn pending_question(&self, room_id: &RoomId) -> Option<QuestionId> {
        self.pending.get(room_id).copied()
    }

    /// Register a cycle for a watched room
    pub fn start_cycle(&mut self, room_id: RoomId, state: CycleState) -> Result<(), CycleError> {
        if !self.watches.contains_key(&room_id) {
            return Err(CycleError::NotWatching);
        }
        if self.cycles.contains_key(&room_id) {
            return Err(CycleError::AlreadyRunning);
        }
        self.cycles.insert(room_id, state);
        Ok(())
    }

    pub fn cycle(&self, room_id: &RoomId) -> Option<&CycleState> {
        self.cycles.get(room_id)
    }

    pub fn cycle_mut(&mut self, room_id: &RoomId) -> Option<&mut CycleState> {
        self.cycles.get_mut(room_id)
    }

    pub fn remove_cycle(&mut self, room_id: &RoomId) -> Option<CycleState> {
        self.cycles.remove(room_id)
    }

    /// Drop everything known about a room (left or kicked)
    pub fn forget_room(&mut self, room_id: &RoomId) -> Option<CycleState> {
        self.watches.remove(room_id);
        self.pending.remove(room_id);
        self.cycles.remove(room_id)
    }

    /// Cancel every cycle task (used on shutdown)
    pub fn cancel_all_cycles(&mut self) {
        for (_, state) in self.cycles.drain() {
            state.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_lock_question_deduplicates() {
        // テスト項目: 同じ問題番号は 2 回目以降重複として扱われる
        // given (前提条件):
        let mut book = QuizBook::new();
        book.watch(room("1"), "QuizBot");

        // when (操作):
        let first = book.lock_question(&room("1"), QuestionId::new(77));
        let second = book.lock_question(&room("1"), QuestionId::new(77));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(book.pending_question(&room("1")), Some(QuestionId::new(77)));
    }

    #[test]
    fn test_clear_question_allows_same_id_again() {
        // テスト項目: ラウンド終了後は同じ番号でも新しい問題として扱われる
        // given (前提条件):
        let mut book = QuizBook::new();
        book.watch(room("1"), "QuizBot");
        book.lock_question(&room("1"), QuestionId::new(77));

        // when (操作):
        let cleared = book.clear_question(&room("1"));
        let relocked = book.lock_question(&room("1"), QuestionId::new(77));

        // then (期待する結果):
        assert!(cleared);
        assert!(relocked);
    }

    #[test]
    fn test_pending_question_is_per_room() {
        // テスト項目: 問題番号の重複判定はルームごとに独立している
        // given (前提条件):
        let mut book = QuizBook::new();
        book.lock_question(&room("1"), QuestionId::new(5));

        // when (操作):
        let other_room = book.lock_question(&room("2"), QuestionId::new(5));

        // then (期待する結果):
        assert!(other_room);
    }

    #[test]
    fn test_watch_stores_lowercase_bot_name() {
        // テスト項目: 監視対象のボット名は小文字で保持される
        // given (前提条件):
        let mut book = QuizBook::new();

        // when (操作):
        book.watch(room("1"), "QuizBot");

        // then (期待する結果):
        assert_eq!(book.watched_bot(&room("1")), Some("quizbot"));
        assert!(book.is_watching(&room("1")));
    }

    #[test]
    fn test_start_cycle_requires_watch() {
        // テスト項目: クイズ監視が無いルームではサイクルを開始できない
        // given (前提条件):
        let mut book = QuizBook::new();

        // when (操作):
        let result = book.start_cycle(room("1"), CycleState::started(CancellationToken::new()));

        // then (期待する結果):
        assert_eq!(result, Err(CycleError::NotWatching));
        assert!(book.cycle(&room("1")).is_none());
    }

    #[test]
    fn test_start_cycle_twice_is_rejected() {
        // テスト項目: 既にサイクルがあるルームでは二重に開始できない
        // given (前提条件):
        let mut book = QuizBook::new();
        book.watch(room("1"), "QuizBot");
        book.start_cycle(room("1"), CycleState::started(CancellationToken::new()))
            .unwrap();

        // when (操作):
        let result = book.start_cycle(room("1"), CycleState::started(CancellationToken::new()));

        // then (期待する結果):
        assert_eq!(result, Err(CycleError::AlreadyRunning));
    }

    #[test]
    fn test_unwatch_removes_pending_and_cycle() {
        // テスト項目: 監視解除で保留中の問題とサイクルも削除される
        // given (前提条件):
        let mut book = QuizBook::new();
        book.watch(room("1"), "QuizBot");
        book.lock_question(&room("1"), QuestionId::new(9));
        book.start_cycle(room("1"), CycleState::started(CancellationToken::new()))
            .unwrap();

        // when (操作):
        let removed = book.unwatch(&room("1")).unwrap();

        // then (期待する結果):
        assert_eq!(removed.watch.watched_bot, "quizbot");
        assert!(removed.cycle.is_some());
        assert!(book.pending_question(&room("1")).is_none());
        assert!(book.cycle(&room("1")).is_none());
        assert!(book.unwatch(&room("1")).is_none());
    }

    #[test]
    fn test_cycle_state_break_window() {
        // テスト項目: 休憩終了時刻と現在時刻の比較で休憩中かどうかを判定する
        // given (前提条件):
        let mut state = CycleState::started(CancellationToken::new());

        // when (操作):
        state.enter_break(10_000);

        // then (期待する結果):
        assert_eq!(state.phase, CyclePhase::Break);
        assert!(state.is_on_break(9_999));
        assert!(!state.is_on_break(10_000));

        state.enter_working(50_000);
        assert_eq!(state.phase, CyclePhase::Working);
        assert!(!state.is_on_break(0));
        assert_eq!(state.break_ends_at, None);
    }

    #[test]
    fn test_cancel_all_cycles_cancels_tokens() {
        // テスト項目: 全サイクルのキャンセルでトークンがキャンセルされる
        // given (前提条件):
        let mut book = QuizBook::new();
        let token = CancellationToken::new();
        book.watch(room("1"), "QuizBot");
        book.start_cycle(room("1"), CycleState::started(token.clone()))
            .unwrap();

        // when (操作):
        book.cancel_all_cycles();

        // then (期待する結果):
        assert!(token.is_cancelled());
        assert!(book.cycle(&room("1")).is_none());
    }
}
