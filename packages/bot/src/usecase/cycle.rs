//! UseCase: サイクルモード
//!
//! ルームごとに 1 つのタスクが Working / Break の 2 状態を交互に進めます。
//!
//! ```text
//! start ──(resume)──> Working ──(stop コマンド)──> Break ──(start コマンド)──> Working ...
//! ```
//!
//! タスクはルームの `CycleState` が持つ `CancellationToken`（シャットダウンの子トークン）で
//! 中断されます。状態の更新とコマンド送信はクイズブックのロック内で、トークンがキャンセル
//! されていないことを確認してから行うため、停止済みのサイクルが状態を書き戻したり、
//! 停止時の resume の後に stop を送ったりすることはありません。

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio_util::sync::CancellationToken;

use crate::domain::{CycleError, CyclePhase, CycleState, DelayRange, RoomId};

use super::{context::BotContext, sleep_or_cancel};

/// Cycle mode of one room as reported by `!cycle status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Inactive,
    Working { ends_at: Option<i64> },
    OnBreak { ends_at: i64 },
}

pub struct CycleScheduler {
    ctx: Arc<BotContext>,
}

impl CycleScheduler {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    /// Start cycle mode for a watched room
    pub async fn start(&self, room_id: &RoomId) -> Result<(), CycleError> {
        let cancel = self.ctx.shutdown.child_token();
        self.ctx
            .quiz
            .lock()
            .await
            .start_cycle(room_id.clone(), CycleState::started(cancel.clone()))?;

        tracing::info!("Cycle mode started in room {}", room_id);
        tokio::spawn(run_cycle(self.ctx.clone(), room_id.clone(), cancel));
        Ok(())
    }

    /// Stop cycle mode and leave the quiz bot running.
    ///
    /// Returns `false` when no cycle was running.
    pub async fn stop(&self, room_id: &RoomId) -> bool {
        let Some(state) = self.ctx.quiz.lock().await.remove_cycle(room_id) else {
            return false;
        };
        self.release(state);
        tracing::info!("Cycle mode stopped in room {}", room_id);
        self.send_resume(room_id).await;
        true
    }

    /// Cancel the task of a cycle that was already removed from the quiz book
    pub fn release(&self, state: CycleState) {
        state.cancel.cancel();
    }

    /// Send the resume command unless the bot is shutting down
    pub async fn send_resume(&self, room_id: &RoomId) {
        if self.ctx.is_shutting_down() {
            return;
        }
        self.ctx
            .reply(room_id, self.ctx.config.cycle.resume_command.clone())
            .await;
    }

    pub async fn status(&self, room_id: &RoomId) -> CycleStatus {
        let now = self.ctx.now_millis();
        match self.ctx.quiz.lock().await.cycle(room_id) {
            None => CycleStatus::Inactive,
            Some(state) => match state.break_ends_at {
                Some(ends_at) if state.is_on_break(now) => CycleStatus::OnBreak { ends_at },
                _ => CycleStatus::Working {
                    ends_at: state.working_ends_at,
                },
            },
        }
    }
}

async fn run_cycle(ctx: Arc<BotContext>, room_id: RoomId, cancel: CancellationToken) {
    let config = &ctx.config.cycle;
    let mut command = config.resume_command.clone();

    loop {
        let working = config.working.sample_now();
        if !enter_phase(&ctx, &room_id, &cancel, CyclePhase::Working, &working, command).await {
            return;
        }
        tracing::info!("Cycle working in room {} for {:?}", room_id, working);
        if !sleep_or_cancel(&cancel, working).await {
            return;
        }

        let pause = config.pause.sample_now();
        let stop = pick_command(&config.stop_commands);
        if !enter_phase(&ctx, &room_id, &cancel, CyclePhase::Break, &pause, stop).await {
            return;
        }
        tracing::info!("Cycle break in room {} for {:?}", room_id, pause);
        if !sleep_or_cancel(&cancel, pause).await {
            return;
        }

        command = pick_command(&config.start_commands);
    }
}

/// Record the next phase and send its command; `false` means the cycle was stopped meanwhile.
///
/// The command is sent while the quiz book is locked, so a concurrent `stop` can only
/// send its final resume after it.
async fn enter_phase(
    ctx: &BotContext,
    room_id: &RoomId,
    cancel: &CancellationToken,
    phase: CyclePhase,
    duration: &std::time::Duration,
    command: String,
) -> bool {
    let ends_at = ctx.now_millis() + duration_millis(duration);
    let mut quiz = ctx.quiz.lock().await;
    if cancel.is_cancelled() || ctx.is_shutting_down() {
        return false;
    }
    let Some(state) = quiz.cycle_mut(room_id) else {
        return false;
    };
    match phase {
        CyclePhase::Working => state.enter_working(ends_at),
        CyclePhase::Break => state.enter_break(ends_at),
    }
    ctx.reply(room_id, command).await;
    drop(quiz);
    true
}

fn pick_command(commands: &[String]) -> String {
    commands
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_default()
}

fn duration_millis(duration: &std::time::Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Expose the configured ranges to `!cycle status`
pub fn describe_ranges(working: &DelayRange, pause: &DelayRange) -> String {
    format!(
        "working {}-{}s, break {}-{}s",
        working.min().as_secs(),
        working.max().as_secs(),
        pause.min().as_secs(),
        pause.max().as_secs()
    )
}
