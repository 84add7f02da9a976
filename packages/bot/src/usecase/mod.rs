//! UseCase 層
//!
//! 受信イベントの振り分け、クイズの自動回答、サイクルモード、ローマーを実装します。
//! どのユースケースも `Arc<BotContext>` を受け取り、送信は `ChatSender` 経由で行います。

pub mod answer;
pub mod command;
pub mod context;
pub mod cycle;
pub mod event;
pub mod quiz;
pub mod roam;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub use answer::AnswerDispatcher;
pub use command::CommandUseCase;
pub use context::BotContext;
pub use cycle::{CycleScheduler, CycleStatus};
pub use event::EventUseCase;
pub use quiz::{QuizOutcome, QuizUseCase};
pub use roam::{RoamOutcome, RoomRoamer};

/// Sleep unless `token` is cancelled first.
///
/// Returns `true` when the full duration elapsed, `false` when cancelled.
pub(crate) async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => !token.is_cancelled(),
    }
}
