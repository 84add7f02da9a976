//! UseCase: 回答の遅延送信
//!
//! 回答はすぐには送らず、`[min, max]` から一様に選んだ時間だけ待ってから送信します。
//! 遅延の範囲は `!delay` で実行中に変更でき、各タスクは待機を始める時点の値を読みます。
//! シャットダウンは待機の前後で確認し、待機そのものもシャットダウンで中断されます。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::RoomId;

use super::{context::BotContext, sleep_or_cancel};

#[derive(Clone)]
pub struct AnswerDispatcher {
    ctx: Arc<BotContext>,
}

impl AnswerDispatcher {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    /// Schedule `answer` for `room_id` as an independent task.
    ///
    /// The task resolves to whether the answer was sent.
    pub fn dispatch(&self, room_id: RoomId, answer: String) -> JoinHandle<bool> {
        let ctx = self.ctx.clone();
        tokio::spawn(async move { deliver(&ctx, &room_id, answer).await })
    }
}

async fn deliver(ctx: &BotContext, room_id: &RoomId, answer: String) -> bool {
    if ctx.is_shutting_down() {
        tracing::debug!("Shutdown requested, not answering in room {}", room_id);
        return false;
    }

    let delay = ctx.answer_delay.lock().await.sample_now();
    tracing::debug!("Answering '{}' in room {} after {:?}", answer, room_id, delay);
    if !sleep_or_cancel(&ctx.shutdown, delay).await || ctx.is_shutting_down() {
        tracing::debug!("Shutdown during answer delay, dropping '{}'", answer);
        return false;
    }

    ctx.reply(room_id, answer).await
}
