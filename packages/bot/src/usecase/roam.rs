//! UseCase: ルームローマー
//!
//! 一定間隔（既定 9〜11 分）で未訪問のルームを 1 つ選び、
//!
//! 1. 参加を要求し、ルーム登録に現れるまでポーリング
//! 2. トリガーコマンド（`.s`）を送信
//! 3. 一定時間、賞品メッセージを待つ
//! 4. 少し待ってから退出し、訪問記録とログを残す
//!
//! という流れを繰り返します。`stop` はループの待機を中断しますが、
//! 実行中の 1 回分は最後まで進みます（シャットダウン時は除く）。

use std::sync::Arc;

use arcadebot_shared::time::timestamp_to_clock_time;
use tokio::{
    sync::{Mutex, broadcast},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::domain::{
    JoinSource, OutboundCommand, RoamBook, RoamLogEntry, RoomId, RoomMessage,
    prize::{NO_PRIZE, extract_prize, is_prize_message},
};

use super::{context::BotContext, sleep_or_cancel};

/// Result of one roam attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoamOutcome {
    Visited(RoamLogEntry),
    NoCandidates,
    /// The room never showed up in the registry after the join request
    JoinTimedOut { room_name: String },
    /// Another roam is in flight
    Busy,
    Cancelled,
}

struct RoamLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct RoomRoamer {
    ctx: Arc<BotContext>,
    running: Mutex<Option<RoamLoop>>,
    in_flight: Mutex<()>,
}

impl RoomRoamer {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self {
            ctx,
            running: Mutex::new(None),
            in_flight: Mutex::new(()),
        }
    }

    /// Start the background loop; `false` if it was already running
    pub async fn start(self: &Arc<Self>) -> bool {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return false;
        }

        let cancel = self.ctx.shutdown.child_token();
        let handle = tokio::spawn(self.clone().run_loop(cancel.clone()));
        *running = Some(RoamLoop { cancel, handle });
        tracing::info!("Roamer started");
        true
    }

    /// Stop the background loop; `false` if it was not running
    pub async fn stop(&self) -> bool {
        let Some(roam_loop) = self.running.lock().await.take() else {
            return false;
        };
        roam_loop.cancel.cancel();
        let was_running = !roam_loop.handle.is_finished();
        tracing::info!("Roamer stopped");
        was_running
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished() && !r.cancel.is_cancelled())
    }

    pub async fn recent_log(&self) -> Vec<RoamLogEntry> {
        let now = self.ctx.now_millis();
        self.ctx.roam.lock().await.recent_log(now)
    }

    pub async fn roamable_count(&self) -> usize {
        self.ctx.roam.lock().await.roamable_count()
    }

    async fn run_loop(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            let wait = self.ctx.config.roam.interval.sample_now();
            tracing::debug!("Next roam in {:?}", wait);
            if !sleep_or_cancel(&cancel, wait).await {
                break;
            }

            match self.roam_once().await {
                RoamOutcome::Visited(entry) => {
                    tracing::info!("Roamed '{}': {}", entry.room_name, entry.prize);
                }
                RoamOutcome::NoCandidates => tracing::info!("No rooms left to roam this cycle"),
                RoamOutcome::JoinTimedOut { room_name } => {
                    tracing::warn!("Could not join '{}', skipping this cycle", room_name);
                }
                RoamOutcome::Busy => tracing::debug!("A roam is already in flight"),
                RoamOutcome::Cancelled => break,
            }
        }
        tracing::debug!("Roam loop ended");
    }

    /// Pick one room and visit it
    pub async fn roam_once(&self) -> RoamOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return RoamOutcome::Busy;
        };
        let ctx = &self.ctx;
        if ctx.is_shutting_down() {
            return RoamOutcome::Cancelled;
        }

        let mut excluded = ctx.config.startup_rooms.clone();
        excluded.extend(ctx.registry.lock().await.names());
        let now = ctx.now_millis();
        let picked = {
            let mut roam = ctx.roam.lock().await;
            pick_room(&mut roam, now, &excluded)
        };
        let Some(room_name) = picked else {
            return RoamOutcome::NoCandidates;
        };

        tracing::info!("Roaming to '{}'", room_name);
        let mut messages = ctx.subscribe_room_messages();
        ctx.send(OutboundCommand::JoinRoom {
            name: room_name.clone(),
            source: Some(JoinSource::Roamer),
        })
        .await;

        let room_id = match self.wait_for_join(&room_name).await {
            Ok(Some(room_id)) => room_id,
            Ok(None) => return RoamOutcome::JoinTimedOut { room_name },
            Err(()) => return RoamOutcome::Cancelled,
        };

        ctx.reply(&room_id, ctx.config.roam.trigger_command.clone())
            .await;
        let prize = tokio::select! {
            _ = ctx.shutdown.cancelled() => return RoamOutcome::Cancelled,
            prize = tokio::time::timeout(
                ctx.config.roam.listen_window,
                wait_for_prize(&mut messages, &room_id, &ctx.config.username),
            ) => prize.ok().flatten(),
        };
        let prize = prize.unwrap_or_else(|| NO_PRIZE.to_string());

        if !sleep_or_cancel(&ctx.shutdown, ctx.config.roam.linger).await {
            return RoamOutcome::Cancelled;
        }
        ctx.send(OutboundCommand::LeaveRoom {
            room_id: room_id.clone(),
        })
        .await;
        ctx.registry.lock().await.remove_by_id(&room_id);
        if let Some(state) = ctx.quiz.lock().await.forget_room(&room_id) {
            state.cancel.cancel();
        }

        let entry = ctx
            .roam
            .lock()
            .await
            .record_visit(&room_name, ctx.now_millis(), prize);
        self.notify_operator(&entry).await;
        RoamOutcome::Visited(entry)
    }

    /// Poll the registry for the joined room; `Err` on shutdown
    async fn wait_for_join(&self, room_name: &str) -> Result<Option<RoomId>, ()> {
        let roam = &self.ctx.config.roam;
        for _ in 0..roam.join_attempts {
            if !sleep_or_cancel(&self.ctx.shutdown, roam.join_poll_interval).await {
                return Err(());
            }
            if let Some(room_id) = self.ctx.registry.lock().await.id_of(room_name) {
                return Ok(Some(room_id));
            }
        }
        Ok(None)
    }

    async fn notify_operator(&self, entry: &RoamLogEntry) {
        let Some(operator) = &self.ctx.config.operator else {
            return;
        };
        self.ctx
            .send(OutboundCommand::DirectMessage {
                to: operator.clone(),
                text: format!("🚶 Roamed '{}': {}", entry.room_name, entry.prize),
            })
            .await;
    }
}

fn pick_room(roam: &mut RoamBook, now: i64, excluded: &[String]) -> Option<String> {
    roam.pick(now, excluded, &mut rand::thread_rng())
}

async fn wait_for_prize(
    messages: &mut broadcast::Receiver<RoomMessage>,
    room_id: &RoomId,
    bot_username: &str,
) -> Option<String> {
    loop {
        match messages.recv().await {
            Ok(message) if message.room_id == *room_id => {
                if is_prize_message(&message.text, bot_username) {
                    return Some(extract_prize(&message.text, bot_username));
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Roamer lagged {} room messages", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Render the roam log for `!roam log`
pub fn format_log(entries: &[RoamLogEntry]) -> String {
    if entries.is_empty() {
        return "📜 No roams in the last 24h.".to_string();
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "{} {}: {}",
                timestamp_to_clock_time(entry.visited_at),
                entry.room_name,
                entry.prize
            )
        })
        .collect();
    format!("📜 Roam log ({}):\n{}", entries.len(), lines.join("\n"))
}
