//! UseCase: 受信イベントの振り分け
//!
//! 接続から届いた `InboundEvent` を受け取り、状態の更新と各ユースケースへの
//! 振り分けを行います。時間のかかる処理（参加待ち、回答の遅延など）はタスクに
//! 切り出すため、`handle` はすぐに返ります。
//!
//! クイズの発言はルームごとのキュー（1 ルーム 1 タスク）で受信順に処理します。
//! ラウンド終了の直後に同じ番号の問題が届いても、順序が入れ替わることはありません。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::domain::{InboundEvent, JoinSource, OutboundCommand, RoomId, RoomMessage, UserId};

use super::{
    command::CommandUseCase, context::BotContext, cycle::CycleScheduler, quiz::QuizUseCase,
    sleep_or_cancel,
};

pub struct EventUseCase {
    ctx: Arc<BotContext>,
    quiz: Arc<QuizUseCase>,
    commands: Arc<CommandUseCase>,
    cycle: Arc<CycleScheduler>,
    quiz_lanes: Mutex<HashMap<RoomId, mpsc::UnboundedSender<RoomMessage>>>,
}

impl EventUseCase {
    pub fn new(
        ctx: Arc<BotContext>,
        quiz: Arc<QuizUseCase>,
        commands: Arc<CommandUseCase>,
        cycle: Arc<CycleScheduler>,
    ) -> Self {
        Self {
            ctx,
            quiz,
            commands,
            cycle,
            quiz_lanes: Mutex::new(HashMap::new()),
        }
    }

    pub async fn handle(&self, event: InboundEvent) {
        match event {
            InboundEvent::LoginSucceeded { user_id } => self.on_login(user_id).await,
            InboundEvent::LoginRejected { reason } => {
                tracing::error!("Login rejected: {}", reason);
            }
            InboundEvent::RoomJoined { room_id, name } => {
                tracing::info!("✅ Joined room '{}' ({})", name, room_id);
                self.ctx.registry.lock().await.insert(room_id, name);
            }
            InboundEvent::JoinFailed { name, reason } => {
                tracing::warn!(
                    "Failed to join room '{}': {}",
                    name.as_deref().unwrap_or("?"),
                    reason
                );
            }
            InboundEvent::Kicked { room_id, user_id } => {
                if self.ctx.is_self(user_id.as_ref()).await {
                    self.on_kicked(room_id).await;
                }
            }
            InboundEvent::RoomMessage(message) => self.on_room_message(message).await,
            InboundEvent::RoomListing(rooms) => {
                let added = self.ctx.roam.lock().await.observe_rooms(
                    rooms
                        .iter()
                        .map(|room| (room.name.as_str(), room.occupancy)),
                );
                tracing::debug!("Room listing: {} rooms, {} new", rooms.len(), added);
            }
            InboundEvent::Ping => tracing::trace!("ping"),
            InboundEvent::Unhandled { handler } => {
                tracing::debug!("Ignoring handler '{}'", handler);
            }
        }
    }

    async fn on_login(&self, user_id: Option<UserId>) {
        match &user_id {
            Some(id) => tracing::info!("✅ Logged in as {} ({})", self.ctx.config.username, id),
            None => tracing::warn!("Logged in, but the server sent no user id"),
        }
        *self.ctx.bot_user_id.lock().await = user_id;

        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            for name in &ctx.config.startup_rooms {
                if !sleep_or_cancel(&ctx.shutdown, ctx.config.connection.room_join_delay).await {
                    return;
                }
                tracing::info!("Joining startup room '{}'", name);
                ctx.send(OutboundCommand::JoinRoom {
                    name: name.clone(),
                    source: Some(JoinSource::Startup),
                })
                .await;
            }
        });
    }

    async fn on_kicked(&self, room_id: RoomId) {
        let room_name = self.ctx.registry.lock().await.remove_by_id(&room_id);
        let cycle = self.ctx.quiz.lock().await.forget_room(&room_id);
        if let Some(cycle) = cycle {
            self.cycle.release(cycle);
        }
        self.quiz_lanes.lock().await.remove(&room_id);

        let Some(room_name) = room_name else {
            tracing::warn!("Kicked from unknown room {}", room_id);
            return;
        };
        if !self.ctx.config.is_startup_room(&room_name) {
            tracing::warn!("Kicked from room '{}'", room_name);
            return;
        }

        let delay = self.ctx.config.connection.rejoin_on_kick_delay;
        tracing::warn!(
            "⚠️ Kicked from startup room '{}'. Rejoining in {:?}...",
            room_name,
            delay
        );
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            if sleep_or_cancel(&ctx.shutdown, delay).await {
                ctx.send(OutboundCommand::JoinRoom {
                    name: room_name,
                    source: Some(JoinSource::Startup),
                })
                .await;
            }
        });
    }

    async fn on_room_message(&self, message: RoomMessage) {
        if self.ctx.is_self(message.sender_id.as_ref()).await {
            return;
        }
        tracing::debug!(
            "[{}] {}: {}",
            message.room_id,
            message.sender_name,
            message.text
        );
        self.ctx.publish_room_message(message.clone());

        if message.text.trim_start().starts_with('!') {
            let commands = self.commands.clone();
            let message = message.clone();
            tokio::spawn(async move {
                commands.handle_message(&message).await;
            });
        }

        if self.ctx.quiz.lock().await.is_watching(&message.room_id) {
            self.enqueue_quiz(message).await;
        }
    }

    /// Hand a message to its room's quiz queue, starting the queue on first use
    async fn enqueue_quiz(&self, message: RoomMessage) {
        let mut lanes = self.quiz_lanes.lock().await;
        let message = match lanes.get(&message.room_id) {
            Some(lane) => match lane.send(message) {
                Ok(()) => return,
                Err(mpsc::error::SendError(message)) => message,
            },
            None => message,
        };

        let (lane, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_quiz_lane(
            self.quiz.clone(),
            self.ctx.shutdown.clone(),
            queue,
        ));
        let room_id = message.room_id.clone();
        if lane.send(message).is_ok() {
            lanes.insert(room_id, lane);
        }
    }
}

async fn run_quiz_lane(
    quiz: Arc<QuizUseCase>,
    shutdown: CancellationToken,
    mut queue: mpsc::UnboundedReceiver<RoomMessage>,
) {
    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => return,
            message = queue.recv() => match message {
                Some(message) => message,
                None => return,
            },
        };
        let outcome = quiz.handle_message(&message).await;
        tracing::debug!("Quiz outcome in room {}: {:?}", message.room_id, outcome);
    }
}
