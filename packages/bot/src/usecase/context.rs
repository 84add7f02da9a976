//! Bot 全体で共有する状態
//!
//! ルーム登録・クイズ監視・ローマーの記録などの可変状態をひとつの構造体に集め、
//! `Arc<BotContext>` として各タスクに渡します。グローバル変数は使いません。
//! 各フィールドは個別のロックで保護し、1 回の read-modify-write は
//! 1 つのロック区間内で完結させます。

use std::sync::Arc;

use arcadebot_shared::time::Clock;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;

use crate::{
    config::BotConfig,
    domain::{
        ChatSender, DelayRange, OutboundCommand, QuizBook, RoamBook, RoomId, RoomMessage,
        RoomRegistry, UserId,
    },
};

const ROOM_MESSAGE_CHANNEL_CAPACITY: usize = 64;

pub struct BotContext {
    pub config: BotConfig,
    pub sender: Arc<dyn ChatSender>,
    pub clock: Arc<dyn Clock>,
    /// Raised once when the bot stops; every suspension point races it
    pub shutdown: CancellationToken,
    pub registry: Mutex<RoomRegistry>,
    pub quiz: Mutex<QuizBook>,
    /// Roamable pool, visited rooms and roam log under one lock
    pub roam: Mutex<RoamBook>,
    pub answer_delay: Mutex<DelayRange>,
    pub bot_user_id: Mutex<Option<UserId>>,
    room_messages: broadcast::Sender<RoomMessage>,
}

impl BotContext {
    pub fn new(
        config: BotConfig,
        sender: Arc<dyn ChatSender>,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Self {
        let visit_ttl_millis = i64::try_from(config.roam.visit_ttl.as_millis()).unwrap_or(i64::MAX);
        let roam = RoamBook::new(visit_ttl_millis, config.roam.log_capacity);
        let answer_delay = config.quiz.answer_delay;
        let (room_messages, _) = broadcast::channel(ROOM_MESSAGE_CHANNEL_CAPACITY);

        Self {
            config,
            sender,
            clock,
            shutdown,
            registry: Mutex::new(RoomRegistry::new()),
            quiz: Mutex::new(QuizBook::new()),
            roam: Mutex::new(roam),
            answer_delay: Mutex::new(answer_delay),
            bot_user_id: Mutex::new(None),
            room_messages,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Send a command; failures are logged and the command is dropped.
    ///
    /// Returns whether the command was handed to the connection.
    pub async fn send(&self, command: OutboundCommand) -> bool {
        match self.sender.send(command).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Dropping outbound command: {}", e);
                false
            }
        }
    }

    pub async fn reply(&self, room_id: &RoomId, text: impl Into<String>) -> bool {
        self.send(OutboundCommand::room_message(room_id, text)).await
    }

    /// Whether `user_id` is the bot's own account
    pub async fn is_self(&self, user_id: Option<&UserId>) -> bool {
        match (user_id, self.bot_user_id.lock().await.as_ref()) {
            (Some(user_id), Some(bot_id)) => user_id == bot_id,
            _ => false,
        }
    }

    pub fn subscribe_room_messages(&self) -> broadcast::Receiver<RoomMessage> {
        self.room_messages.subscribe()
    }

    pub fn publish_room_message(&self, message: RoomMessage) {
        // 受信者がいないときは Err になるが問題ない
        let _ = self.room_messages.send(message);
    }
}
