//! Test doubles shared by the use case tests.

use std::sync::{Arc, Mutex};

use arcadebot_shared::time::ManualClock;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    config::BotConfig,
    domain::{ChatSender, OutboundCommand, RoomId, RoomMessage, SendError, UserId},
};

use super::context::BotContext;

/// Records every outbound command instead of sending it
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutboundCommand>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<OutboundCommand> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of room messages, in send order
    pub fn room_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|command| match command {
                OutboundCommand::RoomMessage { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send(&self, command: OutboundCommand) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(command);
        Ok(())
    }
}

pub struct TestBot {
    pub ctx: Arc<BotContext>,
    pub sender: Arc<RecordingSender>,
    pub clock: Arc<ManualClock>,
}

pub const START_MILLIS: i64 = 1_700_000_000_000;

pub fn test_bot(config: BotConfig) -> TestBot {
    let sender = Arc::new(RecordingSender::default());
    let clock = Arc::new(ManualClock::new(START_MILLIS));
    let ctx = Arc::new(BotContext::new(
        config.validated().unwrap(),
        sender.clone(),
        clock.clone(),
        CancellationToken::new(),
    ));
    TestBot { ctx, sender, clock }
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn message(room_id: &str, sender: &str, text: &str) -> RoomMessage {
    RoomMessage {
        room_id: room(room_id),
        sender_id: Some(UserId::new(format!("id-{}", sender)).unwrap()),
        sender_name: sender.to_string(),
        text: text.to_string(),
    }
}
