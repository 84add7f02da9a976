//! Composition root of one bot run.
//!
//! `Bot` wires the shared context, the outbound sender and every use case
//! together. A new `Bot` is built for each start so no state leaks between runs.

use std::sync::Arc;

use arcadebot_shared::time::Clock;
use tokio_util::sync::CancellationToken;

use crate::{
    config::BotConfig,
    domain::{InboundEvent, RoomSession},
    infrastructure::sender::WebSocketChatSender,
    usecase::{
        AnswerDispatcher, BotContext, CommandUseCase, CycleScheduler, EventUseCase, QuizUseCase,
        RoomRoamer,
    },
};

pub struct Bot {
    ctx: Arc<BotContext>,
    sender: Arc<WebSocketChatSender>,
    events: EventUseCase,
    roamer: Arc<RoomRoamer>,
}

/// Point-in-time view of a bot run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSnapshot {
    pub connected: bool,
    pub rooms: Vec<RoomSession>,
    pub watched_rooms: usize,
    pub roamer_running: bool,
    pub roamable_rooms: usize,
}

impl Bot {
    pub fn new(config: BotConfig, clock: Arc<dyn Clock>) -> Self {
        let sender = Arc::new(WebSocketChatSender::new());
        let ctx = Arc::new(BotContext::new(
            config,
            sender.clone(),
            clock,
            CancellationToken::new(),
        ));

        let cycle = Arc::new(CycleScheduler::new(ctx.clone()));
        let roamer = Arc::new(RoomRoamer::new(ctx.clone()));
        let quiz = Arc::new(QuizUseCase::new(
            ctx.clone(),
            AnswerDispatcher::new(ctx.clone()),
        ));
        let commands = Arc::new(CommandUseCase::new(
            ctx.clone(),
            cycle.clone(),
            roamer.clone(),
        ));
        let events = EventUseCase::new(ctx.clone(), quiz, commands, cycle);

        Self {
            ctx,
            sender,
            events,
            roamer,
        }
    }

    pub fn context(&self) -> &Arc<BotContext> {
        &self.ctx
    }

    pub fn sender(&self) -> &Arc<WebSocketChatSender> {
        &self.sender
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.ctx.shutdown
    }

    pub async fn handle_event(&self, event: InboundEvent) {
        self.events.handle(event).await;
    }

    /// Start background work that runs independently of the connection
    pub async fn start_background(&self) {
        if self.ctx.config.roam.autostart {
            self.roamer.start().await;
        }
    }

    /// Raise the shutdown signal and release everything it guards
    pub async fn shutdown(&self) {
        self.ctx.shutdown.cancel();
        self.ctx.quiz.lock().await.cancel_all_cycles();
        self.roamer.stop().await;
        self.sender.detach().await;
    }

    pub async fn snapshot(&self) -> BotSnapshot {
        let rooms = self.ctx.registry.lock().await.sessions();
        let watched_rooms = {
            let quiz = self.ctx.quiz.lock().await;
            rooms
                .iter()
                .filter(|room| quiz.is_watching(&room.id))
                .count()
        };

        BotSnapshot {
            connected: self.sender.is_connected().await,
            rooms,
            watched_rooms,
            roamer_running: self.roamer.is_running().await,
            roamable_rooms: self.roamer.roamable_count().await,
        }
    }
}
