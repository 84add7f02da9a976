//! UseCase: `!` で始まるオペレーターコマンドの実行
//!
//! `!help` と `!j` は誰でも使えます。それ以外はマスターのみで、
//! マスター以外からのコマンドは黙って無視します。
//! 引数の誤りはルームに使い方を返信します。

use std::sync::Arc;

use arcadebot_shared::time::timestamp_to_clock_time;

use crate::domain::{
    Command, CommandLine, CommandParseError, CycleError, DelayRange, OutboundCommand, RoomId,
    RoomMessage,
    command::{CycleAction, DelayAction, QuizAction, RoamAction},
};

use super::{
    context::BotContext,
    cycle::{CycleScheduler, CycleStatus, describe_ranges},
    roam::{RoomRoamer, format_log},
};

pub struct CommandUseCase {
    ctx: Arc<BotContext>,
    cycle: Arc<CycleScheduler>,
    roamer: Arc<RoomRoamer>,
}

impl CommandUseCase {
    pub fn new(ctx: Arc<BotContext>, cycle: Arc<CycleScheduler>, roamer: Arc<RoomRoamer>) -> Self {
        Self { ctx, cycle, roamer }
    }

    /// Parse and run a command message.
    ///
    /// Returns the command that was run, if any.
    pub async fn handle_message(&self, message: &RoomMessage) -> Option<Command> {
        let line = CommandLine::parse(&message.text).ok()?;
        if line.kind.requires_master() && !self.ctx.config.is_master(&message.sender_name) {
            tracing::debug!(
                "Ignoring master-only command from '{}'",
                message.sender_name
            );
            return None;
        }

        match line.into_command() {
            Ok(command) => {
                tracing::info!("Command from '{}': {:?}", message.sender_name, command);
                self.execute(&message.room_id, command.clone()).await;
                Some(command)
            }
            Err(CommandParseError::Usage(usage)) => {
                self.ctx.reply(&message.room_id, usage).await;
                None
            }
            Err(CommandParseError::NotACommand) => None,
        }
    }

    async fn execute(&self, room_id: &RoomId, command: Command) {
        let reply = match command {
            Command::Help => help_text(&self.ctx.config.username),
            Command::Join { room } => {
                self.ctx
                    .send(OutboundCommand::JoinRoom {
                        name: room,
                        source: None,
                    })
                    .await;
                return;
            }
            Command::Quiz(action) => self.quiz(room_id, action).await,
            Command::Delay(action) => self.delay(action).await,
            Command::Cycle(action) => self.cycle(room_id, action).await,
            Command::Roam(action) => self.roam(action).await,
        };
        self.ctx.reply(room_id, reply).await;
    }

    async fn quiz(&self, room_id: &RoomId, action: QuizAction) -> String {
        match action {
            QuizAction::On { bot } => {
                let bot = bot.to_lowercase();
                self.ctx.quiz.lock().await.watch(room_id.clone(), &bot);
                format!("✅ Quiz solver enabled. Watching for questions from '{}'.", bot)
            }
            QuizAction::Off => {
                let removed = self.ctx.quiz.lock().await.unwatch(room_id);
                match removed {
                    Some(removed) => {
                        if let Some(cycle) = removed.cycle {
                            self.cycle.release(cycle);
                            self.cycle.send_resume(room_id).await;
                        }
                        "✅ Quiz solver disabled for this room.".to_string()
                    }
                    None => "ℹ️ Quiz solver is not active in this room.".to_string(),
                }
            }
            QuizAction::Status => match self.ctx.quiz.lock().await.watched_bot(room_id) {
                Some(bot) => format!("🧮 Quiz solver is watching '{}'.", bot),
                None => "ℹ️ Quiz solver is not active in this room.".to_string(),
            },
        }
    }

    async fn delay(&self, action: DelayAction) -> String {
        match action {
            DelayAction::Show => {
                let delay = *self.ctx.answer_delay.lock().await;
                format!("⏱️ Answer delay: {}", delay)
            }
            DelayAction::Set { min_ms, max_ms } => match DelayRange::from_millis(min_ms, max_ms) {
                Ok(delay) => {
                    *self.ctx.answer_delay.lock().await = delay;
                    format!("✅ Answer delay set to {}", delay)
                }
                Err(e) => format!("⚠️ {}", e),
            },
        }
    }

    async fn cycle(&self, room_id: &RoomId, action: CycleAction) -> String {
        match action {
            CycleAction::On => match self.cycle.start(room_id).await {
                Ok(()) => {
                    let config = &self.ctx.config.cycle;
                    format!(
                        "✅ Cycle mode started ({}).",
                        describe_ranges(&config.working, &config.pause)
                    )
                }
                Err(CycleError::NotWatching) => {
                    "ℹ️ Enable the quiz solver first with `!quiz on <bot_username>`.".to_string()
                }
                Err(CycleError::AlreadyRunning) => {
                    "ℹ️ Cycle mode is already running in this room.".to_string()
                }
            },
            CycleAction::Off => {
                if self.cycle.stop(room_id).await {
                    "✅ Cycle mode stopped.".to_string()
                } else {
                    "ℹ️ Cycle mode is not running in this room.".to_string()
                }
            }
            CycleAction::Status => match self.cycle.status(room_id).await {
                CycleStatus::Inactive => "🔁 Cycle mode: off".to_string(),
                CycleStatus::Working { ends_at: Some(ends_at) } => format!(
                    "🔁 Cycle mode: working (next break at {} UTC)",
                    timestamp_to_clock_time(ends_at)
                ),
                CycleStatus::Working { ends_at: None } => "🔁 Cycle mode: working".to_string(),
                CycleStatus::OnBreak { ends_at } => format!(
                    "🔁 Cycle mode: on break until {} UTC",
                    timestamp_to_clock_time(ends_at)
                ),
            },
        }
    }

    async fn roam(&self, action: RoamAction) -> String {
        match action {
            RoamAction::On => {
                if self.roamer.start().await {
                    "✅ Roamer started.".to_string()
                } else {
                    "ℹ️ Roamer is already running.".to_string()
                }
            }
            RoamAction::Off => {
                if self.roamer.stop().await {
                    "✅ Roamer stopped.".to_string()
                } else {
                    "ℹ️ Roamer is not running.".to_string()
                }
            }
            RoamAction::Status => {
                let state = if self.roamer.is_running().await {
                    "running"
                } else {
                    "stopped"
                };
                format!(
                    "🚶 Roamer: {} | known rooms: {}",
                    state,
                    self.roamer.roamable_count().await
                )
            }
            RoamAction::Log => format_log(&self.roamer.recent_log().await),
            RoamAction::Now => {
                let roamer = self.roamer.clone();
                tokio::spawn(async move {
                    let outcome = roamer.roam_once().await;
                    tracing::info!("Manual roam finished: {:?}", outcome);
                });
                "🚶 Roaming now...".to_string()
            }
        }
    }
}

fn help_text(bot_name: &str) -> String {
    format!(
        "🤖 **{} Help Menu** 🤖\n\
         -----------------------------------\n\
         **General:** `!j <room>`\n\
         **Master-Only:** `!quiz on <bot>`, `!quiz off`, `!quiz status`, \
         `!delay [min max]`, `!cycle on|off|status`, `!roam on|off|status|log|now`",
        bot_name
    )
}
