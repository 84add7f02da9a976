//! Start/stop control over one bot run at a time.

use std::{sync::Arc, time::Duration};

use arcadebot_shared::time::Clock;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    bot::{Bot, BotSnapshot},
    config::BotConfig,
    domain::TokenProvider,
};

use super::runner::run_bot;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

struct BotRun {
    bot: Arc<Bot>,
    handle: JoinHandle<()>,
    started_at: i64,
}

/// Status reported by the control API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotStatus {
    pub running: bool,
    pub started_at: Option<i64>,
    pub snapshot: Option<BotSnapshot>,
}

pub struct BotSupervisor {
    config: BotConfig,
    tokens: Arc<dyn TokenProvider>,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<BotRun>>,
}

impl BotSupervisor {
    pub fn new(config: BotConfig, tokens: Arc<dyn TokenProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            tokens,
            clock,
            current: Mutex::new(None),
        }
    }

    /// Start a fresh run; `false` if one is already running
    pub async fn start(&self) -> bool {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|run| !run.handle.is_finished()) {
            return false;
        }

        let bot = Arc::new(Bot::new(self.config.clone(), self.clock.clone()));
        bot.start_background().await;
        let handle = tokio::spawn(run_bot(bot.clone(), self.tokens.clone()));
        *current = Some(BotRun {
            bot,
            handle,
            started_at: self.clock.now_millis(),
        });
        tracing::info!("Bot started as '{}'", self.config.username);
        true
    }

    /// Stop the current run; `false` if nothing was running
    pub async fn stop(&self) -> bool {
        let Some(mut run) = self.current.lock().await.take() else {
            return false;
        };
        let was_running = !run.handle.is_finished();

        run.bot.shutdown().await;
        if tokio::time::timeout(STOP_TIMEOUT, &mut run.handle)
            .await
            .is_err()
        {
            tracing::warn!("Bot did not stop within {:?}, aborting", STOP_TIMEOUT);
            run.handle.abort();
        }
        tracing::info!("Bot stopped");
        was_running
    }

    pub async fn status(&self) -> BotStatus {
        let (bot, started_at, running) = {
            let current = self.current.lock().await;
            match current.as_ref() {
                Some(run) => (
                    Some(run.bot.clone()),
                    Some(run.started_at),
                    !run.handle.is_finished(),
                ),
                None => (None, None, false),
            }
        };
        let snapshot = match bot {
            Some(bot) => Some(bot.snapshot().await),
            None => None,
        };
        BotStatus {
            running,
            started_at,
            snapshot,
        }
    }
}
