//! Bot configuration.
//!
//! Every timing constant has a default here; the binary only overrides what is
//! exposed as a CLI flag or environment variable.

use std::time::Duration;

use thiserror::Error;

use crate::domain::DelayRange;

pub const DEFAULT_LOGIN_URL: &str = "https://api.howdies.app/api/login";
pub const DEFAULT_WS_URL: &str = "wss://app.howdies.app/";
pub const DEFAULT_USERNAME: &str = "ArcadeBot";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub username: String,
    pub password: Option<String>,
    pub login_url: String,
    pub ws_url: String,
    /// Rooms joined after login, rejoined after a kick, and never roamed
    pub startup_rooms: Vec<String>,
    /// Lowercased usernames allowed to run master-only commands
    pub masters: Vec<String>,
    /// Username that receives a direct message after each roam
    pub operator: Option<String>,
    pub quiz: QuizConfig,
    pub cycle: CycleConfig,
    pub roam: RoamConfig,
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Initial answer delay; adjustable at runtime with `!delay`
    pub answer_delay: DelayRange,
    pub hint_command: String,
}

#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub working: DelayRange,
    pub pause: DelayRange,
    /// One of these is sent at random when a break begins
    pub stop_commands: Vec<String>,
    /// One of these is sent at random when a break ends
    pub start_commands: Vec<String>,
    /// Sent when a cycle starts and when it is stopped
    pub resume_command: String,
}

#[derive(Debug, Clone)]
pub struct RoamConfig {
    pub interval: DelayRange,
    pub join_attempts: u32,
    pub join_poll_interval: Duration,
    pub listen_window: Duration,
    pub linger: Duration,
    pub trigger_command: String,
    pub visit_ttl: Duration,
    pub log_capacity: usize,
    /// Start the roamer together with the bot
    pub autostart: bool,
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub initial_reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
    pub room_join_delay: Duration,
    pub rejoin_on_kick_delay: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            startup_rooms: vec!["life".to_string()],
            masters: Vec::new(),
            operator: None,
            quiz: QuizConfig::default(),
            cycle: CycleConfig::default(),
            roam: RoamConfig::default(),
            connection: ConnectionConfig::default(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            answer_delay: DelayRange::from_millis(900, 2500).unwrap_or(DelayRange::fixed(
                Duration::from_millis(900),
            )),
            hint_command: ".h".to_string(),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            working: DelayRange::from_secs(900, 1800)
                .unwrap_or(DelayRange::fixed(Duration::from_secs(900))),
            pause: DelayRange::from_secs(20, 120)
                .unwrap_or(DelayRange::fixed(Duration::from_secs(20))),
            stop_commands: vec![".stop".to_string(), ".end".to_string()],
            start_commands: vec![".start".to_string(), ".quiz".to_string()],
            resume_command: ".start".to_string(),
        }
    }
}

impl Default for RoamConfig {
    fn default() -> Self {
        Self {
            interval: DelayRange::from_secs(540, 660)
                .unwrap_or(DelayRange::fixed(Duration::from_secs(600))),
            join_attempts: 10,
            join_poll_interval: Duration::from_secs(1),
            listen_window: Duration::from_secs(7),
            linger: Duration::from_secs(3),
            trigger_command: ".s".to_string(),
            visit_ttl: Duration::from_secs(24 * 60 * 60),
            log_capacity: 100,
            autostart: false,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            initial_reconnect_delay: Duration::from_secs(10),
            max_reconnect_delay: Duration::from_secs(300),
            room_join_delay: Duration::from_secs(2),
            rejoin_on_kick_delay: Duration::from_secs(3),
        }
    }
}

/// 設定値の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bot username must not be empty")]
    EmptyUsername,

    #[error("{0} must not be empty")]
    EmptyCommandSet(&'static str),

    #[error("initial reconnect delay {initial:?} exceeds the maximum {max:?}")]
    ReconnectDelay { initial: Duration, max: Duration },

    #[error("roam join attempts must be at least 1")]
    NoJoinAttempts,
}

impl BotConfig {
    /// Normalise names and check invariants
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }

        self.startup_rooms = normalise_list(self.startup_rooms);
        self.masters = normalise_list(self.masters)
            .into_iter()
            .map(|name| name.to_lowercase())
            .collect();
        self.password = self.password.filter(|password| !password.is_empty());
        self.operator = self
            .operator
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        if self.cycle.stop_commands.is_empty() {
            return Err(ConfigError::EmptyCommandSet("cycle stop commands"));
        }
        if self.cycle.start_commands.is_empty() {
            return Err(ConfigError::EmptyCommandSet("cycle start commands"));
        }
        let connection = &self.connection;
        if connection.initial_reconnect_delay > connection.max_reconnect_delay {
            return Err(ConfigError::ReconnectDelay {
                initial: connection.initial_reconnect_delay,
                max: connection.max_reconnect_delay,
            });
        }
        if self.roam.join_attempts == 0 {
            return Err(ConfigError::NoJoinAttempts);
        }
        Ok(self)
    }

    pub fn is_master(&self, username: &str) -> bool {
        let username = username.to_lowercase();
        self.masters.iter().any(|master| *master == username)
    }

    pub fn is_startup_room(&self, room_name: &str) -> bool {
        self.startup_rooms
            .iter()
            .any(|room| room.eq_ignore_ascii_case(room_name))
    }
}

fn normalise_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
