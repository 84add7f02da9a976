//! Control API state.

use std::sync::Arc;

use crate::client::BotSupervisor;

/// Shared application state
pub struct AppState {
    /// BotSupervisor（ボットの起動・停止）
    pub supervisor: Arc<BotSupervisor>,
    /// start / stop に必要なキー（未設定なら誰でも操作できる）
    pub control_key: Option<String>,
}

impl AppState {
    pub fn is_authorized(&self, presented: Option<&str>) -> bool {
        match &self.control_key {
            None => true,
            Some(key) => presented == Some(key.as_str()),
        }
    }
}
