//! 外部とのやり取りのインターフェース
//!
//! ドメイン層がインターフェースを定義し、具体的な実装は Infrastructure 層が
//! 提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    error::{AuthError, SendError},
    event::OutboundCommand,
    value_object::AuthToken,
};

/// チャットサービスへの送信口
///
/// 回答ディスパッチ、サイクルのタイマー、ローマーなど複数のタスクから
/// 同時に呼ばれるため、実装は並行呼び出しに対して安全である必要があります。
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, command: OutboundCommand) -> Result<(), SendError>;
}

/// ログイン API からトークンを取得する
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self, username: &str, password: &str) -> Result<AuthToken, AuthError>;
}
