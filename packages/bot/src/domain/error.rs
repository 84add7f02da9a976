//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 空文字列の ID
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// 算術ソルバーが答えを出せなかった理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("expression has no '=' sign")]
    MissingEquals,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("malformed expression")]
    Malformed,

    #[error("placeholder has no value")]
    UnboundPlaceholder,

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("no placeholder value in range satisfies the equation")]
    NoSolution,
}

/// 送信（ChatSender）の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// 接続していない状態で送信しようとした
    #[error("not connected to the chat service")]
    NotConnected,

    /// シリアライズ失敗
    #[error("failed to encode outbound frame: {0}")]
    Encode(String),

    /// 送信キューがクローズ済み
    #[error("outbound channel closed: {0}")]
    ChannelClosed(String),
}

/// トークン取得（TokenProvider）の失敗
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("bot password is not configured")]
    MissingPassword,

    #[error("login request failed: {0}")]
    Request(String),

    #[error("login response did not contain a token")]
    MissingToken,
}

/// サイクルモード開始の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// クイズ監視が無効なルーム
    #[error("quiz solver is not active in this room")]
    NotWatching,

    /// 既にサイクルが動いている
    #[error("cycle mode is already running in this room")]
    AlreadyRunning,
}
