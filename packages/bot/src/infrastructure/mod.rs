//! Infrastructure 層
//!
//! ドメイン層のインターフェース（`ChatSender`, `TokenProvider`）の実装と、
//! ワイヤ形式の DTO を提供します。

pub mod auth;
pub mod dto;
pub mod sender;
