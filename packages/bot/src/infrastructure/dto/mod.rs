//! Data Transfer Objects (DTOs) for the chat service protocol.
//!
//! - `wire`: JSON frames exchanged over the WebSocket (`handler` discriminator)
//! - `conversion`: wire frames ⇄ domain events / commands

pub mod conversion;
pub mod wire;

pub use conversion::{DecodeError, decode_event, encode_command};
