//! HTTP control API (start / stop / status of the bot).

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
