//! WebSocket client plumbing: session, reconnect loop and run supervision.

mod domain;
mod error;
mod runner;
mod session;
mod supervisor;

pub use error::ClientError;
pub use runner::run_bot;
pub use session::{SessionEnd, run_session};
pub use supervisor::{BotStatus, BotSupervisor};
