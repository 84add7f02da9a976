//! Chat-room automation bot.
//!
//! Layers, inside out:
//!
//! - `domain`: pure logic (solver, classifier, command parsing) and in-memory state
//! - `usecase`: quiz answering, cycle mode, room roamer, event routing
//! - `infrastructure`: wire DTOs, WebSocket sender, HTTP token provider
//! - `client`: connection session, reconnect loop, run supervision
//! - `ui`: HTTP control API

pub mod bot;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
