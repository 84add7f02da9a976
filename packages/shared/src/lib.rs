//! Utilities shared by the arcadebot packages.

pub mod logger;
pub mod time;
