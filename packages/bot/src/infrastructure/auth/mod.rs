//! 認証（`TokenProvider`）の実装

pub mod http;

pub use http::{HttpTokenProvider, browser_headers};
