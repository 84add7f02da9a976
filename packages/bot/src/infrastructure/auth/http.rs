//! ログイン API（HTTP）を使った TokenProvider 実装

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, AuthToken, TokenProvider};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Browser-like headers sent with the login request and the WebSocket upgrade
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";
pub const BROWSER_ORIGIN: &str = "https://howdies.app";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

pub struct HttpTokenProvider {
    client: reqwest::Client,
    login_url: String,
}

impl HttpTokenProvider {
    pub fn new(login_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(LOGIN_TIMEOUT)
            .default_headers(browser_headers())
            .build()
            .map_err(|e| AuthError::Request(e.to_string()))?;
        Ok(Self {
            client,
            login_url: login_url.into(),
        })
    }
}

pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ORIGIN, HeaderValue::from_static(BROWSER_ORIGIN));
    headers
}

#[async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn fetch_token(&self, username: &str, password: &str) -> Result<AuthToken, AuthError> {
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        tracing::info!("🔑 Acquiring login token...");

        let response = self
            .client
            .post(&self.login_url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::Request(e.to_string()))?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let token = body
            .token
            .and_then(|token| AuthToken::new(token).ok())
            .ok_or(AuthError::MissingToken)?;
        tracing::info!("✅ Token acquired.");
        Ok(token)
    }
}
