//! HTTP API endpoint handlers.

use std::sync::Arc;

use arcadebot_shared::time::timestamp_to_rfc3339;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use crate::client::BotStatus;

use super::state::AppState;

const CONTROL_KEY_HEADER: &str = "x-control-key";

#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StatusDto {
    pub running: bool,
    pub connected: bool,
    pub started_at: Option<String>,
    pub rooms: Vec<RoomDto>,
    pub watched_rooms: usize,
    pub roamer_running: bool,
    pub roamable_rooms: usize,
}

impl From<BotStatus> for StatusDto {
    fn from(status: BotStatus) -> Self {
        let snapshot = status.snapshot;
        Self {
            running: status.running,
            connected: snapshot.as_ref().is_some_and(|s| s.connected),
            started_at: status.started_at.map(timestamp_to_rfc3339),
            rooms: snapshot
                .as_ref()
                .map(|s| {
                    s.rooms
                        .iter()
                        .map(|room| RoomDto {
                            id: room.id.as_str().to_string(),
                            name: room.name.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            watched_rooms: snapshot.as_ref().map_or(0, |s| s.watched_rooms),
            roamer_running: snapshot.as_ref().is_some_and(|s| s.roamer_running),
            roamable_rooms: snapshot.as_ref().map_or(0, |s| s.roamable_rooms),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusDto> {
    Json(state.supervisor.status().await.into())
}

pub async fn start_bot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
    headers: HeaderMap,
) -> Result<Json<ControlResponse>, StatusCode> {
    authorize(&state, &query, &headers)?;
    let response = if state.supervisor.start().await {
        ControlResponse {
            status: "started",
            message: "Bot is starting",
        }
    } else {
        ControlResponse {
            status: "already_running",
            message: "Bot is already running",
        }
    };
    Ok(Json(response))
}

pub async fn stop_bot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
    headers: HeaderMap,
) -> Result<Json<ControlResponse>, StatusCode> {
    authorize(&state, &query, &headers)?;
    let response = if state.supervisor.stop().await {
        ControlResponse {
            status: "stopped",
            message: "Bot stopped",
        }
    } else {
        ControlResponse {
            status: "not_running",
            message: "Bot is not running",
        }
    };
    Ok(Json(response))
}

fn authorize(state: &AppState, query: &KeyQuery, headers: &HeaderMap) -> Result<(), StatusCode> {
    let presented = query.key.as_deref().or_else(|| {
        headers
            .get(CONTROL_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
    });
    if state.is_authorized(presented) {
        Ok(())
    } else {
        tracing::warn!("Rejected control request with a missing or wrong key");
        Err(StatusCode::FORBIDDEN)
    }
}
