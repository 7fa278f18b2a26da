//! HTTP surface: `POST /act` and `GET /health`.
//!
//! Body validation is axum's `Json` extractor (422-class rejection before
//! any component runs). Provider failures during reduction or generation
//! become a single structured 500; parse anomalies never fail a request.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::action::parse_action;
use crate::generator::{ActionGenerator, HistoryEntry};
use crate::reducer::HtmlReducer;

/// Read-only per-process state; requests share it behind an `Arc` and
/// never mutate it.
pub struct AppState {
    pub reducer: HtmlReducer,
    pub generator: ActionGenerator,
}

/// Task payload as the benchmark harness sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct ActRequest {
    pub task_id: String,
    pub prompt: String,
    pub start_url: String,
    pub snapshot_html: String,
    pub step_index: u32,
    pub web_project_id: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ActResponse {
    pub action: String,
    pub task_id: String,
    pub step_index: u32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/act", post(act_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

async fn act_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActRequest>,
) -> Response {
    info!(
        "act request task_id={} step_index={} url={} history_len={}",
        request.task_id,
        request.step_index,
        request.start_url,
        request.history.len()
    );

    match next_action(&state, &request).await {
        Ok(action) => {
            info!(
                "act response task_id={} step_index={} action={}",
                request.task_id,
                request.step_index,
                preview(&action)
            );
            (
                StatusCode::OK,
                Json(ActResponse {
                    action,
                    task_id: request.task_id,
                    step_index: request.step_index,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(
                "act error task_id={} step_index={}: {e:#}",
                request.task_id, request.step_index
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": format!("Error processing action: {e:#}")})),
            )
                .into_response()
        }
    }
}

/// Reduce, then generate, then parse. The two provider calls are
/// sequential and dependent; the parser at the end cannot fail.
async fn next_action(state: &AppState, request: &ActRequest) -> anyhow::Result<String> {
    let reduced = state
        .reducer
        .reduce(
            &request.snapshot_html,
            &request.start_url,
            Some(&request.prompt),
        )
        .await?;

    let raw = state
        .generator
        .generate(
            &request.prompt,
            &reduced,
            request.step_index,
            &request.history,
            &request.start_url,
        )
        .await?;

    Ok(parse_action(&raw))
}

/// Single-line action preview for the request log, capped at 400 chars.
fn preview(action: &str) -> String {
    let flat = action.replace('\n', " ");
    if flat.chars().count() > 400 {
        let truncated: String = flat.chars().take(400).collect();
        format!("{truncated}...")
    } else {
        flat
    }
}
