//! Inbound completion webhook: POST /api/events/task-completed

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use super::super::types::{ApiResponse, ApiState};
use crate::completion::CompletionError;
use crate::domain::InboundEvent;

pub fn handle_task_completed(state: &ApiState, body: &str) -> ApiResponse {
    let event: InboundEvent = match serde_json::from_str(body) {
        Ok(event) => event,
        Err(e) => return ApiResponse::error_with_details(400, "invalid_json", e),
    };

    match state.orchestrator.handle_inbound(event, Utc::now()) {
        Ok(outcome) => ApiResponse::from_serialize(&outcome),
        Err(CompletionError::Invalid(e)) => {
            ApiResponse::error_with_details(400, "invalid_event", e)
        }
        Err(e @ CompletionError::Store(_)) => {
            warn!("[quest:http] Completion not applied: {}", e);
            ApiResponse {
                status: 503,
                body: json!({
                    "error": "persistence_failed",
                    "details": e.to_string(),
                    "retry": e.is_retryable(),
                }),
            }
        }
    }
}
