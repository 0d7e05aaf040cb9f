//! Miscellaneous handlers: ping, leaderboard.

use chrono::Utc;
use serde_json::json;

use super::super::types::{ApiResponse, ApiState, parse_limit};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

pub fn handle_ping() -> ApiResponse {
    ApiResponse::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn handle_leaderboard(state: &ApiState, query: Option<&str>) -> ApiResponse {
    let limit = match parse_limit(query, DEFAULT_LEADERBOARD_LIMIT) {
        Ok(limit) => limit,
        Err(err) => return ApiResponse::error(400, err),
    };

    let policy = &state.orchestrator.rules().streak;
    match state.query.leaderboard(policy, limit, Utc::now()) {
        Ok(entries) => ApiResponse::ok(json!({ "leaderboard": entries })),
        Err(e) => ApiResponse::internal(&e),
    }
}
