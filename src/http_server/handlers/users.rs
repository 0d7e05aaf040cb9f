//! Per-user handlers: stats, achievements, history, settings.

use chrono::Utc;
use serde_json::json;

use super::super::types::{ApiResponse, ApiState, parse_limit};
use crate::domain::UserSettings;
use crate::store::settings::save_settings;

const DEFAULT_HISTORY_LIMIT: usize = 50;

pub fn handle_user_stats(state: &ApiState, user_id: &str) -> ApiResponse {
    let orchestrator = &state.orchestrator;
    match state
        .query
        .user_stats(orchestrator.rules(), orchestrator.catalog(), user_id, Utc::now())
    {
        Ok(stats) => ApiResponse::from_serialize(&stats),
        Err(e) => ApiResponse::internal(&e),
    }
}

pub fn handle_user_achievements(state: &ApiState, user_id: &str) -> ApiResponse {
    match state.query.achievements(state.orchestrator.catalog(), user_id) {
        Ok(achievements) => {
            let unlocked = achievements.iter().filter(|a| a.unlocked_at.is_some()).count();
            ApiResponse::ok(json!({
                "user_id": user_id,
                "unlocked": unlocked,
                "total": achievements.len(),
                "achievements": achievements,
            }))
        }
        Err(e) => ApiResponse::internal(&e),
    }
}

pub fn handle_user_history(state: &ApiState, user_id: &str, query: Option<&str>) -> ApiResponse {
    let limit = match parse_limit(query, DEFAULT_HISTORY_LIMIT) {
        Ok(limit) => limit,
        Err(err) => return ApiResponse::error(400, err),
    };

    match state.query.history(user_id, limit) {
        Ok(history) => ApiResponse::ok(json!({ "user_id": user_id, "history": history })),
        Err(e) => ApiResponse::internal(&e),
    }
}

pub fn handle_get_settings(state: &ApiState, user_id: &str) -> ApiResponse {
    match state.query.settings(user_id) {
        Ok(settings) => ApiResponse::ok(json!({ "user_id": user_id, "settings": settings })),
        Err(e) => ApiResponse::internal(&e),
    }
}

/// Fields missing from the body keep their default (true)
pub fn handle_put_settings(state: &ApiState, user_id: &str, body: &str) -> ApiResponse {
    let settings: UserSettings = match serde_json::from_str(body) {
        Ok(settings) => settings,
        Err(e) => return ApiResponse::error_with_details(400, "invalid_json", e),
    };

    if let Err(e) = save_settings(&state.db.conn(), user_id, &settings, Utc::now()) {
        return ApiResponse::internal(&anyhow::Error::from(e));
    }
    ApiResponse::ok(json!({ "user_id": user_id, "settings": settings }))
}
