//! HTTP request handlers for the quest API.

mod events;
mod misc;
mod users;

pub use events::handle_task_completed;
pub use misc::{handle_leaderboard, handle_ping};
pub use users::{
    handle_get_settings, handle_put_settings, handle_user_achievements, handle_user_history,
    handle_user_stats,
};

use super::types::{ApiResponse, ApiState, UserResource, parse_user_path};

/// Dispatch one authorized request. `body` is only read for POST and PUT.
pub fn route(
    state: &ApiState,
    method: &str,
    path: &str,
    query: Option<&str>,
    body: &str,
) -> ApiResponse {
    match (method, path) {
        ("GET", "/api/ping") => handle_ping(),
        ("POST", "/api/events/task-completed") => handle_task_completed(state, body),
        ("GET", "/api/leaderboard") => handle_leaderboard(state, query),
        (method, p) if p.starts_with("/api/users/") => {
            let (user_id, resource) = match parse_user_path(p) {
                Ok(parsed) => parsed,
                Err("not_found") => return ApiResponse::not_found(),
                Err(err) => return ApiResponse::error(400, err),
            };

            match (method, resource) {
                ("GET", UserResource::Stats) => handle_user_stats(state, &user_id),
                ("GET", UserResource::Achievements) => handle_user_achievements(state, &user_id),
                ("GET", UserResource::History) => handle_user_history(state, &user_id, query),
                ("GET", UserResource::Settings) => handle_get_settings(state, &user_id),
                ("PUT", UserResource::Settings) => handle_put_settings(state, &user_id, body),
                _ => ApiResponse::error(405, "method_not_allowed"),
            }
        }
        _ => ApiResponse::not_found(),
    }
}
