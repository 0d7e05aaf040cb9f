//! Type definitions for the HTTP server.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::completion::CompletionOrchestrator;
use crate::store::{QuestDb, QuestQuery};

/// Shared state for the quest API
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<CompletionOrchestrator>,
    pub query: QuestQuery,
    pub db: QuestDb,
    /// Required `X-Quest-Token` value; None or empty disables auth
    pub auth_token: Option<String>,
}

impl ApiState {
    pub fn new(
        db: QuestDb,
        orchestrator: Arc<CompletionOrchestrator>,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            query: QuestQuery::new(db.clone()),
            db,
            orchestrator,
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Status code and JSON body produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, error: &str) -> Self {
        Self {
            status,
            body: json!({ "error": error }),
        }
    }

    pub fn error_with_details(status: u16, error: &str, details: impl std::fmt::Display) -> Self {
        Self {
            status,
            body: json!({ "error": error, "details": details.to_string() }),
        }
    }

    pub fn not_found() -> Self {
        Self::error(404, "not_found")
    }

    /// Serialize `value` as the 200 body
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::ok(body),
            Err(e) => Self::error_with_details(500, "serialize", e),
        }
    }

    pub fn internal(err: &anyhow::Error) -> Self {
        tracing::error!("[quest:http] Request failed: {:#}", err);
        Self::error_with_details(500, "internal", format!("{:#}", err))
    }
}

/// Per-user resources under `/api/users/{id}/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserResource {
    Stats,
    Achievements,
    History,
    Settings,
}

/// Split `/api/users/{id}/{resource}` into its parts
pub fn parse_user_path(path: &str) -> Result<(String, UserResource), &'static str> {
    let rest = path
        .trim_end_matches('/')
        .strip_prefix("/api/users/")
        .ok_or("bad_path")?;
    let (raw_id, resource) = rest.rsplit_once('/').ok_or("bad_path")?;
    if raw_id.contains('/') {
        return Err("bad_user_id");
    }

    let user_id = decode_path_segment(raw_id)?;
    let user_id = user_id.trim();
    if user_id.is_empty() || user_id.contains('/') {
        return Err("bad_user_id");
    }

    let resource = match resource {
        "stats" => UserResource::Stats,
        "achievements" => UserResource::Achievements,
        "history" => UserResource::History,
        "settings" => UserResource::Settings,
        _ => return Err("not_found"),
    };
    Ok((user_id.to_string(), resource))
}

/// Percent-decode one path segment. Malformed escapes and non-UTF-8 bytes are rejected.
fn decode_path_segment(segment: &str) -> Result<String, &'static str> {
    let bytes = segment.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err("bad_user_id_encoding");
    }

    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| "bad_user_id_encoding")
}

/// Read `limit` from a query string, falling back to `default`
pub fn parse_limit(query: Option<&str>, default: usize) -> Result<usize, &'static str> {
    let Some(query) = query else {
        return Ok(default);
    };

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("limit=") {
            return match value.parse::<usize>() {
                Ok(0) | Err(_) => Err("invalid_limit"),
                Ok(n) => Ok(n),
            };
        }
    }
    Ok(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_path() {
        assert_eq!(
            parse_user_path("/api/users/alice/stats"),
            Ok(("alice".to_string(), UserResource::Stats))
        );
        assert_eq!(
            parse_user_path("/api/users/bob@example.com/history/"),
            Ok(("bob@example.com".to_string(), UserResource::History))
        );
        assert_eq!(parse_user_path("/api/users//stats"), Err("bad_user_id"));
        assert_eq!(parse_user_path("/api/users/a/b/stats"), Err("bad_user_id"));
        assert_eq!(parse_user_path("/api/users/alice/secrets"), Err("not_found"));
        assert_eq!(parse_user_path("/api/users/alice"), Err("bad_path"));
    }

    #[test]
    fn test_parse_user_path_decodes_id() {
        assert_eq!(
            parse_user_path("/api/users/john%20doe/stats"),
            Ok(("john doe".to_string(), UserResource::Stats))
        );
        assert_eq!(
            parse_user_path("/api/users/j%C3%BCrgen/settings"),
            Ok(("jürgen".to_string(), UserResource::Settings))
        );
        assert_eq!(parse_user_path("/api/users/a%2Fb/stats"), Err("bad_user_id"));
        assert_eq!(parse_user_path("/api/users/bad%zz/stats"), Err("bad_user_id_encoding"));
        assert_eq!(parse_user_path("/api/users/cut%2/stats"), Err("bad_user_id_encoding"));
        assert_eq!(parse_user_path("/api/users/%FF%FE/stats"), Err("bad_user_id_encoding"));
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 50), Ok(50));
        assert_eq!(parse_limit(Some("limit=5"), 50), Ok(5));
        assert_eq!(parse_limit(Some("foo=1&limit=7"), 50), Ok(7));
        assert_eq!(parse_limit(Some("foo=1"), 50), Ok(50));
        assert_eq!(parse_limit(Some("limit=0"), 50), Err("invalid_limit"));
        assert_eq!(parse_limit(Some("limit=-3"), 50), Err("invalid_limit"));
    }
}
