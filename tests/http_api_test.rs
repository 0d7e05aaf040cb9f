//! HTTP API served by tiny_http, exercised over real sockets

mod common;

use common::TestEnv;
use quest::http_server::{self, ApiState};
use serde_json::{Value, json};

const TOKEN: &str = "test-token";

struct TestServer {
    env: TestEnv,
    base: String,
}

fn start() -> TestServer {
    let env = TestEnv::new();
    let server = http_server::bind("127.0.0.1", 0).unwrap();
    let port = http_server::local_port(&server).unwrap();
    let state = ApiState::new(
        env.db.clone(),
        env.orchestrator.clone(),
        Some(TOKEN.to_string()),
    );
    http_server::start_http_server(server, state);

    TestServer {
        env,
        base: format!("http://127.0.0.1:{port}"),
    }
}

fn parts(result: Result<ureq::Response, ureq::Error>) -> (u16, Value) {
    match result {
        Ok(response) => (response.status(), response.into_json().unwrap()),
        Err(ureq::Error::Status(code, response)) => (code, response.into_json().unwrap()),
        Err(e) => panic!("transport error: {e}"),
    }
}

impl TestServer {
    fn get(&self, path: &str) -> (u16, Value) {
        parts(
            ureq::get(&format!("{}{}", self.base, path))
                .set("X-Quest-Token", TOKEN)
                .call(),
        )
    }

    fn send(&self, method: &str, path: &str, body: &str) -> (u16, Value) {
        parts(
            ureq::request(method, &format!("{}{}", self.base, path))
                .set("X-Quest-Token", TOKEN)
                .set("Content-Type", "application/json")
                .send_string(body),
        )
    }

    fn complete(&self, payload: Value) -> (u16, Value) {
        self.send("POST", "/api/events/task-completed", &payload.to_string())
    }
}

#[test]
fn test_requests_without_token_are_rejected() {
    let server = start();

    let (status, body) = parts(ureq::get(&format!("{}/api/ping", server.base)).call());
    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = parts(
        ureq::get(&format!("{}/api/ping", server.base))
            .set("X-Quest-Token", "wrong")
            .call(),
    );
    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = server.get("/api/ping");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[test]
fn test_task_completed_then_read_projections() {
    let server = start();

    let (status, body) = server.complete(json!({
        "source": "quest",
        "task_id": "t-1",
        "user_id": "alice",
        "task_title": "Write report",
        "priority": "medium",
        "occurred_at": "2024-03-04T09:00:00Z",
    }));
    assert_eq!(status, 200);
    assert_eq!(body["xp_awarded"], 16);
    assert_eq!(body["current_streak"], 1);
    assert_eq!(body["duplicate"], false);
    assert_eq!(body["new_achievements"][0]["key"], "first_task");

    let (status, stats) = server.get("/api/users/alice/stats");
    assert_eq!(status, 200);
    assert_eq!(stats["lifetime_xp"], 16);
    assert_eq!(stats["level"], 1);
    assert_eq!(stats["tasks_completed"], 1);
    assert_eq!(stats["achievements_unlocked"], 1);

    let (status, achievements) = server.get("/api/users/alice/achievements");
    assert_eq!(status, 200);
    assert_eq!(achievements["unlocked"], 1);
    assert!(achievements["total"].as_u64().unwrap() > 1);

    let (status, history) = server.get("/api/users/alice/history?limit=5");
    assert_eq!(status, 200);
    assert_eq!(history["history"].as_array().unwrap().len(), 1);
    assert_eq!(history["history"][0]["task_title"], "Write report");
}

#[test]
fn test_duplicate_event_over_http() {
    let server = start();
    let payload = json!({
        "source": "quest",
        "task_id": "t-1",
        "user_id": "alice",
        "priority": "high",
        "occurred_at": "2024-03-04T09:00:00Z",
    });

    let (_, first) = server.complete(payload.clone());
    let (status, second) = server.complete(payload);

    assert_eq!(status, 200);
    assert_eq!(second["duplicate"], true);
    assert_eq!(second["xp_awarded"], 0);
    assert_eq!(second["lifetime_xp"], first["lifetime_xp"]);
}

#[test]
fn test_invalid_payloads() {
    let server = start();

    let (status, body) = server.send("POST", "/api/events/task-completed", "{not json");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_json");

    let (status, body) = server.complete(json!({
        "source": "quest",
        "task_id": "t-1",
        "user_id": "alice",
        "priority": "urgent",
    }));
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_event");

    let (status, body) = server.get("/api/leaderboard?limit=0");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_limit");

    let (status, _) = server.get("/api/users/alice/unknown");
    assert_eq!(status, 404);

    let (status, _) = server.send("DELETE", "/api/users/alice/stats", "");
    assert_eq!(status, 405);
}

#[test]
fn test_persistence_failure_is_503() {
    let server = start();
    server
        .env
        .db
        .conn()
        .execute_batch(
            "CREATE TRIGGER fail_history BEFORE INSERT ON completion_history
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();

    let (status, body) = server.complete(json!({
        "source": "quest",
        "task_id": "t-1",
        "user_id": "alice",
        "priority": "low",
    }));
    assert_eq!(status, 503);
    assert_eq!(body["error"], "persistence_failed");
    assert_eq!(body["retry"], true);
}

#[test]
fn test_leaderboard_honors_settings() {
    let server = start();

    for (user, task, priority) in [
        ("alice", "a1", "high"),
        ("alice", "a2", "high"),
        ("bob", "b1", "low"),
    ] {
        let (status, _) = server.complete(json!({
            "source": "quest",
            "task_id": task,
            "user_id": user,
            "priority": priority,
            "occurred_at": "2024-03-04T09:00:00Z",
        }));
        assert_eq!(status, 200);
    }

    let (_, board) = server.get("/api/leaderboard");
    let entries = board["leaderboard"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["user_id"], "alice");
    assert_eq!(entries[0]["position"], 1);
    assert_eq!(entries[1]["user_id"], "bob");

    let (status, saved) = server.send(
        "PUT",
        "/api/users/alice/settings",
        r#"{"show_on_leaderboard": false, "notify_daily_summary": false}"#,
    );
    assert_eq!(status, 200);
    assert_eq!(saved["settings"]["show_on_leaderboard"], false);
    assert_eq!(saved["settings"]["notify_level_up"], true);

    let (_, fetched) = server.get("/api/users/alice/settings");
    assert_eq!(fetched["settings"]["notify_daily_summary"], false);

    let (_, board) = server.get("/api/leaderboard");
    let entries = board["leaderboard"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_id"], "bob");
    assert_eq!(entries[0]["position"], 1);
}

#[test]
fn test_encoded_user_id_is_decoded() {
    let server = start();

    let (status, _) = server.complete(json!({
        "source": "quest",
        "task_id": "t-1",
        "user_id": "john doe",
        "priority": "medium",
        "occurred_at": "2024-03-04T09:00:00Z",
    }));
    assert_eq!(status, 200);

    let (status, stats) = server.get("/api/users/john%20doe/stats");
    assert_eq!(status, 200);
    assert_eq!(stats["user_id"], "john doe");
    assert_eq!(stats["tasks_completed"], 1);

    let (status, saved) = server.send(
        "PUT",
        "/api/users/john%20doe/settings",
        r#"{"show_on_leaderboard": false}"#,
    );
    assert_eq!(status, 200);
    assert_eq!(saved["user_id"], "john doe");

    let (_, board) = server.get("/api/leaderboard");
    assert!(board["leaderboard"].as_array().unwrap().is_empty());

    let (status, body) = server.get("/api/users/john%zzdoe/stats");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "bad_user_id_encoding");
}
