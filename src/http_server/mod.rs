//! HTTP API for task hosts and dashboards
//!
//! Listens on 127.0.0.1:9877 by default and accepts:
//! - POST /api/events/task-completed - inbound completion webhook
//! - GET  /api/users/{id}/stats | achievements | history - read projections
//! - GET/PUT /api/users/{id}/settings - per-user preferences
//! - GET  /api/leaderboard, GET /api/ping

mod handlers;
mod types;

pub use handlers::route;
pub use types::{ApiResponse, ApiState};

use std::io::Read;
use std::thread;

use anyhow::Result;
use tiny_http::{Response, Server};
use tracing::{debug, error, info};

const AUTH_HEADER: &str = "X-Quest-Token";
const MAX_BODY_BYTES: usize = 1024 * 1024; // 1 MiB

/// Bind the listener. Port 0 picks a free port (see [`local_port`]).
pub fn bind(address: &str, port: u16) -> Result<Server> {
    let bind_addr = format!("{}:{}", address, port);
    Server::http(&bind_addr)
        .map_err(|e| anyhow::anyhow!("Failed to start server on {}: {}", bind_addr, e))
}

pub fn local_port(server: &Server) -> Option<u16> {
    server.server_addr().to_ip().map(|addr| addr.port())
}

/// Serve requests on a background thread until the process exits
pub fn start_http_server(server: Server, state: ApiState) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let addr = server
            .server_addr()
            .to_ip()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            "[quest:http] Server listening on http://{} (auth: {})",
            addr,
            if state.auth_token.is_some() { "enabled" } else { "disabled" }
        );

        for mut request in server.incoming_requests() {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let (path, query) = match url.split_once('?') {
                Some((path, query)) => (path, Some(query)),
                None => (url.as_str(), None),
            };
            debug!("[quest:http] {} {}", method, path);

            if !is_authorized(&request, state.auth_token.as_deref()) {
                let response = Response::from_string("{\"error\":\"unauthorized\"}")
                    .with_status_code(401)
                    .with_header(json_content_type());
                let _ = request.respond(response);
                continue;
            }

            let body = if matches!(method.as_str(), "POST" | "PUT") {
                match read_request_body(&mut request) {
                    Ok(body) => body,
                    Err(response) => {
                        let _ = request.respond(response);
                        continue;
                    }
                }
            } else {
                String::new()
            };

            let response = route(&state, &method, path, query, &body);
            respond_json(request, response);
        }
    })
}

fn is_authorized(request: &tiny_http::Request, expected: Option<&str>) -> bool {
    let Some(expected) = expected.filter(|t| !t.trim().is_empty()) else {
        return true;
    };

    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(AUTH_HEADER))
        .map(|h| h.value.as_str() == expected)
        .unwrap_or(false)
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid ASCII")
}

fn read_request_body(
    request: &mut tiny_http::Request,
) -> Result<String, Response<std::io::Cursor<Vec<u8>>>> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((MAX_BODY_BYTES + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[quest:http] Failed to read body: {}", e);
        let response = Response::from_string("{\"error\":\"bad_request\"}")
            .with_status_code(400)
            .with_header(json_content_type());
        return Err(response);
    }

    if body.len() > MAX_BODY_BYTES {
        let response = Response::from_string("{\"error\":\"payload_too_large\"}")
            .with_status_code(413)
            .with_header(json_content_type());
        return Err(response);
    }

    Ok(body)
}

fn respond_json(request: tiny_http::Request, response: ApiResponse) {
    let body = serde_json::to_string(&response.body)
        .unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let response = Response::from_string(body)
        .with_status_code(response.status)
        .with_header(json_content_type());
    let _ = request.respond(response);
}
