//! Serve command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use quest::http_server::{self, ApiState};
use quest::jobs::JobRunner;

use super::App;

/// Run the HTTP API and the background job loop until Ctrl-C
pub async fn serve_command(app: App, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| app.config.server.bind.clone());
    let port = port.unwrap_or(app.config.server.port);

    let server = http_server::bind(&bind, port)?;
    let state = ApiState::new(
        app.db.clone(),
        Arc::new(app.orchestrator()),
        Some(app.config.server.auth_token.clone()),
    );
    // tiny_http blocks, so it gets its own thread
    http_server::start_http_server(server, state);

    let runner = Arc::new(JobRunner::new(
        app.db.clone(),
        app.rules.clone(),
        app.config.jobs.clone(),
        app.notifier.clone(),
    ));
    let jobs = runner.spawn();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down");
    jobs.abort();
    Ok(())
}
