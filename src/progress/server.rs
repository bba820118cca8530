//! HTTP server behind the progress page.
//!
//! Runs inside the side process started by [`ProcessLauncher`]. Once the
//! listener is bound it prints [`READY_MESSAGE`] on stdout so the parent
//! knows the page is up.
//!
//! [`ProcessLauncher`]: super::ProcessLauncher

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{info, warn};

use super::page::{FAVICON_URL, STATUS_PAGE};

/// Line written to stdout once the listener is bound.
pub const READY_MESSAGE: &str = "ready";

#[derive(Debug)]
struct PageState {
    log_file: PathBuf,
}

/// Routes of the progress page.
///
/// `/` and `/index.html` serve the status page, `/logs` the raw installer
/// log, `/favicon.ico` redirects to the JupyterHub icon. Anything else is
/// forbidden.
pub fn router(log_file: PathBuf) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/logs", get(logs))
        .route("/favicon.ico", get(favicon))
        .fallback(forbidden)
        .with_state(Arc::new(PageState { log_file }))
}

async fn index() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

async fn logs(State(state): State<Arc<PageState>>) -> Response {
    match tokio::fs::read(&state.log_file).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            String::from_utf8_lossy(&bytes).into_owned(),
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "The installer log is not available yet").into_response()
        }
        Err(err) => {
            warn!("Failed to read {}: {}", state.log_file.display(), err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read the installer log")
                .into_response()
        }
    }
}

async fn favicon() -> Redirect {
    Redirect::temporary(FAVICON_URL)
}

async fn forbidden() -> StatusCode {
    StatusCode::FORBIDDEN
}

/// Serve the progress page until interrupted.
pub fn serve(log_file: PathBuf, port: u16) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the progress page runtime")?;
    runtime.block_on(run(log_file, port))
}

async fn run(log_file: PathBuf, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind progress page on port {port}"))?;
    info!("Progress page listening on {}", listener.local_addr()?);

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{READY_MESSAGE}")?;
    stdout.flush()?;

    axum::serve(listener, router(log_file))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Progress page server failed")?;

    info!("Progress page stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for interrupt: {}", err);
        std::future::pending::<()>().await;
    }
}
