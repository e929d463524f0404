//! HTTP echo endpoint
//!
//! Serves `POST /api/chat` and `GET /api/health` on a background task.
//! The reply to a chat request is the request's own message.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::protocol::{ChatReply, ChatRequest, ErrorBody, HealthStatus, CHAT_PATH, HEALTH_PATH};

/// Running echo endpoint
pub struct Server {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Server {
    /// Bind `bind_addr` and start serving in a background task
    ///
    /// Port `0` picks a free port; use [`Server::base_url`] to reach it.
    pub async fn start(bind_addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind echo endpoint on {bind_addr}"))?;

        let addr = listener
            .local_addr()
            .context("failed to read echo endpoint address")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        info!(%addr, "echo endpoint listening");

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router())
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;

            if let Err(e) = result {
                error!(?e, "echo endpoint error");
            }
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    /// Base URL for clients of this server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Err(e) = (&mut self.handle).await {
            warn!(?e, "echo endpoint task did not exit cleanly");
        }

        info!("echo endpoint shutdown complete");
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router() -> Router {
    Router::new()
        .route(CHAT_PATH, post(handle_chat))
        .route(HEALTH_PATH, get(handle_health))
}

async fn handle_chat(Json(request): Json<ChatRequest>) -> Response {
    if request.message.trim().is_empty() {
        warn!("rejecting empty chat message");
        let body = ErrorBody {
            error: "message must not be empty".to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    debug!(len = request.message.len(), "echoing message");

    let reply = ChatReply {
        reply: Some(request.message),
    };
    (StatusCode::OK, Json(reply)).into_response()
}

async fn handle_health() -> Json<HealthStatus> {
    Json(HealthStatus::default())
}
