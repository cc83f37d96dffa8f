//! HTTP adapter — exposes the session operation as a JSON endpoint.
//!
//! `POST /api/chat` takes `{message, session_id}` and returns `{reply}`.
//! Repeated calls with the same `session_id` resume the same conversation;
//! distinct ids are fully independent.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::chat::SessionManager;
use crate::error::Error;
use crate::llm::CompletionClient;
use crate::Result;

use super::Channel;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// HTTP channel serving the chat endpoint.
pub struct HttpChannel<C: CompletionClient + Clone + 'static> {
    port: u16,
    sessions: Arc<SessionManager<C>>,
}

impl<C: CompletionClient + Clone + 'static> HttpChannel<C> {
    pub fn new(port: u16, sessions: Arc<SessionManager<C>>) -> Self {
        Self { port, sessions }
    }
}

impl<C: CompletionClient + Clone + 'static> Channel for HttpChannel<C> {
    fn name(&self) -> &str {
        "http"
    }

    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        let app = router(self.sessions.clone());
        let addr = format!("0.0.0.0:{}", self.port);

        async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("HTTP channel listening on {}", addr);
            axum::serve(listener, app)
                .await
                .map_err(|e| Error::Other(format!("http server failed: {e}")))?;
            Ok(())
        }
    }

    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

/// Build the router. Split out so tests can drive it without a socket.
pub fn router<C: CompletionClient + Clone + 'static>(sessions: Arc<SessionManager<C>>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::<C>))
        .route("/api/health", get(health))
        .with_state(sessions)
}

async fn chat<C: CompletionClient + Clone + 'static>(
    State(sessions): State<Arc<SessionManager<C>>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match sessions.respond(&request.session_id, &request.message).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse { reply })).into_response(),
        Err(e) => {
            warn!("chat request failed: {}", e);
            error_response(e)
        }
    }
}

async fn health() -> Response {
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

fn error_response(error: Error) -> Response {
    let (status, kind) = match &error {
        Error::Input(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        Error::Service(_) | Error::Http(_) => (StatusCode::BAD_GATEWAY, "service_unavailable"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };

    let body = json!({
        "error": kind,
        "message": error.to_string(),
    });
    (status, Json(body)).into_response()
}
