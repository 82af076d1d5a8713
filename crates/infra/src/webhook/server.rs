//! HTTP front for the webhook handler.
//!
//! A single `POST` route. The shared secret is checked before the body is
//! looked at; the handler's outcome maps onto status codes as follows:
//!
//! | outcome                                   | status |
//! |-------------------------------------------|--------|
//! | webhooks disabled                         | 403    |
//! | bad or missing secret                     | 401    |
//! | empty, malformed or unknown event         | 400    |
//! | handled (including unknown order/status)  | 200    |
//! | storage failure                           | 500    |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use evosync_core::{WebhookAuth, WebhookHandler, WebhookRejection};
use evosync_domain::constants::{WEBHOOK_PATH, WEBHOOK_SECRET_HEADER};
use evosync_domain::{EvosyncError, Result, WebhookResponse};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Shared state for the webhook route.
pub struct WebhookState {
    pub auth: WebhookAuth,
    pub handler: Arc<WebhookHandler>,
}

/// Build the axum router (separated for testing).
pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new().route(WEBHOOK_PATH, post(receive)).with_state(state)
}

async fn receive(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    let provided = headers.get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if let Err(rejection) = state.auth.authorize(provided) {
        let status = match rejection {
            WebhookRejection::Disabled => StatusCode::FORBIDDEN,
            WebhookRejection::SecretNotConfigured | WebhookRejection::InvalidSecret => {
                StatusCode::UNAUTHORIZED
            }
        };
        return (status, Json(WebhookResponse::failed(rejection.message())));
    }

    let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "webhook body is not valid JSON");
                return (StatusCode::BAD_REQUEST, Json(WebhookResponse::failed("Invalid JSON payload")));
            }
        }
    };

    match state.handler.handle(&payload).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(EvosyncError::InvalidInput(message)) => {
            (StatusCode::BAD_REQUEST, Json(WebhookResponse::failed(message)))
        }
        Err(err) => {
            error!(error = %err, "webhook processing failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(WebhookResponse::failed(err.user_message())))
        }
    }
}

/// Running webhook listener.
pub struct WebhookServer {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl WebhookServer {
    /// Bind `bind` and serve until [`WebhookServer::shutdown`] or `cancel`
    /// fires.
    ///
    /// # Errors
    /// `EvosyncError::Network` when the address cannot be bound.
    pub async fn start(bind: &str, state: Arc<WebhookState>, cancel: CancellationToken) -> Result<Self> {
        let listener = TcpListener::bind(bind).await.map_err(|err| {
            EvosyncError::Network(format!("failed to bind webhook listener on {bind}: {err}"))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|err| EvosyncError::Network(format!("failed to determine webhook address: {err}")))?;

        let app = router(state);
        let shutdown = cancel.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
            {
                error!("webhook server error: {}", err);
            }
        });

        info!(addr = %local_addr, path = WEBHOOK_PATH, "webhook endpoint listening");
        Ok(Self { local_addr, cancel, handle: Some(handle) })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Resolves once the server task exits.
    ///
    /// # Errors
    /// `EvosyncError::Internal` if the server task panicked.
    pub async fn wait(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|err| EvosyncError::Internal(format!("webhook server panicked: {err}"))),
            None => Ok(()),
        }
    }

    /// Stop accepting requests and wait for in-flight ones to finish.
    ///
    /// # Errors
    /// `EvosyncError::Internal` if the server task panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.wait().await
    }
}

impl Drop for WebhookServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.cancel();
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}
