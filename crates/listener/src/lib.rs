//! Issuewarden event source infrastructure.
//!
//! Binds an HTTP server that receives GitHub webhook deliveries and Travis CI
//! notifications, establishes the event kind from the `X-GitHub-Event` header
//! and hands `issues` payloads to [`pipeline::IssueProcessor`].
//!
//! ## Routes
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /_ping` | liveness probe, answers `OK` |
//! | `POST /events` | GitHub webhook deliveries |
//! | `POST /ci_notifications` | Travis CI build notifications (logged only) |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details, signature verification and HTTP
//! status mapping live here. The [`pipeline`] crate sees only raw payload
//! bytes.

pub mod ci;
pub mod signature;

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use pipeline::{DeliveryId, IssueProcessor, Outcome, PipelineError};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::ci::{CiNotificationForm, TravisBuild};
use crate::signature::verify_signature;

/// Header naming the kind of a GitHub webhook event.
pub const EVENT_HEADER: &str = "X-GitHub-Event";
/// Header carrying the delivery GUID.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";
/// Header carrying the HMAC-SHA256 body signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Default request body limit (GitHub caps payloads at 25 MB; issues are far smaller).
pub const DEFAULT_BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Failure to run the HTTP server.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen address could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested.
        address: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Kind of a GitHub webhook event, from the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `issues` events; the only kind with a processor.
    Issues,
    /// The `ping` GitHub sends when a webhook is created.
    Ping,
    /// Any other kind; accepted and ignored.
    Other(String),
}

impl EventKind {
    /// Classifies a header value.
    pub fn from_header(value: &str) -> Self {
        match value {
            "issues" => Self::Issues,
            "ping" => Self::Ping,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Shared state of the webhook handlers.
#[derive(Clone)]
pub struct ListenerState {
    processor: IssueProcessor,
    webhook_secret: Option<String>,
}

impl ListenerState {
    /// Creates the state; with a secret every delivery must be signed.
    pub fn new(processor: IssueProcessor, webhook_secret: Option<String>) -> Self {
        Self {
            processor,
            webhook_secret: webhook_secret.filter(|s| !s.is_empty()),
        }
    }
}

/// Body returned for an accepted delivery.
#[derive(Debug, Serialize)]
struct EventResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    labels_added: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl EventResponse {
    fn ignored() -> Self {
        Self {
            status: "ignored",
            action: None,
            labels_added: Vec::new(),
            comment: None,
        }
    }

    fn processed(outcome: &Outcome) -> Self {
        Self {
            status: "processed",
            action: Some(outcome.action.as_str()),
            labels_added: outcome
                .labels_added
                .iter()
                .map(|l| l.as_str().to_owned())
                .collect(),
            comment: outcome.comment.map(|t| t.as_str().to_owned()),
        }
    }
}

/// Builds the HTTP router.
pub fn build_router(state: Arc<ListenerState>, body_limit: usize) -> Router {
    Router::new()
        .route("/_ping", get(ping_handler))
        .route("/events", post(events_handler))
        .route("/ci_notifications", post(ci_notification_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `address` and serves `router` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ListenerError`] if the address cannot be bound or the server fails.
pub async fn run_server<F>(router: Router, address: &str, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.to_owned(),
            source,
        })?;
    info!("Issuewarden listening on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)
}

// ============================================================================
// Handlers
// ============================================================================

async fn ping_handler() -> &'static str {
    debug!("/_ping request received");
    "OK"
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Maps a pipeline failure to the HTTP status reported to GitHub.
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Parse(_) | PipelineError::UnknownActionType(_) => StatusCode::BAD_REQUEST,
        PipelineError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn events_handler(
    State(state): State<Arc<ListenerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery = header_str(&headers, DELIVERY_HEADER)
        .and_then(DeliveryId::new)
        .unwrap_or_else(DeliveryId::new_random);
    let Some(event_type) = header_str(&headers, EVENT_HEADER).map(str::to_owned) else {
        warn!(%delivery, "webhook delivery without {EVENT_HEADER} header");
        return (StatusCode::BAD_REQUEST, "missing X-GitHub-Event header").into_response();
    };

    let span = info_span!("webhook", %delivery, event = %event_type);
    async move {
        debug!("/events request received");

        if let Some(secret) = &state.webhook_secret {
            let signed = header_str(&headers, SIGNATURE_HEADER)
                .is_some_and(|sig| verify_signature(&body, sig, secret));
            if !signed {
                warn!("rejecting delivery with missing or invalid signature");
                return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
            }
        }

        match EventKind::from_header(&event_type) {
            EventKind::Issues => match state.processor.process(&body).await {
                Ok(outcome) => Json(EventResponse::processed(&outcome)).into_response(),
                Err(e) => {
                    error!(error = %e, "failed to process issue event");
                    (status_for(&e), e.to_string()).into_response()
                }
            },
            EventKind::Ping => {
                info!("received webhook ping");
                Json(EventResponse::ignored()).into_response()
            }
            EventKind::Other(kind) => {
                debug!(%kind, "ignoring event kind without processor");
                Json(EventResponse::ignored()).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn ci_notification_handler(Form(form): Form<CiNotificationForm>) -> Response {
    info!("/ci_notifications event received");

    let Some(payload) = form.payload.filter(|p| !p.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing payload field").into_response();
    };

    match TravisBuild::from_payload(&payload) {
        Ok(build) => {
            info!(
                id = build.id,
                number = %build.number,
                state = ?build.state,
                branch = ?build.branch,
                pull_request_number = ?build.pull_request_number,
                pull_request_title = ?build.pull_request_title,
                "CI notification"
            );
            StatusCode::OK.into_response()
        }
        Err(e) => {
            warn!(error = %e, "malformed CI notification payload");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
