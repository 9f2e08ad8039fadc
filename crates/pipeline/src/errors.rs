//! Error and retry-policy types for the Issuewarden pipeline.
//!
//! [`PipelineError`] covers every condition that stops the processing of a
//! single webhook event. Failures of the upstream client are carried as
//! [`UpstreamError`] so the caller can see which remote call failed and why.
//!
//! There are no retries inside the pipeline. [`RetryPolicy`] is only a hint
//! for callers (and for the logs) about whether redelivering the event could
//! succeed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable` errors: transport failures, GitHub 5xx responses, rate-limit
///   (429) responses.
/// - `NonRetryable` errors: malformed payloads, unknown actions, authentication
///   and validation failures reported by GitHub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means the caller's
        /// own back-off schedule applies.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Upstream errors
// ---------------------------------------------------------------------------

/// Failure of a call made through [`crate::IssueClient`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("Upstream transport failure: {0}")]
    Transport(String),

    /// GitHub answered with a non-success status.
    #[error("GitHub API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `message` field of GitHub's error body, or the raw body.
        message: String,
        /// Parsed `Retry-After` header, if present.
        retry_after: Option<Duration>,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Classifies this failure for redelivery decisions.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport(_) => RetryPolicy::Retryable { after: None },
            Self::Api {
                status,
                retry_after,
                ..
            } if *status == 429 || *status >= 500 => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Api { .. } | Self::Decode(_) => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that stop the processing of one webhook event.
///
/// Earlier successful upstream calls made for the same event are not rolled
/// back.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The payload could not be classified into an action type and an issue.
    #[error("Failed to parse event payload: {0}")]
    Parse(String),

    /// The payload carried an action type that has no handler.
    #[error("Unknown action type '{0}' in issue event")]
    UnknownActionType(String),

    /// A label or comment call against GitHub failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl PipelineError {
    /// Classifies this failure for redelivery decisions.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Parse(_) | Self::UnknownActionType(_) => RetryPolicy::NonRetryable,
            Self::Upstream(e) => e.retry_policy(),
        }
    }
}
