//! Travis CI build notifications.
//!
//! Travis posts `application/x-www-form-urlencoded` bodies whose `payload`
//! field holds the build as JSON. Notifications are only logged.

use serde::Deserialize;
use thiserror::Error;

/// A Travis `payload` field that could not be decoded.
#[derive(Debug, Error)]
pub enum CiPayloadError {
    /// The field is not JSON or lacks a required build field.
    #[error("Invalid Travis build payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Form body of a Travis CI webhook.
#[derive(Debug, Deserialize)]
pub struct CiNotificationForm {
    /// JSON-encoded build notification.
    #[serde(default)]
    pub payload: Option<String>,
}

/// The parts of a Travis build notification that are logged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TravisBuild {
    /// Build id.
    pub id: u64,
    /// Build number, as shown in the Travis UI.
    pub number: String,
    /// Build state (e.g. `passed`, `failed`).
    #[serde(default)]
    pub state: Option<String>,
    /// Branch the build ran on.
    #[serde(default)]
    pub branch: Option<String>,
    /// Pull request number, for pull request builds.
    #[serde(default)]
    pub pull_request_number: Option<u64>,
    /// Pull request title, for pull request builds.
    #[serde(default)]
    pub pull_request_title: Option<String>,
}

impl TravisBuild {
    /// Decodes the `payload` form field.
    ///
    /// # Errors
    ///
    /// [`CiPayloadError::Decode`] when the payload is not a build object.
    pub fn from_payload(payload: &str) -> Result<Self, CiPayloadError> {
        Ok(serde_json::from_str(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{CiPayloadError, TravisBuild};

    #[test]
    fn decodes_pull_request_build() {
        let build = TravisBuild::from_payload(
            r#"{"id": 1234, "number": "56", "state": "failed", "branch": "master",
                "pull_request": true, "pull_request_number": 78,
                "pull_request_title": "Fix volume cleanup", "commit": "abc"}"#,
        )
        .expect("valid payload");

        assert_eq!(build.id, 1234);
        assert_eq!(build.number, "56");
        assert_eq!(build.pull_request_number, Some(78));
        assert_eq!(build.pull_request_title.as_deref(), Some("Fix volume cleanup"));
    }

    #[test]
    fn rejects_non_build_payload() {
        for payload in [r#"{"number": "1"}"#, ""] {
            assert!(matches!(
                TravisBuild::from_payload(payload),
                Err(CiPayloadError::Decode(_))
            ));
        }
    }
}
