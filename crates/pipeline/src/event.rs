//! Classification of raw `issues` webhook payloads.
//!
//! The event kind (`issues`) is established by the caller from the
//! `X-GitHub-Event` header; this module only turns the payload bytes into an
//! [`ActionType`] and an [`Issue`].

use std::str::FromStr;

use serde::Deserialize;

use crate::{Issue, PipelineError};

/// The sub-kind of an `issues` event that has a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// A new issue was created.
    Opened,
    /// The title or body of an issue changed.
    Edited,
    /// A label was attached to an issue.
    Labeled,
    /// A closed issue was reopened.
    Reopened,
}

impl ActionType {
    /// The wire name used by GitHub for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Labeled => "labeled",
            Self::Reopened => "reopened",
        }
    }
}

impl FromStr for ActionType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opened" => Ok(Self::Opened),
            "edited" => Ok(Self::Edited),
            "labeled" => Ok(Self::Labeled),
            "reopened" => Ok(Self::Reopened),
            other => Err(PipelineError::UnknownActionType(other.to_owned())),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified `issues` webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEvent {
    /// What happened to the issue.
    pub action: ActionType,
    /// Snapshot of the issue after the change.
    pub issue: Issue,
}

#[derive(Deserialize)]
struct RawEvent {
    action: Option<String>,
    issue: Option<serde_json::Value>,
}

impl IssueEvent {
    /// Classifies raw payload bytes.
    ///
    /// The action is classified before the issue is decoded, so an unhandled
    /// action always yields [`PipelineError::UnknownActionType`].
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Parse`] if the payload is not a JSON object, lacks
    ///   `action` or `issue`, or the issue lacks `number`. A missing `user` is
    ///   accepted here; see [`crate::Issue::reporter`].
    /// - [`PipelineError::UnknownActionType`] for any unhandled action string.
    pub fn from_slice(payload: &[u8]) -> Result<Self, PipelineError> {
        let raw: RawEvent =
            serde_json::from_slice(payload).map_err(|e| PipelineError::Parse(e.to_string()))?;

        let action = raw
            .action
            .ok_or_else(|| PipelineError::Parse("missing field `action`".to_owned()))?
            .parse::<ActionType>()?;

        let issue = raw
            .issue
            .ok_or_else(|| PipelineError::Parse("missing field `issue`".to_owned()))?;
        let issue: Issue = serde_json::from_value(issue)
            .map_err(|e| PipelineError::Parse(format!("invalid `issue`: {e}")))?;

        Ok(Self { action, issue })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
