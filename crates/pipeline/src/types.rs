//! Shared value types for the Issuewarden domain.
//!
//! [`Issue`] is an immutable snapshot of the GitHub issue carried by a single
//! webhook delivery. Only the fields the pipeline consults are modelled; every
//! other field of GitHub's payload is ignored during decoding.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{IssueNumber, LabelName, PipelineError, UserLogin};

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// A label as reported by GitHub: its name plus display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The label name; the only part that takes part in comparisons.
    pub name: LabelName,

    /// Hex colour without the leading `#`.
    #[serde(default)]
    pub color: Option<String>,

    /// Free-form description shown in the GitHub UI.
    #[serde(default)]
    pub description: Option<String>,
}

impl Label {
    /// Creates a label carrying only a name.
    pub fn named(name: LabelName) -> Self {
        Self {
            name,
            color: None,
            description: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// The user that reported an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUser {
    /// GitHub login handle.
    pub login: UserLogin,
}

/// Snapshot of a GitHub issue taken from a webhook payload.
///
/// `title` and `body` are optional: GitHub sends `null` for an empty body, and
/// a missing value is a valid input that the content checks treat as too short.
/// `user` is only needed when a comment addresses the reporter, so its absence
/// is reported by [`Issue::reporter`] rather than at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number within the repository.
    pub number: IssueNumber,

    /// Issue title.
    #[serde(default)]
    pub title: Option<String>,

    /// Issue description.
    #[serde(default)]
    pub body: Option<String>,

    /// Reporter of the issue.
    #[serde(default)]
    pub user: Option<IssueUser>,

    /// Labels attached at the time the event was emitted.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<Label>,
}

impl Issue {
    /// Title as a string slice, empty when absent.
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Body as a string slice, empty when absent.
    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Login of the reporter.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Parse`] when the payload carried no `user`.
    pub fn reporter(&self) -> Result<&UserLogin, PipelineError> {
        self.user
            .as_ref()
            .map(|u| &u.login)
            .ok_or_else(|| PipelineError::Parse("missing field `user.login`".to_owned()))
    }

    /// Returns `true` if a label with exactly this name is attached.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name.as_str() == name)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
