//! Port traits implemented by infrastructure crates.
//!
//! The pipeline only reaches GitHub through [`IssueClient`]. The `github`
//! crate supplies the production implementation; tests supply in-memory ones.

use async_trait::async_trait;

use crate::{IssueNumber, Label, LabelName, UpstreamError};

/// Label and comment operations on issues of one repository.
///
/// Implementations must be safe to share across concurrently processed events.
#[async_trait]
pub trait IssueClient: Send + Sync {
    /// Attaches `labels` to the issue. Labels already present are left as is.
    async fn add_labels_to_issue(
        &self,
        issue: IssueNumber,
        labels: &[LabelName],
    ) -> Result<(), UpstreamError>;

    /// Lists the labels currently attached to the issue.
    async fn get_labels_in_issue(&self, issue: IssueNumber) -> Result<Vec<Label>, UpstreamError>;

    /// Posts a new comment with `body` on the issue.
    async fn add_comment_to_issue(&self, issue: IssueNumber, body: &str)
        -> Result<(), UpstreamError>;
}
