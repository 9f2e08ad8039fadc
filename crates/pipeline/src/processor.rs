//! Action routing for `issues` events.
//!
//! [`IssueProcessor::process`] is the single entry point: it classifies the
//! payload, dispatches on the [`ActionType`] and runs exactly one handler.
//!
//! | Action | Behaviour |
//! |--------|-----------|
//! | `opened` | attach rule labels, then run the content checks |
//! | `edited` | attach only the rule labels not already present, then run the content checks |
//! | `labeled` | comment when `priority/P0` is attached |
//! | `reopened` | nothing |
//!
//! Handler failures are returned unchanged; upstream calls that succeeded
//! before a failure are not undone.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::reconcile::delta;
use crate::templates::{CommentDraft, Template};
use crate::{
    ActionType, Issue, IssueClient, IssueEvent, LabelName, PipelineError, RuleSet,
    PRIORITY_P0_LABEL,
};

/// Titles shorter than this (in characters) get the title-too-short comment.
pub const MIN_TITLE_CHARS: usize = 20;

/// Bodies shorter than this (in characters) get the description-too-short comment.
pub const MIN_BODY_CHARS: usize = 50;

/// What a single `process` call did upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The action that was handled.
    pub action: ActionType,
    /// Labels submitted to GitHub, in submission order.
    pub labels_added: Vec<LabelName>,
    /// Template of the comment that was posted, if any.
    pub comment: Option<Template>,
}

impl Outcome {
    fn new(action: ActionType) -> Self {
        Self {
            action,
            labels_added: Vec::new(),
            comment: None,
        }
    }
}

/// Returns the content-quality comment an issue deserves, if any.
///
/// The title check takes precedence; at most one template is returned.
pub fn quality_check(issue: &Issue) -> Option<Template> {
    if issue.title_str().chars().count() < MIN_TITLE_CHARS {
        Some(Template::TitleTooShort)
    } else if issue.body_str().chars().count() < MIN_BODY_CHARS {
        Some(Template::BodyTooShort)
    } else {
        None
    }
}

/// Processes `issues` webhook payloads against a fixed rule set.
///
/// Cheap to share: both collaborators sit behind [`Arc`] and are never
/// mutated after construction.
#[derive(Clone)]
pub struct IssueProcessor {
    client: Arc<dyn IssueClient>,
    rules: Arc<RuleSet>,
}

impl IssueProcessor {
    /// Creates a processor that evaluates `rules` and acts through `client`.
    pub fn new(client: Arc<dyn IssueClient>, rules: Arc<RuleSet>) -> Self {
        Self { client, rules }
    }

    /// Classifies `payload` and runs the matching handler.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Parse`] / [`PipelineError::UnknownActionType`] before
    ///   any upstream call is made.
    /// - [`PipelineError::Parse`] when a comment is due but the payload has no
    ///   reporter. This is detected before any upstream call is made.
    /// - [`PipelineError::Upstream`] from the first failing upstream call.
    pub async fn process(&self, payload: &[u8]) -> Result<Outcome, PipelineError> {
        let event = IssueEvent::from_slice(payload)?;
        self.handle(&event).await
    }

    /// Runs the handler for an already classified event.
    #[instrument(skip(self, event), fields(action = %event.action, issue = %event.issue.number))]
    pub async fn handle(&self, event: &IssueEvent) -> Result<Outcome, PipelineError> {
        info!("received event type [issues], action type [{}]", event.action);
        debug!(issue = ?event.issue, "issue snapshot");

        let result = match event.action {
            ActionType::Opened => self.act_on_opened(&event.issue).await,
            ActionType::Edited => self.act_on_edited(&event.issue).await,
            ActionType::Labeled => self.act_on_labeled(&event.issue).await,
            ActionType::Reopened => Ok(Outcome::new(ActionType::Reopened)),
        };

        if let Err(e) = &result {
            warn!(error = %e, retry = ?e.retry_policy(), "issue event handling failed");
        }
        result
    }

    async fn act_on_opened(&self, issue: &Issue) -> Result<Outcome, PipelineError> {
        let mut outcome = Outcome::new(ActionType::Opened);
        let feedback = draft(issue, quality_check(issue))?;

        let desired = self.rules.evaluate(issue);
        if !desired.is_empty() {
            self.add_labels(issue, desired, &mut outcome).await?;
        }

        self.check_content(issue, feedback, &mut outcome).await?;
        Ok(outcome)
    }

    async fn act_on_edited(&self, issue: &Issue) -> Result<Outcome, PipelineError> {
        let mut outcome = Outcome::new(ActionType::Edited);
        let feedback = draft(issue, quality_check(issue))?;

        let desired = self.rules.evaluate(issue);
        if !desired.is_empty() {
            let current: Vec<LabelName> = self
                .client
                .get_labels_in_issue(issue.number)
                .await?
                .into_iter()
                .map(|l| l.name)
                .collect();
            let added = delta(&current, &desired);
            if added.is_empty() {
                debug!(?desired, "all generated labels already attached");
            } else {
                self.add_labels(issue, added, &mut outcome).await?;
            }
        }

        self.check_content(issue, feedback, &mut outcome).await?;
        Ok(outcome)
    }

    async fn act_on_labeled(&self, issue: &Issue) -> Result<Outcome, PipelineError> {
        let mut outcome = Outcome::new(ActionType::Labeled);

        let p0 = issue
            .has_label(PRIORITY_P0_LABEL)
            .then_some(Template::NeedsP0Attention);
        if let Some(comment) = draft(issue, p0)? {
            self.post_comment(comment, &mut outcome).await?;
        }
        Ok(outcome)
    }

    /// Posts the content-quality comment, if one was drafted, and tags the issue.
    async fn check_content(
        &self,
        issue: &Issue,
        feedback: Option<CommentDraft>,
        outcome: &mut Outcome,
    ) -> Result<(), PipelineError> {
        let Some(comment) = feedback else {
            return Ok(());
        };

        self.post_comment(comment, outcome).await?;
        self.add_labels(issue, vec![LabelName::more_info_needed()], outcome)
            .await
    }

    async fn add_labels(
        &self,
        issue: &Issue,
        labels: Vec<LabelName>,
        outcome: &mut Outcome,
    ) -> Result<(), PipelineError> {
        self.client
            .add_labels_to_issue(issue.number, &labels)
            .await?;
        info!(?labels, "succeeded in attaching labels to issue {}", issue.number);
        outcome.labels_added.extend(labels);
        Ok(())
    }

    async fn post_comment(
        &self,
        comment: CommentDraft,
        outcome: &mut Outcome,
    ) -> Result<(), PipelineError> {
        self.client
            .add_comment_to_issue(comment.issue, &comment.body)
            .await?;
        info!(
            template = comment.template.as_str(),
            "succeeded in attaching comment to issue {}", comment.issue
        );
        outcome.comment = Some(comment.template);
        Ok(())
    }
}

/// Renders `template` for the issue's reporter before any upstream call runs.
fn draft(issue: &Issue, template: Option<Template>) -> Result<Option<CommentDraft>, PipelineError> {
    template
        .map(|t| {
            issue
                .reporter()
                .map(|user| CommentDraft::new(issue.number, t, user))
        })
        .transpose()
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
