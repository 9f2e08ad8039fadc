//! Event dispatch and rule-evaluation pipeline for Issuewarden.
//!
//! This crate turns a raw `issues` webhook payload into label and comment
//! actions: it classifies the payload, evaluates the registered rules,
//! reconciles the resulting labels against the ones already attached and
//! renders the canned comments. Infrastructure crates implement the
//! [`IssueClient`] port defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`IssueNumber`, `LabelName`, `UserLogin`) and fixed label names |
//! | [`types`] | The `Issue` snapshot and `Label` |
//! | [`event`] | `ActionType` and payload classification |
//! | [`rules`] | The `Rule` trait, keyword rules and the ordered `RuleSet` |
//! | [`reconcile`] | Label delta computation |
//! | [`templates`] | Canned comment templates |
//! | [`ports`] | The `IssueClient` upstream port |
//! | [`processor`] | Action routing and handlers |
//! | [`errors`] | Error and retry-policy types |

pub mod errors;
pub mod event;
pub mod identifiers;
pub mod ports;
pub mod processor;
pub mod reconcile;
pub mod rules;
pub mod templates;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{PipelineError, RetryPolicy, UpstreamError};
pub use event::{ActionType, IssueEvent};
pub use identifiers::{
    DeliveryId, EmptyIdentifier, IssueNumber, LabelName, UserLogin, MORE_INFO_NEEDED_LABEL,
    PRIORITY_P0_LABEL,
};
pub use ports::IssueClient;
pub use processor::{quality_check, IssueProcessor, Outcome, MIN_BODY_CHARS, MIN_TITLE_CHARS};
pub use reconcile::delta;
pub use rules::{FnRule, KeywordRule, MatchField, Rule, RuleSet};
pub use templates::{render, CommentDraft, Template};
pub use types::{Issue, IssueUser, Label};
