//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging a label name
//! with a user login even though both are strings under the hood.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// An empty string was supplied where an identifier is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} must not be empty")]
pub struct EmptyIdentifier(&'static str);

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and
// serde impls that reject the empty string.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(EmptyIdentifier(stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies a GitHub Issue within the configured repository.
///
/// Wraps the issue number assigned by GitHub (positive integer). Pull requests
/// share the same number space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The name of a GitHub label (e.g. `"kind/bug"`).
    ///
    /// Label names are compared as case-sensitive exact strings.
    LabelName
}

/// Label attached to issues whose title or description is too short.
pub const MORE_INFO_NEEDED_LABEL: &str = "status/more-info-needed";

/// Label that marks an issue as needing immediate maintainer attention.
pub const PRIORITY_P0_LABEL: &str = "priority/P0";

impl LabelName {
    /// The fixed `status/more-info-needed` label.
    pub fn more_info_needed() -> Self {
        Self(MORE_INFO_NEEDED_LABEL.to_owned())
    }
}

string_id! {
    /// The login handle of a GitHub user (e.g. `"octocat"`).
    ///
    /// Treated as an opaque string: it is substituted into comment templates
    /// verbatim and never re-interpreted.
    UserLogin
}

string_id! {
    /// The `X-GitHub-Delivery` GUID that identifies a single webhook delivery.
    DeliveryId
}

impl DeliveryId {
    /// Generates a random delivery identifier for requests that carry none.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
