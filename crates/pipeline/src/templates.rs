//! Canned comment bodies.
//!
//! Each template carries a single `{user}` placeholder that is replaced with
//! the reporter's login. The login is inserted verbatim; the substituted text
//! is never scanned for placeholders again.

use crate::{IssueNumber, UserLogin};

const USER_PLACEHOLDER: &str = "{user}";

const TITLE_TOO_SHORT: &str = "Thanks for your report, @{user}! \
The title of this issue is too short to describe the problem. \
Could you please edit it to summarise the issue in at least 20 characters? \
A descriptive title helps maintainers triage it faster.";

const BODY_TOO_SHORT: &str = "Thanks for your report, @{user}! \
The description of this issue is too short for maintainers to act on. \
Could you please edit it and add details such as the steps to reproduce, \
the expected and actual behaviour, and your environment?";

const NEEDS_P0_ATTENTION: &str = "This issue reported by @{user} is labeled `priority/P0`. \
Maintainers, please take a look as soon as possible.";

/// Identifies one of the fixed comment templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// The issue title is missing or shorter than 20 characters.
    TitleTooShort,
    /// The issue body is missing or shorter than 50 characters.
    BodyTooShort,
    /// The issue carries the `priority/P0` label.
    NeedsP0Attention,
}

impl Template {
    /// Stable snake_case name used in logs and HTTP responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TitleTooShort => "title_too_short",
            Self::BodyTooShort => "body_too_short",
            Self::NeedsP0Attention => "needs_p0_attention",
        }
    }

    /// The raw template text, including the `{user}` placeholder.
    pub fn text(self) -> &'static str {
        match self {
            Self::TitleTooShort => TITLE_TOO_SHORT,
            Self::BodyTooShort => BODY_TOO_SHORT,
            Self::NeedsP0Attention => NEEDS_P0_ATTENTION,
        }
    }
}

/// Renders `template` for the reporter `user`.
pub fn render(template: Template, user: &UserLogin) -> String {
    template.text().replace(USER_PLACEHOLDER, user.as_str())
}

/// A rendered comment waiting to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    /// Issue the comment is posted to.
    pub issue: IssueNumber,
    /// Template the body was rendered from.
    pub template: Template,
    /// Final comment body.
    pub body: String,
}

impl CommentDraft {
    /// Renders `template` for `user` targeting `issue`.
    pub fn new(issue: IssueNumber, template: Template, user: &UserLogin) -> Self {
        Self {
            issue,
            template,
            body: render(template, user),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{render, Template};
    use crate::UserLogin;

    fn login(s: &str) -> UserLogin {
        UserLogin::new(s).expect("non-empty login")
    }

    #[rstest]
    #[case(Template::TitleTooShort, "title_too_short")]
    #[case(Template::BodyTooShort, "body_too_short")]
    #[case(Template::NeedsP0Attention, "needs_p0_attention")]
    fn wire_names_are_snake_case(#[case] template: Template, #[case] expected: &str) {
        assert_eq!(template.as_str(), expected);
    }

    #[rstest]
    #[case(Template::TitleTooShort)]
    #[case(Template::BodyTooShort)]
    #[case(Template::NeedsP0Attention)]
    fn mentions_the_reporter(#[case] template: Template) {
        let body = render(template, &login("alice"));

        assert!(body.contains("@alice"));
        assert!(!body.contains("{user}"));
    }

    #[test]
    fn p0_template_names_the_label() {
        assert!(render(Template::NeedsP0Attention, &login("bob")).contains("`priority/P0`"));
    }

    #[test]
    fn handle_is_not_reinterpreted() {
        let body = render(Template::TitleTooShort, &login("{user}%s{0}"));

        assert!(body.starts_with("Thanks for your report, @{user}%s{0}!"));
    }
}
