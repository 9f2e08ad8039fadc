use rstest::rstest;
use serde_json::json;

use super::{ActionType, IssueEvent};
use crate::{IssueNumber, PipelineError};

fn payload(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).expect("serialise payload")
}

#[rstest]
#[case("opened", ActionType::Opened)]
#[case("edited", ActionType::Edited)]
#[case("labeled", ActionType::Labeled)]
#[case("reopened", ActionType::Reopened)]
fn parses_known_actions(#[case] wire: &str, #[case] expected: ActionType) {
    assert_eq!(wire.parse::<ActionType>().expect("known action"), expected);
    assert_eq!(expected.as_str(), wire);
}

#[test]
fn classifies_full_issue_payload() {
    let bytes = payload(json!({
        "action": "opened",
        "issue": {
            "number": 42,
            "title": "Daemon panics when the volume plugin is missing",
            "body": "Steps to reproduce ...",
            "user": { "login": "alice", "id": 1 },
            "labels": [{ "name": "bug", "color": "ff0000" }],
            "state": "open"
        },
        "repository": { "full_name": "owner/repo" }
    }));

    let event = IssueEvent::from_slice(&bytes).expect("valid payload");

    assert_eq!(event.action, ActionType::Opened);
    assert_eq!(event.issue.number, IssueNumber::new(42));
    assert_eq!(event.issue.reporter().expect("reporter").as_str(), "alice");
    assert!(event.issue.has_label("bug"));
    assert!(!event.issue.has_label("Bug"));
    assert_eq!(event.issue.labels[0].color.as_deref(), Some("ff0000"));
}

#[test]
fn missing_title_body_and_labels_are_valid() {
    let bytes = payload(json!({
        "action": "edited",
        "issue": { "number": 3, "body": null, "labels": null, "user": { "login": "bob" } }
    }));

    let event = IssueEvent::from_slice(&bytes).expect("valid payload");

    assert_eq!(event.issue.title, None);
    assert_eq!(event.issue.body, None);
    assert!(event.issue.labels.is_empty());
    assert_eq!(event.issue.title_str(), "");
}

#[test]
fn issue_without_user_is_classified() {
    let bytes = payload(json!({
        "action": "reopened",
        "issue": { "number": 8 }
    }));

    let event = IssueEvent::from_slice(&bytes).expect("valid payload");

    assert_eq!(event.issue.user, None);
    assert!(matches!(event.issue.reporter(), Err(PipelineError::Parse(_))));
}

#[test]
fn unknown_action_is_reported_with_offending_string() {
    let bytes = payload(json!({
        "action": "transferred",
        "issue": { "number": 1, "user": { "login": "bob" } }
    }));

    match IssueEvent::from_slice(&bytes) {
        Err(PipelineError::UnknownActionType(action)) => assert_eq!(action, "transferred"),
        other => panic!("expected UnknownActionType, got {other:?}"),
    }
}

#[rstest]
#[case::not_json(b"not json".to_vec())]
#[case::missing_action(payload(json!({ "issue": { "number": 1, "user": { "login": "a" } } })))]
#[case::missing_issue(payload(json!({ "action": "opened" })))]
#[case::missing_number(payload(json!({ "action": "opened", "issue": { "user": { "login": "a" } } })))]
#[case::user_without_login(payload(json!({ "action": "opened", "issue": { "number": 1, "user": {} } })))]
#[case::action_not_string(payload(json!({ "action": 5, "issue": {} })))]
fn malformed_payloads_are_parse_errors(#[case] bytes: Vec<u8>) {
    assert!(matches!(
        IssueEvent::from_slice(&bytes),
        Err(PipelineError::Parse(_))
    ));
}
