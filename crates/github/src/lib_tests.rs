use std::time::Duration;

use pipeline::{IssueClient, IssueNumber, LabelName, RetryPolicy, UpstreamError};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{GithubClient, GithubClientError, GithubConfig};

const LABELS_PATH: &str = "/repos/owner/repo/issues/42/labels";
const COMMENTS_PATH: &str = "/repos/owner/repo/issues/42/comments";

fn config(api_base: &str) -> GithubConfig {
    GithubConfig {
        api_base: format!("{api_base}/"),
        owner: "owner".to_owned(),
        repo: "repo".to_owned(),
        token: "test-token".to_owned(),
        timeout: Duration::from_secs(5),
    }
}

async fn client() -> (MockServer, GithubClient) {
    let server = MockServer::start().await;
    let client = GithubClient::new(config(&server.uri())).expect("client should build");
    (server, client)
}

fn label(name: &str) -> LabelName {
    LabelName::new(name).expect("non-empty label")
}

#[tokio::test]
async fn add_labels_posts_label_names() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path(LABELS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/vnd.github+json"))
        .and(body_json(json!({ "labels": ["kind/bug", "status/more-info-needed"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client
        .add_labels_to_issue(
            IssueNumber::new(42),
            &[label("kind/bug"), label("status/more-info-needed")],
        )
        .await
        .expect("labels should be added");
}

#[tokio::test]
async fn get_labels_decodes_names_and_metadata() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "node_id": "MDU6TGFiZWwx",
                "url": "https://api.github.com/repos/owner/repo/labels/bug",
                "name": "kind/bug",
                "color": "d73a4a",
                "default": true,
                "description": "Something isn't working"
            },
            { "id": 2, "name": "priority/P0", "color": "b60205", "description": null }
        ])))
        .mount(&server)
        .await;

    let labels = client
        .get_labels_in_issue(IssueNumber::new(42))
        .await
        .expect("labels should be fetched");

    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].name, label("kind/bug"));
    assert_eq!(labels[0].color.as_deref(), Some("d73a4a"));
    assert_eq!(labels[1].name.as_str(), pipeline::PRIORITY_P0_LABEL);
    assert_eq!(labels[1].description, None);
}

#[tokio::test]
async fn add_comment_posts_body() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path(COMMENTS_PATH))
        .and(body_json(json!({ "body": "hello @alice" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .add_comment_to_issue(IssueNumber::new(42), "hello @alice")
        .await
        .expect("comment should be created");
}

#[rstest]
#[case(404, false)]
#[case(422, false)]
#[case(429, true)]
#[case(502, true)]
#[tokio::test]
async fn api_errors_carry_github_message(#[case] status: u16, #[case] retryable: bool) {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path(COMMENTS_PATH))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("Retry-After", "30")
                .set_body_json(json!({ "message": "Nope", "documentation_url": "https://docs" })),
        )
        .mount(&server)
        .await;

    let err = client
        .add_comment_to_issue(IssueNumber::new(42), "body")
        .await
        .expect_err("request should fail");

    match &err {
        UpstreamError::Api {
            status: s, message, ..
        } => {
            assert_eq!(*s, status);
            assert_eq!(message, "Nope");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.retry_policy() != RetryPolicy::NonRetryable, retryable);
    if retryable {
        assert_eq!(
            err.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(30))
            }
        );
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_verbatim() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client
        .get_labels_in_issue(IssueNumber::new(42))
        .await
        .expect_err("request should fail");

    assert!(matches!(err, UpstreamError::Api { ref message, .. } if message == "upstream exploded"));
}

#[tokio::test]
async fn malformed_label_list_is_a_decode_error() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "not": "a list" })))
        .mount(&server)
        .await;

    let err = client
        .get_labels_in_issue(IssueNumber::new(42))
        .await
        .expect_err("decode should fail");

    assert!(matches!(err, UpstreamError::Decode(_)));
}

#[test]
fn token_with_newline_is_rejected() {
    let mut cfg = config("http://localhost");
    cfg.token = "bad\ntoken".to_owned();

    assert!(matches!(
        GithubClient::new(cfg),
        Err(GithubClientError::InvalidToken)
    ));
}
