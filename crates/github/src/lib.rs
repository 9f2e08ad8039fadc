//! Issuewarden GitHub infrastructure adapter.
//!
//! Implements the [`pipeline::IssueClient`] port against the GitHub REST API
//! using [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details (authentication, headers, error bodies) are handled here; the
//! [`pipeline`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get_labels_in_issue` | `GET /repos/{owner}/{repo}/issues/{n}/labels?per_page=100` |
//! | `add_labels_to_issue` | `POST /repos/{owner}/{repo}/issues/{n}/labels` |
//! | `add_comment_to_issue` | `POST /repos/{owner}/{repo}/issues/{n}/comments` |

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{IssueClient, IssueNumber, Label, LabelName, UpstreamError};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Public GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("issuewarden/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API root, without a trailing slash (e.g. [`DEFAULT_API_BASE`]).
    pub api_base: String,
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Personal access token or installation token.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Failure to construct a [`GithubClient`].
#[derive(Debug, Error)]
pub enum GithubClientError {
    /// The token contains characters that cannot appear in an HTTP header.
    #[error("GitHub token is not a valid header value")]
    InvalidToken,

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct AddLabelsRequest<'a> {
    labels: &'a [LabelName],
}

#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

/// [`IssueClient`] backed by the GitHub REST API for a single repository.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    /// Builds a client for the repository described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubClientError`] if the token is not a valid header value
    /// or the HTTP client cannot be initialised.
    pub fn new(config: GithubConfig) -> Result<Self, GithubClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GithubClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            owner: config.owner,
            repo: config.repo,
        })
    }

    fn issue_url(&self, issue: IssueNumber, resource: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/{}",
            self.api_base,
            self.owner,
            self.repo,
            issue.as_u64(),
            resource
        )
    }

    async fn send(request: RequestBuilder) -> Result<Response, UpstreamError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);

        warn!(status = status.as_u16(), %message, "GitHub API request failed");
        Err(UpstreamError::Api {
            status: status.as_u16(),
            message,
            retry_after,
        })
    }
}

fn transport_error(e: reqwest::Error) -> UpstreamError {
    if e.is_decode() {
        UpstreamError::Decode(e.to_string())
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

#[async_trait]
impl IssueClient for GithubClient {
    #[instrument(skip_all, fields(issue = %issue, labels = ?labels))]
    async fn add_labels_to_issue(
        &self,
        issue: IssueNumber,
        labels: &[LabelName],
    ) -> Result<(), UpstreamError> {
        let request = self
            .http
            .post(self.issue_url(issue, "labels"))
            .json(&AddLabelsRequest { labels });
        Self::send(request).await?;
        debug!(count = labels.len(), "labels added");
        Ok(())
    }

    #[instrument(skip_all, fields(issue = %issue))]
    async fn get_labels_in_issue(&self, issue: IssueNumber) -> Result<Vec<Label>, UpstreamError> {
        let request = self
            .http
            .get(self.issue_url(issue, "labels"))
            .query(&[("per_page", "100")]);
        let labels: Vec<Label> = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        debug!(count = labels.len(), "labels fetched");
        Ok(labels)
    }

    #[instrument(skip_all, fields(issue = %issue))]
    async fn add_comment_to_issue(
        &self,
        issue: IssueNumber,
        body: &str,
    ) -> Result<(), UpstreamError> {
        let request = self
            .http
            .post(self.issue_url(issue, "comments"))
            .json(&CreateCommentRequest { body });
        Self::send(request).await?;
        debug!("comment created");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
