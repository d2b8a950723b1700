//! Pull request operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::types::PullRequest;
use serde::Serialize;

/// Service for pull request operations.
pub struct PullRequestsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestsService<'a> {
    /// Creates a new pull requests service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Creates a pull request.
    pub async fn create(
        &self,
        owner: &str,
        repo: &str,
        request: &CreatePullRequest,
    ) -> GitHubResult<PullRequest> {
        self.client
            .post(&format!("/repos/{}/{}/pulls", owner, repo), request)
            .await
    }

    /// Converts an existing issue into a pull request from `head` into the
    /// configured default base branch.
    pub async fn create_from_issue(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        issue_number: u64,
    ) -> GitHubResult<PullRequest> {
        let request = CreatePullRequestFromIssue {
            issue: issue_number,
            head,
            base: &self.client.config().default_base_branch,
        };
        self.client
            .post(&format!("/repos/{}/{}/pulls", owner, repo), &request)
            .await
    }
}

/// Request to create a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullRequest {
    /// PR title.
    pub title: String,
    /// Branch containing the changes.
    pub head: String,
    /// Branch to merge into.
    pub base: String,
    /// PR body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Open as draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CreatePullRequestFromIssue<'a> {
    issue: u64,
    head: &'a str,
    base: &'a str,
}
