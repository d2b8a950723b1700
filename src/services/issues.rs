//! Issue operations: issues, comments, labels and assignees.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::Paginator;
use crate::types::{Comment, Issue, Label, User};
use serde::Serialize;

/// Service for issue operations.
pub struct IssuesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> IssuesService<'a> {
    /// Creates a new issues service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists all issues in a repository, following every page.
    pub async fn list(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Issue>> {
        self.client
            .get_all(&format!("/repos/{}/{}/issues", owner, repo))
            .await
    }

    /// Lists all issues matching `params`, following every page.
    pub async fn list_with_params(
        &self,
        owner: &str,
        repo: &str,
        params: &ListIssuesParams,
    ) -> GitHubResult<Vec<Issue>> {
        self.client
            .get_all_with_params(&format!("/repos/{}/{}/issues", owner, repo), params)
            .await
    }

    /// Returns a page-by-page walker over the issues matching `params`.
    pub fn paginate(
        &self,
        owner: &str,
        repo: &str,
        params: &ListIssuesParams,
    ) -> GitHubResult<Paginator<'a, Issue>> {
        let path = crate::client::path_with_query(
            &format!("/repos/{}/{}/issues", owner, repo),
            params,
        )?;
        Ok(self.client.paginate(path))
    }

    /// Gets an issue.
    pub async fn get(&self, owner: &str, repo: &str, issue_number: u64) -> GitHubResult<Issue> {
        self.client
            .get(&format!("/repos/{}/{}/issues/{}", owner, repo, issue_number))
            .await
    }

    // Comments

    /// Lists all comments on an issue.
    pub async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GitHubResult<Vec<Comment>> {
        self.client
            .get_all(&format!(
                "/repos/{}/{}/issues/{}/comments",
                owner, repo, issue_number
            ))
            .await
    }

    /// Lists all issue comments across a repository.
    pub async fn list_repo_comments(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Comment>> {
        self.client
            .get_all(&format!("/repos/{}/{}/issues/comments", owner, repo))
            .await
    }

    // Labels

    /// Lists all labels in a repository.
    pub async fn list_labels(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Label>> {
        self.client
            .get_all(&format!("/repos/{}/{}/labels", owner, repo))
            .await
    }

    // Assignees

    /// Lists all users that can be assigned to issues in a repository.
    pub async fn list_assignees(&self, owner: &str, repo: &str) -> GitHubResult<Vec<User>> {
        self.client
            .get_all(&format!("/repos/{}/{}/assignees", owner, repo))
            .await
    }
}

/// Parameters for listing issues.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListIssuesParams {
    /// Filter by state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueStateFilter>,
    /// Filter by labels (comma-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// Filter by assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Filter by creator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<IssueSort>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    /// Only issues updated at or after this ISO 8601 time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Items per page (max 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl ListIssuesParams {
    /// Filters by state.
    pub fn state(mut self, state: IssueStateFilter) -> Self {
        self.state = Some(state);
        self
    }

    /// Filters by label names.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.labels = Some(joined);
        self
    }

    /// Sets items per page.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page.min(100));
        self
    }
}

/// Issue state filter.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStateFilter {
    /// Open issues.
    Open,
    /// Closed issues.
    Closed,
    /// Both.
    All,
}

/// Issue sort field.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSort {
    /// Creation time.
    Created,
    /// Last update time.
    Updated,
    /// Comment count.
    Comments,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}
