//! Core data types for GitHub API.
//!
//! Records mirror the upstream JSON. Fields the API may omit or null are
//! `Option`s; lists default to empty.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// GitHub user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Username (login).
    pub login: String,
    /// User ID.
    pub id: u64,
    /// User node ID.
    #[serde(default)]
    pub node_id: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Gravatar ID.
    #[serde(default)]
    pub gravatar_id: Option<String>,
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// Profile URL.
    #[serde(default)]
    pub html_url: String,
    /// Followers API URL.
    #[serde(default)]
    pub followers_url: String,
    /// Following API URL (templated).
    #[serde(default)]
    pub following_url: String,
    /// Gists API URL (templated).
    #[serde(default)]
    pub gists_url: String,
    /// Starred API URL (templated).
    #[serde(default)]
    pub starred_url: String,
    /// Subscriptions API URL.
    #[serde(default)]
    pub subscriptions_url: String,
    /// Organizations API URL.
    #[serde(default)]
    pub organizations_url: String,
    /// Repositories API URL.
    #[serde(default)]
    pub repos_url: String,
    /// Events API URL (templated).
    #[serde(default)]
    pub events_url: String,
    /// Received events API URL.
    #[serde(default)]
    pub received_events_url: String,
    /// User type (User, Organization, Bot).
    #[serde(rename = "type", default)]
    pub user_type: String,
    /// Site admin flag.
    #[serde(default)]
    pub site_admin: bool,
}

/// GitHub repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Repository name.
    pub name: String,
    /// Full name (owner/repo).
    #[serde(default)]
    pub full_name: String,
    /// Owner information.
    pub owner: Option<User>,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
    /// Repository description.
    pub description: Option<String>,
    /// Whether the repository is a fork.
    #[serde(default)]
    pub fork: bool,
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Default branch.
    pub default_branch: Option<String>,
    /// Primary language.
    pub language: Option<String>,
    /// Fork count.
    #[serde(default)]
    pub forks_count: u32,
    /// Stargazer count.
    #[serde(default)]
    pub stargazers_count: u32,
    /// Open issue count.
    #[serde(default)]
    pub open_issues_count: u32,
    /// Whether the repository is archived.
    #[serde(default)]
    pub archived: bool,
    /// Whether the repository is disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Last push time.
    pub pushed_at: Option<DateTime<Utc>>,
}

/// GitHub issue. Pull requests are issues too; see [`Issue::is_pull_request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// Repository API URL.
    #[serde(default)]
    pub repository_url: String,
    /// Labels API URL (templated).
    #[serde(default)]
    pub labels_url: String,
    /// Comments API URL.
    #[serde(default)]
    pub comments_url: String,
    /// Events API URL.
    #[serde(default)]
    pub events_url: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Issue number.
    pub number: u64,
    /// Issue state.
    pub state: IssueState,
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: Option<String>,
    /// Issue author.
    pub user: Option<User>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Primary assignee.
    pub assignee: Option<User>,
    /// Assignees.
    #[serde(default)]
    pub assignees: Vec<User>,
    /// Milestone.
    pub milestone: Option<Milestone>,
    /// Whether the issue is locked.
    #[serde(default)]
    pub locked: bool,
    /// Lock reason.
    pub active_lock_reason: Option<String>,
    /// Comment count.
    #[serde(default)]
    pub comments: u64,
    /// Pull request links, present when the issue is a pull request.
    pub pull_request: Option<IssuePullRequestLinks>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// User who closed the issue.
    pub closed_by: Option<User>,
}

impl Issue {
    /// Returns true when this issue is backed by a pull request.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Returns true when a label with this name (case-insensitive) is set.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name.eq_ignore_ascii_case(name))
    }
}

/// Issue state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Open issue.
    Open,
    /// Closed issue.
    Closed,
}

/// Links to the pull request behind an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePullRequestLinks {
    /// API URL.
    pub url: Option<String>,
    /// HTML URL.
    pub html_url: Option<String>,
    /// Diff URL.
    pub diff_url: Option<String>,
    /// Patch URL.
    pub patch_url: Option<String>,
}

/// Issue comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// Issue API URL.
    #[serde(default)]
    pub issue_url: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Comment body.
    #[serde(default)]
    pub body: String,
    /// Comment author.
    pub user: Option<User>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// GitHub label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// Label name.
    pub name: String,
    /// Label description.
    pub description: Option<String>,
    /// Label color (hex without `#`).
    #[serde(default)]
    pub color: String,
    /// Default label flag.
    #[serde(default)]
    pub default: bool,
}

/// GitHub milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Labels API URL.
    #[serde(default)]
    pub labels_url: String,
    /// Milestone ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// Milestone number.
    pub number: u64,
    /// Milestone state.
    pub state: MilestoneState,
    /// Milestone title.
    pub title: String,
    /// Milestone description.
    pub description: Option<String>,
    /// Creator.
    pub creator: Option<User>,
    /// Open issue count.
    #[serde(default)]
    pub open_issues: u64,
    /// Closed issue count.
    #[serde(default)]
    pub closed_issues: u64,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Due date.
    pub due_on: Option<DateTime<Utc>>,
}

/// Milestone state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    /// Open milestone.
    Open,
    /// Closed milestone.
    Closed,
}

/// GitHub pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR ID.
    pub id: u64,
    /// Node ID.
    #[serde(default)]
    pub node_id: String,
    /// PR number.
    pub number: u64,
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// HTML URL.
    pub html_url: String,
    /// Diff URL.
    pub diff_url: Option<String>,
    /// Patch URL.
    pub patch_url: Option<String>,
    /// PR state.
    pub state: PullRequestState,
    /// PR title.
    #[serde(default)]
    pub title: String,
    /// PR body.
    pub body: Option<String>,
    /// PR author.
    pub user: Option<User>,
    /// Head branch info.
    pub head: Option<PullRequestRef>,
    /// Base branch info.
    pub base: Option<PullRequestRef>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Whether the PR is a draft.
    #[serde(default)]
    pub draft: bool,
    /// Whether the PR is merged.
    #[serde(default)]
    pub merged: bool,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Merged time.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Pull request state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open PR.
    Open,
    /// Closed PR.
    Closed,
}

/// Pull request branch reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Branch label (`owner:branch`).
    pub label: String,
    /// Branch name.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Commit SHA.
    pub sha: String,
}

/// Result of exchanging credentials for a token.
#[derive(Debug, Clone, Deserialize)]
pub struct Authorization {
    /// Authorization ID.
    pub id: Option<u64>,
    /// The issued token.
    pub token: SecretString,
    /// Hashed token.
    pub hashed_token: Option<String>,
    /// Last eight characters of the token.
    pub token_last_eight: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Note attached to the authorization.
    pub note: Option<String>,
}
