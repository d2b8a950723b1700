//! Repository operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::types::Repository;

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets a repository.
    pub async fn get(&self, owner: &str, repo: &str) -> GitHubResult<Repository> {
        self.client.get(&format!("/repos/{}/{}", owner, repo)).await
    }

    /// Lists all repositories of an organization.
    pub async fn list_for_org(&self, org: &str) -> GitHubResult<Vec<Repository>> {
        self.client.get_all(&format!("/orgs/{}/repos", org)).await
    }

    /// Lists all public repositories of a user.
    pub async fn list_for_user(&self, username: &str) -> GitHubResult<Vec<Repository>> {
        self.client
            .get_all(&format!("/users/{}/repos", username))
            .await
    }
}
