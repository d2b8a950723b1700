//! User operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::types::User;

/// Service for user operations.
pub struct UsersService<'a> {
    client: &'a GitHubClient,
}

impl<'a> UsersService<'a> {
    /// Creates a new users service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets the authenticated user.
    pub async fn get_authenticated(&self) -> GitHubResult<User> {
        self.client.get("/user").await
    }

    /// Gets a user by username.
    pub async fn get(&self, username: &str) -> GitHubResult<User> {
        self.client.get(&format!("/users/{}", username)).await
    }
}
