//! Token exchange.

use crate::auth::{token_prefix, LoginCredentials, TokenExchangeRequest};
use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::observability::TracingHooks;
use crate::types::Authorization;
use secrecy::ExposeSecret;

/// Service for exchanging credentials for an API token.
pub struct AuthorizationsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> AuthorizationsService<'a> {
    /// Creates a new authorizations service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Exchanges basic credentials for a token scoped to
    /// [`GitHubConfig::scopes`](crate::GitHubConfig::scopes).
    ///
    /// On success the token is stored on the client and sent with every
    /// later request. On failure the stored token is left untouched.
    pub async fn login(&self, credentials: &LoginCredentials) -> GitHubResult<Authorization> {
        let body = TokenExchangeRequest {
            client_secret: credentials.client_secret.expose_secret(),
            scopes: &self.client.config().scopes,
        };

        let authorization: Authorization = self
            .client
            .put_with_basic_auth(
                &format!("/authorizations/clients/{}", credentials.client_id),
                &body,
                &credentials.username,
                credentials.password.expose_secret(),
            )
            .await?;

        let token = authorization.token.expose_secret();
        self.client.auth().set_token(token.as_str()).await;
        TracingHooks::on_login(&credentials.username, token_prefix(token));

        Ok(authorization)
    }
}
