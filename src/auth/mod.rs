//! Authentication state for GitHub API requests.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::RwLock;

/// Scheme prefix used in the `Authorization` header.
pub const TOKEN_SCHEME: &str = "token";

/// Credentials exchanged for a token by the login flow.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    /// GitHub username, sent as HTTP basic auth.
    pub username: String,
    /// GitHub password, sent as HTTP basic auth.
    pub password: SecretString,
    /// OAuth application client ID.
    pub client_id: String,
    /// OAuth application client secret.
    pub client_secret: SecretString,
}

impl LoginCredentials {
    /// Creates a new set of login credentials.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }
}

/// JSON body of the token exchange request.
#[derive(Debug, Serialize)]
pub(crate) struct TokenExchangeRequest<'a> {
    pub client_secret: &'a str,
    pub scopes: &'a [String],
}

/// Holds the token used to authenticate requests.
///
/// The token is written once by a successful login (or seeded from
/// configuration) and read by every request afterwards.
#[derive(Debug, Default)]
pub struct AuthManager {
    token: RwLock<Option<SecretString>>,
}

impl AuthManager {
    /// Creates a manager seeded with an optional token.
    ///
    /// An empty token counts as no token.
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.expose_secret().is_empty())),
        }
    }

    /// Returns the `Authorization` header value, if a token is present.
    pub async fn auth_header(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.expose_secret())
            .filter(|t| !t.is_empty())
            .map(|t| format!("{} {}", TOKEN_SCHEME, t))
    }

    /// Returns true once a token is stored.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Stores a new token, replacing any previous one.
    ///
    /// Storing an empty token drops the current one.
    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write().await = if token.is_empty() {
            None
        } else {
            Some(SecretString::new(token))
        };
    }

    /// Drops the stored token.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Gets a loggable prefix of the stored token.
    pub async fn token_prefix(&self) -> Option<&'static str> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| token_prefix(t.expose_secret()))
    }
}

/// Classifies a token by its well-known prefix for logging.
pub fn token_prefix(token: &str) -> &'static str {
    if token.starts_with("ghp_") {
        "ghp_***"
    } else if token.starts_with("github_pat_") {
        "github_pat_***"
    } else if token.starts_with("gho_") {
        "gho_***"
    } else {
        "***"
    }
}
