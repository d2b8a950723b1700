//! Configuration types for the GitHub client.

use crate::errors::{GitHubError, GitHubErrorKind};
use secrecy::SecretString;
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default `Accept` media type, pinned to the v3 REST API.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github.v3+json";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "integrations-github-issues/0.1.0";

/// Default scopes requested by the login exchange.
pub const DEFAULT_SCOPES: &[&str] = &["repo"];

/// Default base branch for pull requests created from issues.
pub const DEFAULT_BASE_BRANCH: &str = "master";

/// Default ceiling on pages fetched by a single listing.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "GITHUB_API_URL";

/// Environment variable enabling request/response dumps.
pub const ENV_DEBUG: &str = "GITHUB_DEBUG";

/// GitHub client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub base_url: String,
    /// `Accept` header value.
    pub accept: String,
    /// Initial API token. Replaced by a successful login.
    pub token: Option<SecretString>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Scopes requested when exchanging credentials for a token.
    pub scopes: Vec<String>,
    /// Base branch used by `create_from_issue`.
    pub default_base_branch: String,
    /// Maximum number of pages a listing may fetch. `None` is unbounded.
    pub max_pages: Option<u32>,
    /// Dump requests and responses through `tracing`.
    pub debug: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            default_base_branch: DEFAULT_BASE_BRANCH.to_string(),
            max_pages: Some(DEFAULT_MAX_PAGES),
            debug: false,
        }
    }
}

impl GitHubConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GitHubConfigBuilder {
        GitHubConfigBuilder::new()
    }

    /// Builds a configuration from `GITHUB_TOKEN`, `GITHUB_API_URL` and
    /// `GITHUB_DEBUG`, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, GitHubError> {
        let mut builder = Self::builder();

        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.is_empty() {
                builder = builder.token(token);
            }
        }
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.is_empty() {
                builder = builder.base_url(url);
            }
        }
        if let Ok(flag) = std::env::var(ENV_DEBUG) {
            builder = builder.debug(matches!(flag.as_str(), "1" | "true" | "yes"));
        }

        builder.build()
    }

    /// Base URL without a trailing slash.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GitHubError> {
        if self.base_url.is_empty() {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                format!("Base URL is not a valid URL: {}", e),
            )
            .with_cause(e)
        })?;

        if self.user_agent.is_empty() {
            return Err(GitHubError::configuration("User-Agent is required by GitHub API"));
        }

        if self.accept.is_empty() {
            return Err(GitHubError::configuration("Accept media type cannot be empty"));
        }

        if self.max_pages == Some(0) {
            return Err(GitHubError::configuration("max_pages must be at least 1"));
        }

        Ok(())
    }
}

/// Builder for GitHubConfig.
#[derive(Debug, Default)]
pub struct GitHubConfigBuilder {
    base_url: Option<String>,
    accept: Option<String>,
    token: Option<SecretString>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    scopes: Option<Vec<String>>,
    default_base_branch: Option<String>,
    max_pages: Option<Option<u32>>,
    debug: bool,
}

impl GitHubConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the `Accept` media type.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Sets the API token. An empty token leaves the client unauthenticated.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then(|| SecretString::new(token));
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the scopes requested at login.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the base branch for pull requests created from issues.
    pub fn default_base_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_base_branch = Some(branch.into());
        self
    }

    /// Sets the page ceiling for listings.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(Some(max_pages));
        self
    }

    /// Removes the page ceiling.
    pub fn unbounded_pagination(mut self) -> Self {
        self.max_pages = Some(None);
        self
    }

    /// Enables request/response dumps.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<GitHubConfig, GitHubError> {
        let config = GitHubConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            accept: self.accept.unwrap_or_else(|| DEFAULT_ACCEPT.to_string()),
            token: self.token,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            scopes: self
                .scopes
                .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()),
            default_base_branch: self
                .default_base_branch
                .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string()),
            max_pages: self.max_pages.unwrap_or(Some(DEFAULT_MAX_PAGES)),
            debug: self.debug,
        };

        config.validate()?;
        Ok(config)
    }
}
