//! Error types for the GitHub client.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Error kinds for categorizing GitHub errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubErrorKind {
    // Configuration errors
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Request construction errors
    /// Request parameters or body could not be encoded.
    InvalidParameter,

    // Network errors
    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,
    /// Request aborted through a cancellation token.
    Cancelled,
    /// Any other transport failure.
    TransportError,

    // HTTP status errors
    /// Request validation failed (400).
    ValidationError,
    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403).
    Forbidden,
    /// Resource not found (404).
    NotFound,
    /// Resource conflict (409).
    Conflict,
    /// Resource is gone (410).
    Gone,
    /// Unprocessable entity (422).
    UnprocessableEntity,
    /// Primary rate limit exceeded.
    PrimaryRateLimitExceeded,
    /// Secondary rate limit exceeded (429).
    SecondaryRateLimitExceeded,
    /// Internal server error (500).
    InternalError,
    /// Bad gateway (502).
    BadGateway,
    /// Service unavailable (503).
    ServiceUnavailable,

    // Response errors
    /// Failed to deserialize a response body.
    DeserializationError,

    // Pagination errors
    /// The `Link` response header could not be parsed.
    MalformedLinkHeader,
    /// The configured page ceiling was reached with pages remaining.
    PageLimitExceeded,

    // Generic
    /// Unknown error.
    Unknown,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl => write!(f, "invalid_base_url"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::InvalidParameter => write!(f, "invalid_parameter"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::TransportError => write!(f, "transport_error"),
            Self::ValidationError => write!(f, "validation_error"),
            Self::BadCredentials => write!(f, "bad_credentials"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Gone => write!(f, "gone"),
            Self::UnprocessableEntity => write!(f, "unprocessable_entity"),
            Self::PrimaryRateLimitExceeded => write!(f, "primary_rate_limit_exceeded"),
            Self::SecondaryRateLimitExceeded => write!(f, "secondary_rate_limit_exceeded"),
            Self::InternalError => write!(f, "internal_error"),
            Self::BadGateway => write!(f, "bad_gateway"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::DeserializationError => write!(f, "deserialization_error"),
            Self::MalformedLinkHeader => write!(f, "malformed_link_header"),
            Self::PageLimitExceeded => write!(f, "page_limit_exceeded"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Rate limit information captured from response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Maximum requests allowed.
    pub limit: u32,
    /// Remaining requests in current window.
    pub remaining: u32,
    /// Time when the rate limit resets.
    pub reset_at: DateTime<Utc>,
    /// Retry-After header value in seconds (if present).
    pub retry_after: Option<u64>,
    /// Resource category.
    pub resource: Option<String>,
}

/// Error body returned by the GitHub API on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    /// Primary error message.
    pub message: String,
    /// Link to the relevant API documentation.
    #[serde(default)]
    pub documentation_url: Option<String>,
    /// Detailed sub-errors, in upstream order.
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// A single entry of the `errors` array in an error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    /// Human readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Resource the error applies to.
    #[serde(default)]
    pub resource: Option<String>,
    /// Offending field.
    #[serde(default)]
    pub field: Option<String>,
    /// Machine readable code.
    #[serde(default)]
    pub code: Option<String>,
}

/// GitHub API error with detailed information.
#[derive(Error, Debug)]
pub struct GitHubError {
    kind: GitHubErrorKind,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
    documentation_url: Option<String>,
    details: Vec<ApiErrorDetail>,
    rate_limit: Option<RateLimitInfo>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new GitHub error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            documentation_url: None,
            details: Vec::new(),
            rate_limit: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Sets the sub-errors reported by the API.
    pub fn with_details(mut self, details: Vec<ApiErrorDetail>) -> Self {
        self.details = details;
        self
    }

    /// Sets the rate limit info.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &GitHubErrorKind {
        &self.kind
    }

    /// Gets the error message (the upstream `message` for API errors).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the documentation URL.
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// Gets the sub-errors reported by the API.
    pub fn details(&self) -> &[ApiErrorDetail] {
        &self.details
    }

    /// Gets the rate limit info.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Returns true for 404 responses.
    pub fn is_not_found(&self) -> bool {
        self.kind == GitHubErrorKind::NotFound
    }

    /// Returns true when the request was rejected by rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.kind,
            GitHubErrorKind::PrimaryRateLimitExceeded | GitHubErrorKind::SecondaryRateLimitExceeded
        )
    }

    /// Creates an error from an HTTP status code and a decoded error body.
    pub fn from_response(
        status: u16,
        body: ErrorResponse,
        request_id: Option<String>,
        rate_limit: Option<RateLimitInfo>,
    ) -> Self {
        let exhausted = rate_limit.as_ref().map_or(false, |r| r.remaining == 0);
        let kind = if exhausted && (status == 403 || status == 429) {
            GitHubErrorKind::PrimaryRateLimitExceeded
        } else {
            Self::kind_from_status(status)
        };

        let mut error = Self::new(kind, body.message)
            .with_status(status)
            .with_details(body.errors);

        if let Some(url) = body.documentation_url {
            error = error.with_documentation_url(url);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }
        if let Some(info) = rate_limit {
            error = error.with_rate_limit(info);
        }

        error
    }

    /// Maps HTTP status code to error kind.
    fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            400 => GitHubErrorKind::ValidationError,
            401 => GitHubErrorKind::BadCredentials,
            403 => GitHubErrorKind::Forbidden,
            404 => GitHubErrorKind::NotFound,
            409 => GitHubErrorKind::Conflict,
            410 => GitHubErrorKind::Gone,
            422 => GitHubErrorKind::UnprocessableEntity,
            429 => GitHubErrorKind::SecondaryRateLimitExceeded,
            500 => GitHubErrorKind::InternalError,
            502 => GitHubErrorKind::BadGateway,
            503 => GitHubErrorKind::ServiceUnavailable,
            _ => GitHubErrorKind::Unknown,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Timeout, message)
    }

    /// Creates a cancellation error.
    pub fn cancelled() -> Self {
        Self::new(GitHubErrorKind::Cancelled, "Request cancelled")
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::DeserializationError, message)
    }

    /// Creates a Link header parse error.
    pub fn malformed_link(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::MalformedLinkHeader, message)
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(e: reqwest::Error) -> Self {
        let error = if e.is_timeout() {
            GitHubError::timeout(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            GitHubError::new(
                GitHubErrorKind::ConnectionFailed,
                format!("Connection failed: {}", e),
            )
        } else {
            GitHubError::new(
                GitHubErrorKind::TransportError,
                format!("Request failed: {}", e),
            )
        };
        error.with_cause(e)
    }
}
