//! GitHub API client implementation.

use crate::auth::{AuthManager, LoginCredentials};
use crate::config::{GitHubConfig, GitHubConfigBuilder};
use crate::errors::{ErrorResponse, GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
use crate::observability::{dump_request, dump_response, Metrics, RequestTimer, TracingHooks};
use crate::pagination::{LinkRelations, Page, Paginator};
use crate::services::*;
use crate::types::Authorization;
use bytes::Bytes;
use chrono::DateTime;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How a single request authenticates.
#[derive(Clone, Copy)]
pub(crate) enum RequestAuth<'a> {
    /// Use the stored token, if any.
    Stored,
    /// HTTP basic auth, used by the token exchange.
    Basic {
        username: &'a str,
        password: &'a str,
    },
}

/// A fully read response.
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// GitHub API client.
///
/// Cheap to clone; clones share the connection pool, the stored token and
/// the metrics.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    config: Arc<GitHubConfig>,
    auth: Arc<AuthManager>,
    metrics: Arc<Metrics>,
    cancellation: Option<CancellationToken>,
}

impl GitHubClient {
    /// Creates a new GitHub client.
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        let auth = Arc::new(AuthManager::new(config.token.clone()));

        Ok(Self {
            http,
            config: Arc::new(config),
            auth,
            metrics: Arc::new(Metrics::new()),
            cancellation: None,
        })
    }

    /// Creates a client configured from the environment.
    pub fn from_env() -> GitHubResult<Self> {
        Self::new(GitHubConfig::from_env()?)
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Returns a handle whose requests abort with
    /// [`GitHubErrorKind::Cancelled`] once `token` is cancelled.
    ///
    /// The handle shares the stored token with `self`.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self.clone()
        }
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        self.config.api_root()
    }

    /// Gets the configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Gets the authentication state.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Gets the request metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Returns true once a token is available.
    pub async fn is_authenticated(&self) -> bool {
        self.auth.has_token().await
    }

    /// Exchanges credentials for a token and stores it for later requests.
    pub async fn login(&self, credentials: &LoginCredentials) -> GitHubResult<Authorization> {
        self.authorizations().login(credentials).await
    }

    // Service accessors

    /// Gets the issues service.
    pub fn issues(&self) -> IssuesService<'_> {
        IssuesService::new(self)
    }

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService<'_> {
        RepositoriesService::new(self)
    }

    /// Gets the users service.
    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    /// Gets the pull requests service.
    pub fn pull_requests(&self) -> PullRequestsService<'_> {
        PullRequestsService::new(self)
    }

    /// Gets the authorizations service.
    pub fn authorizations(&self) -> AuthorizationsService<'_> {
        AuthorizationsService::new(self)
    }

    // HTTP methods

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> GitHubResult<T> {
        self.request(Method::GET, path, Option::<&()>::None, RequestAuth::Stored)
            .await
    }

    /// Makes a GET request with query parameters.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
    ) -> GitHubResult<T> {
        let path = path_with_query(path, params)?;
        self.get(&path).await
    }

    /// Makes a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> GitHubResult<T> {
        self.request(Method::POST, path, Some(body), RequestAuth::Stored)
            .await
    }

    /// Makes a PUT request.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> GitHubResult<T> {
        self.request(Method::PUT, path, Some(body), RequestAuth::Stored)
            .await
    }

    /// Makes a PUT request authenticated with HTTP basic auth instead of the
    /// stored token.
    pub(crate) async fn put_with_basic_auth<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        username: &str,
        password: &str,
    ) -> GitHubResult<T> {
        self.request(
            Method::PUT,
            path,
            Some(body),
            RequestAuth::Basic { username, password },
        )
        .await
    }

    // Pagination

    /// Fetches a single page of a collection and its pagination links.
    pub async fn get_page<T: DeserializeOwned>(&self, path: &str) -> GitHubResult<Page<T>> {
        let raw = self
            .send(Method::GET, path, Option::<&()>::None, RequestAuth::Stored)
            .await?;
        let items: Vec<T> = decode(&raw)?;
        let links = LinkRelations::from_headers(&raw.headers, self.base_url())?;
        self.metrics.record_page();

        Ok(Page::new(items, links))
    }

    /// Returns a paginator over the collection at `path`.
    pub fn paginate<T: DeserializeOwned>(&self, path: impl Into<String>) -> Paginator<'_, T> {
        Paginator::new(self, path)
    }

    /// Fetches every page of the collection at `path`, following `next`
    /// links until none remain.
    ///
    /// Items are returned in page order, then server order within a page. Any
    /// failure aborts the listing and no partial result is returned.
    pub async fn get_all<T: DeserializeOwned>(&self, path: &str) -> GitHubResult<Vec<T>> {
        self.paginate(path).collect_all().await
    }

    /// Like [`get_all`](Self::get_all), with query parameters on the first
    /// request.
    pub async fn get_all_with_params<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
    ) -> GitHubResult<Vec<T>> {
        let path = path_with_query(path, params)?;
        self.get_all(&path).await
    }

    // Internal methods

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: RequestAuth<'_>,
    ) -> GitHubResult<T> {
        let raw = self.send(method, path, body, auth).await?;
        decode(&raw)
    }

    /// Sends a request and reads the whole response.
    ///
    /// Non-success statuses are turned into errors here.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: RequestAuth<'_>,
    ) -> GitHubResult<RawResponse> {
        let url = self.build_url(path)?;

        let body_bytes = body.map(serde_json::to_vec).transpose().map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidParameter,
                format!("Failed to serialize request body: {}", e),
            )
            .with_cause(e)
        })?;

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, &self.config.accept)
            .header(USER_AGENT, &self.config.user_agent);

        let same_origin = self.is_api_origin(&url);
        if !same_origin {
            TracingHooks::on_foreign_origin(&method, &url);
        }

        builder = match auth {
            _ if !same_origin => builder,
            RequestAuth::Stored => match self.auth.auth_header().await {
                Some(value) => builder.header(AUTHORIZATION, value),
                None => builder,
            },
            RequestAuth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        };

        if let Some(bytes) = body_bytes {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        let request = builder.build().map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidParameter,
                format!("Failed to build request: {}", e),
            )
            .with_cause(e)
        })?;

        if self.config.debug {
            dump_request(&request);
        }

        TracingHooks::on_request_start(&method, &url);
        let timer = RequestTimer::new(self.metrics.clone());

        let result = self
            .cancellable(async {
                let response = self.http.execute(request).await?;
                let status = response.status();
                let headers = response.headers().clone();
                let body = response.bytes().await?;
                Ok::<_, GitHubError>(RawResponse {
                    status,
                    headers,
                    body,
                })
            })
            .await;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                timer.failure();
                TracingHooks::on_request_error(&method, &url, &e);
                return Err(e);
            }
        };

        if self.config.debug {
            dump_response(raw.status, &raw.headers, &raw.body);
        }

        if !raw.status.is_success() {
            timer.failure();
            let error = error_from_response(&raw);
            TracingHooks::on_request_error(&method, &url, &error);
            return Err(error);
        }

        let elapsed = timer.success();
        TracingHooks::on_request_complete(&method, &url, raw.status.as_u16(), elapsed);
        Ok(raw)
    }

    /// Races `fut` against the cancellation token, if one is attached.
    async fn cancellable<T, F>(&self, fut: F) -> GitHubResult<T>
    where
        F: Future<Output = GitHubResult<T>>,
    {
        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(GitHubError::cancelled()),
                    result = fut => result,
                }
            }
            None => fut.await,
        }
    }

    /// Returns true when `url` shares scheme, host and port with the base URL.
    ///
    /// Credentials are only ever sent to this origin.
    fn is_api_origin(&self, url: &str) -> bool {
        match (url::Url::parse(url), url::Url::parse(self.config.api_root())) {
            (Ok(target), Ok(api)) => target.origin() == api.origin(),
            _ => false,
        }
    }

    /// Resolves a path against the base URL. Absolute URLs pass through.
    fn build_url(&self, path: &str) -> GitHubResult<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }
        let base = self.config.api_root();
        let path = path.trim_start_matches('/');
        Ok(format!("{}/{}", base, path))
    }
}

/// Appends URL-encoded query parameters to a path.
pub(crate) fn path_with_query<P: Serialize + ?Sized>(path: &str, params: &P) -> GitHubResult<String> {
    let query = serde_urlencoded::to_string(params).map_err(|e| {
        GitHubError::new(
            GitHubErrorKind::InvalidParameter,
            format!("Failed to serialize parameters: {}", e),
        )
        .with_cause(e)
    })?;

    if query.is_empty() {
        Ok(path.to_string())
    } else {
        let separator = if path.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", path, separator, query))
    }
}

fn decode<T: DeserializeOwned>(raw: &RawResponse) -> GitHubResult<T> {
    serde_json::from_slice(&raw.body).map_err(|e| {
        GitHubError::deserialization(format!("Failed to deserialize response: {}", e))
            .with_status(raw.status.as_u16())
            .with_cause(e)
    })
}

fn error_from_response(raw: &RawResponse) -> GitHubError {
    let status = raw.status.as_u16();
    let request_id = raw
        .headers
        .get("x-github-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let rate_limit = extract_rate_limit(&raw.headers);

    match serde_json::from_slice::<ErrorResponse>(&raw.body) {
        Ok(body) => GitHubError::from_response(status, body, request_id, rate_limit),
        Err(e) => {
            let mut error = GitHubError::deserialization(format!(
                "Failed to decode error response for HTTP {}: {}",
                status, e
            ))
            .with_status(status)
            .with_cause(e);
            if let Some(id) = request_id {
                error = error.with_request_id(id);
            }
            error
        }
    }
}

fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let limit = header("x-ratelimit-limit")?.parse().ok()?;
    let remaining = header("x-ratelimit-remaining")?.parse().ok()?;
    let reset_timestamp: i64 = header("x-ratelimit-reset")?.parse().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo {
        limit,
        remaining,
        reset_at,
        retry_after: header("retry-after").and_then(|v| v.parse().ok()),
        resource: header("x-ratelimit-resource").map(String::from),
    })
}

/// Builder for GitHubClient.
pub struct GitHubClientBuilder {
    config_builder: GitHubConfigBuilder,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: GitHubConfig::builder(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.token(token);
        self
    }

    /// Sets the `Accept` media type.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.accept(accept);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets the scopes requested at login.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_builder = self.config_builder.scopes(scopes);
        self
    }

    /// Sets the base branch for pull requests created from issues.
    pub fn default_base_branch(mut self, branch: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.default_base_branch(branch);
        self
    }

    /// Sets the page ceiling for listings.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config_builder = self.config_builder.max_pages(max_pages);
        self
    }

    /// Removes the page ceiling.
    pub fn unbounded_pagination(mut self) -> Self {
        self.config_builder = self.config_builder.unbounded_pagination();
        self
    }

    /// Enables request/response dumps.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config_builder = self.config_builder.debug(debug);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        let config = self.config_builder.build()?;
        GitHubClient::new(config)
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
