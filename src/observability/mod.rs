//! Observability: tracing hooks, request metrics and debug dumps.

use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// `tracing` target used for request/response dumps.
pub const DUMP_TARGET: &str = "integrations_github_issues::dump";

/// Metrics collector for GitHub API operations.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_failed: AtomicU64,
    pages_fetched: AtomicU64,
    latency_total_us: AtomicU64,
    latency_count: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful request.
    pub fn record_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed request.
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a decoded page.
    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records request latency.
    pub fn record_latency(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.latency_total_us.fetch_add(us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the average latency in microseconds.
    pub fn average_latency_us(&self) -> u64 {
        let total = self.latency_total_us.load(Ordering::Relaxed);
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            average_latency_us: self.average_latency_us(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total requests.
    pub requests_total: u64,
    /// Requests answered with a success status.
    pub requests_success: u64,
    /// Requests that failed in transport or with an error status.
    pub requests_failed: u64,
    /// Pages decoded by listings.
    pub pages_fetched: u64,
    /// Average latency in microseconds.
    pub average_latency_us: u64,
}

/// Request timer for measuring latency.
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<Metrics>,
}

impl RequestTimer {
    /// Creates a new request timer.
    pub fn new(metrics: Arc<Metrics>) -> Self {
        metrics.record_request();
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Records success and latency.
    pub fn success(self) -> Duration {
        self.metrics.record_success();
        self.finish()
    }

    /// Records failure and latency.
    pub fn failure(self) -> Duration {
        self.metrics.record_failure();
        self.finish()
    }

    fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.metrics.record_latency(elapsed);
        elapsed
    }
}

/// Tracing hooks for GitHub API operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of an API request.
    pub fn on_request_start(method: &Method, url: &str) {
        debug!(method = %method, url = %url, "GitHub API request started");
    }

    /// Logs the completion of an API request.
    pub fn on_request_complete(method: &Method, url: &str, status: u16, duration: Duration) {
        debug!(
            method = %method,
            url = %url,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "GitHub API request completed"
        );
    }

    /// Logs a request error.
    pub fn on_request_error(method: &Method, url: &str, error: &dyn std::fmt::Display) {
        warn!(method = %method, url = %url, error = %error, "GitHub API request failed");
    }

    /// Logs a request that leaves the API origin and goes out without credentials.
    pub fn on_foreign_origin(method: &Method, url: &str) {
        warn!(method = %method, url = %url, "Request outside the API origin, credentials withheld");
    }

    /// Logs a fetched page.
    pub fn on_page_fetched(path: &str, page: u32, items: usize, has_next: bool) {
        debug!(path = %path, page, items, has_next, "Fetched page");
    }

    /// Logs the end of a listing.
    pub fn on_pagination_complete(pages: u32, items: usize) {
        debug!(pages, items, "Pagination complete");
    }

    /// Logs a successful token exchange.
    pub fn on_login(username: &str, token_prefix: &str) {
        info!(username = %username, token = %token_prefix, "Exchanged credentials for token");
    }
}

/// Sensitive headers that should be redacted in logs.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-github-token",
    "x-access-token",
    "cookie",
    "set-cookie",
];

/// Redacts sensitive values in headers.
pub fn redact_header(name: &str, value: &str) -> String {
    if SENSITIVE_HEADERS.contains(&name.to_lowercase().as_str()) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

/// JSON body fields whose values are redacted in logs.
pub const SENSITIVE_FIELDS: &[&str] = &["token", "hashed_token", "client_secret", "password"];

/// Renders a body for logging with sensitive JSON fields redacted.
///
/// Bodies that are not JSON are rendered as lossy UTF-8.
pub fn redact_body(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            redact_value(&mut value);
            value.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.to_lowercase().as_str()) {
                    *field = Value::String("[REDACTED]".to_string());
                } else {
                    redact_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<binary>");
            format!("{}: {}", name, redact_header(name.as_str(), value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dumps an outgoing request at debug level.
pub fn dump_request(request: &Request) {
    let body = request
        .body()
        .and_then(|b| b.as_bytes())
        .map(redact_body)
        .unwrap_or_default();

    debug!(
        target: DUMP_TARGET,
        "{} {}\n{}\n\n{}",
        request.method(),
        request.url(),
        format_headers(request.headers()),
        body
    );
}

/// Dumps a received response at debug level.
pub fn dump_response(status: StatusCode, headers: &HeaderMap, body: &[u8]) {
    debug!(
        target: DUMP_TARGET,
        "HTTP {}\n{}\n\n{}",
        status,
        format_headers(headers),
        redact_body(body)
    );
}
