//! # GitHub Issues Client
//!
//! An async GitHub REST client for issues, comments, labels, assignees,
//! repositories and users, with:
//! - Automatic `Link` header pagination (`rel="next"` is followed to the end)
//! - Token authentication and a basic-auth login exchange
//! - Pull request creation from issues
//! - Typed errors carrying the HTTP status and upstream error body
//! - `tracing` instrumentation and request metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_github_issues::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::builder()
//!         .token("ghp_xxxxxxxxxxxx")
//!         .build()?;
//!
//!     // Every page is fetched before this returns.
//!     let issues = client.issues().list("rust-lang", "rust").await?;
//!     for issue in issues.iter().filter(|i| i.has_label("epic")) {
//!         println!("#{} {}", issue.number, issue.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(elided_lifetimes_in_paths)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP client and transport
pub mod client;

// Pagination handling
pub mod pagination;

// API Services
pub mod services;

// Observability
pub mod observability;

// Re-exports for convenience
pub use auth::{AuthManager, LoginCredentials};
pub use client::{GitHubClient, GitHubClientBuilder};
pub use config::{GitHubConfig, GitHubConfigBuilder};
pub use errors::{ApiErrorDetail, GitHubError, GitHubErrorKind, GitHubResult};
pub use pagination::{LinkRelations, Page, PaginationParams, Paginator};
pub use tokio_util::sync::CancellationToken;
pub use types::*;
