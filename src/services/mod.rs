//! GitHub API service implementations.

mod authorizations;
mod issues;
mod pull_requests;
mod repositories;
mod users;

pub use authorizations::*;
pub use issues::*;
pub use pull_requests::*;
pub use repositories::*;
pub use users::*;
