//! API types shared between the assignment server and its clients.
//!
//! This crate contains:
//! - Row types (e.g., `User`, `PullRequest`) - the API representation of database entities
//! - Request types (e.g., `CreatePullRequestRequest`) - API input types
//! - Response wrappers and the shared error body

pub mod pull_request;
pub mod response;
pub mod stats;
pub mod team;
pub mod user;

pub use pull_request::*;
pub use response::*;
pub use stats::*;
pub use team::*;
pub use user::*;
