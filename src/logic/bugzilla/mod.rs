//! Bugzilla Module
//!
//! Bug retrieval for the nag checks.
//!
//! ## Structure
//! - `types`: Bug record, query params, REST responses
//! - `client`: blocking REST client

pub mod client;
pub mod types;

pub use client::{BugzillaClient, BugzillaConfig};
pub use types::{Bug, BzParams};

use crate::error::NagResult;

/// Anything that can hand out bugs for a nag run
pub trait BugSource {
    /// Bugs matching the query params
    fn search(&self, params: &BzParams) -> NagResult<Vec<Bug>>;

    /// Bugs with the given ids; an empty list yields no bugs
    fn get_bugs(&self, ids: &[u64]) -> NagResult<Vec<Bug>>;
}
