//! Member search entry points.
//!
//! # Responsibility
//! - Turn an optional-criteria search form into an optional predicate.
//! - Describe the page window of a paged search.
//!
//! # See also
//! - `repo::member_repo` for the queries that consume these types.

pub mod condition;
pub mod page;
