//! Core domain logic for the member/team roster.
//! This crate is the single source of truth for schema, queries and
//! business invariants.

pub mod app;
pub mod db;
pub mod dto;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod search;
pub mod service;

pub use app::{App, AppConfig, AppError};
pub use dto::{MemberDto, MemberTeamDto, QMemberDto, UserDto};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberId, MemberValidationError, TeamRef};
pub use model::team::{Team, TeamId, TeamValidationError};
pub use query::{QueryError, QueryFactory, QueryResult};
pub use repo::{
    CrudRepository, MemberRepository, RepoError, RepoResult, SqliteMemberRepository,
    SqliteTeamRepository, TeamRepository,
};
pub use search::condition::MemberSearchCondition;
pub use search::page::PageRequest;
pub use service::roster_service::RosterService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
