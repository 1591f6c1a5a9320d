//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the generic CRUD contract and the member/team repositories.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce entity validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod crud;
pub mod error;
pub mod member_repo;
pub mod team_repo;

pub use crud::CrudRepository;
pub use error::{RepoError, RepoResult};
pub use member_repo::{MemberRepository, SqliteMemberRepository};
pub use team_repo::{SqliteTeamRepository, TeamRepository};
