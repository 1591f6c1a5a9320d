//! Member/Team domain model.
//!
//! # Responsibility
//! - Define the two persisted records and their association.
//! - Validate entity state before it reaches storage.
//!
//! # Invariants
//! - Ownership is one-directional: a `Member` points at its `Team` through
//!   `TeamRef`; a `Team` never stores its members.
//! - An `id` of `None` means the entity has not been persisted yet.

pub mod member;
pub mod team;

/// Surrogate key type shared by persisted entities.
pub type EntityId = i64;
