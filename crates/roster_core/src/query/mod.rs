//! Typed query layer over the member/team schema.
//!
//! # Responsibility
//! - Build `sea_query` `SELECT`, `UPDATE` and `DELETE` statements from
//!   aliased paths (`QMember`, `QTeam`) and typed expressions.
//! - Execute them on a borrowed rusqlite connection via
//!   `sea-query-rusqlite` and decode rows into entities, scalars, tuples
//!   or DTOs.
//!
//! # Invariants
//! - Runtime values only ever reach SQL as bound parameters.
//! - An absent filter (`None`) never renders a `WHERE` clause.

pub mod bulk;
pub mod error;
pub mod expr;
pub mod factory;
pub mod path;
pub mod predicate;
pub mod projection;
pub mod select;

pub use bulk::{DeleteClause, UpdateClause};
pub use error::{QueryError, QueryResult};
pub use expr::{
    constant, sql_function, CaseBuilder, ColumnName, NullOrdering, Operand, OrderDirection,
    OrderSpecifier, SelectItem, TypedExpr,
};
pub use factory::QueryFactory;
pub use path::{EntityPath, NullableTeam, QMember, QTeam, TeamAssociation, MEMBER, TEAM};
pub use predicate::{all_of, any_of, BooleanBuilder, Predicate};
pub use projection::{FetchedMember, Projection};
pub use select::{sub_select, Query, QueryResults, QuerySpec, SubQuery};
