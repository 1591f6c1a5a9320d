//! Repository error type shared by member and team repositories.

use crate::db::DbError;
use crate::model::member::MemberValidationError;
use crate::model::team::TeamValidationError;
use crate::model::EntityId;
use crate::query::error::QueryError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    InvalidMember(MemberValidationError),
    InvalidTeam(TeamValidationError),
    Db(DbError),
    Query(QueryError),
    /// Update or delete of an id that has no row.
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMember(err) => write!(f, "{err}"),
            Self::InvalidTeam(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "roster repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMember(err) => Some(err),
            Self::InvalidTeam(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<MemberValidationError> for RepoError {
    fn from(value: MemberValidationError) -> Self {
        Self::InvalidMember(value)
    }
}

impl From<TeamValidationError> for RepoError {
    fn from(value: TeamValidationError) -> Self {
        Self::InvalidTeam(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        match value {
            QueryError::Db(err) => Self::Db(err),
            other => Self::Query(other),
        }
    }
}
