//! Query execution errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug)]
pub enum QueryError {
    Db(DbError),
    /// `fetch_one` matched more than one row.
    NonUniqueResult,
    /// An `UPDATE` assignment targets something other than a column of the
    /// updated table.
    InvalidUpdateTarget {
        target: &'static str,
        expr: String,
    },
    /// An `UPDATE` without any `set` call.
    EmptyUpdate,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NonUniqueResult => write!(f, "query expected one row but matched several"),
            Self::InvalidUpdateTarget { target, expr } => write!(
                f,
                "update of `{target}` can only assign its own columns, got {expr}"
            ),
            Self::EmptyUpdate => write!(f, "update statement has no assignments"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NonUniqueResult | Self::InvalidUpdateTarget { .. } | Self::EmptyUpdate => None,
        }
    }
}

impl From<DbError> for QueryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
