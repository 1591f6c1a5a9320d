//! Generic CRUD contract and connection readiness checks.

use super::error::{RepoError, RepoResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::EntityId;
use rusqlite::Connection;

/// Create/read/update/delete by surrogate id.
///
/// # Contract
/// - `save` inserts when the entity has no id and updates otherwise; it
///   returns the entity with its id assigned.
/// - Missing lookups return `Ok(None)`; `delete_by_id` of a missing id
///   returns [`RepoError::NotFound`].
pub trait CrudRepository<E> {
    fn save(&self, entity: &E) -> RepoResult<E>;
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<E>>;
    fn find_all(&self) -> RepoResult<Vec<E>>;
    fn count(&self) -> RepoResult<u64>;
    fn exists_by_id(&self, id: EntityId) -> RepoResult<bool>;
    fn delete_by_id(&self, id: EntityId) -> RepoResult<()>;
}

/// Rejects connections that were not migrated to the latest schema.
pub(crate) fn ensure_schema_version(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Rejects connections where `table` or one of its `columns` is missing.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Converts a `COUNT(*)`-style value into `u64`.
pub(crate) fn count_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative count {value}")))
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema_version, ensure_table_ready};
    use crate::db::open_db_in_memory;
    use crate::repo::error::RepoError;
    use rusqlite::Connection;

    #[test]
    fn migrated_connection_is_ready() {
        let conn = open_db_in_memory().unwrap();
        ensure_schema_version(&conn).unwrap();
        ensure_table_ready(&conn, "members", &["member_id", "team_id"]).unwrap();
    }

    #[test]
    fn raw_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = ensure_schema_version(&conn).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        let conn = open_db_in_memory().unwrap();
        let err = ensure_table_ready(&conn, "teams", &["motto"]).unwrap_err();
        assert!(matches!(
            err,
            RepoError::MissingRequiredColumn {
                table: "teams",
                column: "motto"
            }
        ));
    }
}
