//! Entry point for building statements against one connection.

use super::bulk::{DeleteClause, UpdateClause};
use super::path::EntityPath;
use super::projection::Projection;
use super::select::Query;
use rusqlite::Connection;

/// Statement factory bound to a migrated connection.
///
/// Cheap to copy; every statement it creates borrows the same connection.
#[derive(Clone, Copy)]
pub struct QueryFactory<'c> {
    conn: &'c Connection,
}

impl<'c> QueryFactory<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// `SELECT projection`; add sources with `from`.
    pub fn select<P: Projection>(&self, projection: P) -> Query<'c, P> {
        Query::new(self.conn, projection)
    }

    /// `SELECT entity FROM entity`.
    pub fn select_from<E>(&self, entity: &E) -> Query<'c, E>
    where
        E: Projection + EntityPath + Clone,
    {
        Query::new(self.conn, entity.clone()).from(entity)
    }

    pub fn update(&self, target: &impl EntityPath) -> UpdateClause<'c> {
        UpdateClause::new(self.conn, target)
    }

    pub fn delete(&self, target: &impl EntityPath) -> DeleteClause<'c> {
        DeleteClause::new(self.conn, target)
    }
}
