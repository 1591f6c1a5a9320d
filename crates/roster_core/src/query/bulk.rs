//! Set-based `UPDATE` and `DELETE` statements.
//!
//! Bulk statements go straight to storage. Entities read before the
//! statement keep their old field values; re-read them to observe the
//! change. A statement touching zero rows is a normal outcome and returns
//! `Ok(0)`.

use super::error::{QueryError, QueryResult};
use super::expr::{ColumnName, Operand, TypedExpr};
use super::path::{EntityPath, TableAlias};
use super::predicate::Predicate;
use log::info;
use rusqlite::Connection;
use sea_query::{Alias, DeleteStatement, SimpleExpr, SqliteQueryBuilder, UpdateStatement};
use sea_query_rusqlite::RusqliteBinder;
use std::time::Instant;

#[derive(Debug, Clone)]
struct Assignment {
    column: Option<ColumnName>,
    path: SimpleExpr,
    value: SimpleExpr,
}

/// `UPDATE target SET … [WHERE …]`.
pub struct UpdateClause<'c> {
    conn: &'c Connection,
    target: TableAlias,
    assignments: Vec<Assignment>,
    filter: Option<Predicate>,
}

impl<'c> UpdateClause<'c> {
    pub(crate) fn new(conn: &'c Connection, target: &impl EntityPath) -> Self {
        Self {
            conn,
            target: target.table_ref(),
            assignments: Vec::new(),
            filter: None,
        }
    }

    /// Assigns `value` (literal, expression or subquery) to the `path` column.
    pub fn set<T>(mut self, path: &TypedExpr<T>, value: impl Into<Operand>) -> Self {
        self.assignments.push(Assignment {
            column: path.column_name(),
            path: path.expr().clone(),
            value: value.into().into_expr(),
        });
        self
    }

    /// Assigns SQL `NULL` to the `path` column.
    pub fn set_null<T>(self, path: &TypedExpr<Option<T>>) -> Self {
        self.set(path, Operand::null())
    }

    pub fn where_(mut self, condition: Predicate) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }

    pub fn where_opt(self, condition: Option<Predicate>) -> Self {
        match condition {
            Some(condition) => self.where_(condition),
            None => self,
        }
    }

    /// Executes the statement and returns the number of rows changed.
    ///
    /// # Errors
    /// - [`QueryError::EmptyUpdate`] when no column was assigned.
    /// - [`QueryError::InvalidUpdateTarget`] when an assigned path is not a
    ///   column of the update target.
    pub fn execute(&self) -> QueryResult<usize> {
        let started_at = Instant::now();
        let (sql, values) = self.statement()?.build_rusqlite(SqliteQueryBuilder);
        let affected = self.conn.execute(&sql, &*values.as_params())?;
        info!(
            "event=bulk_update module=query status=ok table={} affected={} duration_ms={}",
            self.target.table,
            affected,
            started_at.elapsed().as_millis()
        );
        Ok(affected)
    }

    pub fn to_sql(&self) -> QueryResult<String> {
        Ok(self.statement()?.build_rusqlite(SqliteQueryBuilder).0)
    }

    fn statement(&self) -> QueryResult<UpdateStatement> {
        if self.assignments.is_empty() {
            return Err(QueryError::EmptyUpdate);
        }

        let mut statement = UpdateStatement::new();
        statement.table(self.target.to_table_ref());
        for assignment in &self.assignments {
            let column = match assignment.column {
                Some(column) if column.alias == self.target.alias => column.column,
                _ => {
                    return Err(QueryError::InvalidUpdateTarget {
                        target: self.target.alias,
                        expr: format!("{:?}", assignment.path),
                    })
                }
            };
            statement.value(Alias::new(column), assignment.value.clone());
        }
        if let Some(filter) = self.filter.clone() {
            statement.cond_where(filter.into_condition());
        }
        Ok(statement)
    }
}

/// `DELETE FROM target [WHERE …]`.
pub struct DeleteClause<'c> {
    conn: &'c Connection,
    target: TableAlias,
    filter: Option<Predicate>,
}

impl<'c> DeleteClause<'c> {
    pub(crate) fn new(conn: &'c Connection, target: &impl EntityPath) -> Self {
        Self {
            conn,
            target: target.table_ref(),
            filter: None,
        }
    }

    pub fn where_(mut self, condition: Predicate) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }

    pub fn where_opt(self, condition: Option<Predicate>) -> Self {
        match condition {
            Some(condition) => self.where_(condition),
            None => self,
        }
    }

    /// Executes the statement and returns the number of rows deleted.
    pub fn execute(&self) -> QueryResult<usize> {
        let started_at = Instant::now();
        let (sql, values) = self.statement().build_rusqlite(SqliteQueryBuilder);
        let affected = self.conn.execute(&sql, &*values.as_params())?;
        info!(
            "event=bulk_delete module=query status=ok table={} affected={} duration_ms={}",
            self.target.table,
            affected,
            started_at.elapsed().as_millis()
        );
        Ok(affected)
    }

    pub fn to_sql(&self) -> String {
        self.statement().build_rusqlite(SqliteQueryBuilder).0
    }

    fn statement(&self) -> DeleteStatement {
        let mut statement = DeleteStatement::new();
        statement.from_table(self.target.to_table_ref());
        if let Some(filter) = self.filter.clone() {
            statement.cond_where(filter.into_condition());
        }
        statement
    }
}
