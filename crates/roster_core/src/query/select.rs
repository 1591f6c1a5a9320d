//! `SELECT` statements: builder, subqueries and fetch operations.
//!
//! # Responsibility
//! - Accumulate sources, joins, filters, grouping, ordering and paging, then
//!   lower them to a `sea_query::SelectStatement`.
//! - Execute against a borrowed connection through `sea-query-rusqlite`
//!   and decode rows through a [`Projection`].
//!
//! # Invariants
//! - Repeated `where_` calls are ANDed; `None` filters are skipped.
//! - `fetch_one` never returns an arbitrary row out of several.
//! - `fetch_count` ignores ordering and paging.

use super::error::{QueryError, QueryResult};
use super::expr::{subquery_expr, OrderSpecifier, SelectItem, TypedExpr};
use super::path::{EntityPath, QMember, QTeam, TableAlias, TeamAssociation};
use super::predicate::{all_of, Predicate};
use super::projection::{FetchedMember, Projection};
use log::debug;
use rusqlite::Connection;
use sea_query::{
    Alias, Asterisk, Cond, Expr, Func, JoinType, SelectStatement, SimpleExpr, SqliteQueryBuilder,
};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::time::Instant;

/// `LIMIT` used when only an offset is given; SQLite needs both.
const UNBOUNDED_LIMIT: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    fn to_join_type(self) -> JoinType {
        match self {
            Self::Inner => JoinType::InnerJoin,
            Self::Left => JoinType::LeftJoin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) target: TableAlias,
    pub(crate) on: Option<Predicate>,
}

/// Statement parts shared by queries and subqueries.
///
/// Kept separately from `SelectStatement` so that `on` can still extend the
/// last join and `fetch_count` can drop paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub(crate) select: Vec<SelectItem>,
    pub(crate) distinct: bool,
    pub(crate) from: Vec<TableAlias>,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<Predicate>,
    pub(crate) group_by: Vec<SimpleExpr>,
    pub(crate) having: Option<Predicate>,
    pub(crate) order_by: Vec<OrderSpecifier>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl QuerySpec {
    fn add_filter(&mut self, condition: Predicate) {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
    }

    fn add_having(&mut self, condition: Predicate) {
        self.having = Some(match self.having.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
    }

    fn add_join(&mut self, kind: JoinKind, target: TableAlias, on: Option<Predicate>) {
        self.joins.push(Join { kind, target, on });
    }

    /// ANDs `condition` into the last join's `ON`, or into `WHERE` when
    /// there is no join yet.
    fn add_join_condition(&mut self, condition: Predicate) {
        match self.joins.last_mut() {
            Some(join) => {
                join.on = Some(match join.on.take() {
                    Some(current) => current.and(condition),
                    None => condition,
                });
            }
            None => self.add_filter(condition),
        }
    }

    /// Same statement without ordering and paging, for counting.
    fn unpaged(&self) -> QuerySpec {
        QuerySpec {
            order_by: Vec::new(),
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    pub(crate) fn to_statement(&self) -> SelectStatement {
        let mut statement = SelectStatement::new();
        if self.distinct {
            statement.distinct();
        }
        for item in &self.select {
            match item.alias {
                Some(alias) => statement.expr_as(item.expr.clone(), Alias::new(alias)),
                None => statement.expr(item.expr.clone()),
            };
        }
        for source in &self.from {
            statement.from(source.to_table_ref());
        }
        for join in &self.joins {
            let on = join
                .on
                .clone()
                .map(Predicate::into_condition)
                .unwrap_or_else(Cond::all);
            statement.join(join.kind.to_join_type(), join.target.to_table_ref(), on);
        }
        if let Some(filter) = self.filter.clone() {
            statement.cond_where(filter.into_condition());
        }
        if !self.group_by.is_empty() {
            statement.add_group_by(self.group_by.clone());
        }
        if let Some(having) = self.having.clone() {
            statement.cond_having(having.into_condition());
        }
        for order in &self.order_by {
            let direction = order.direction.to_order();
            match order.nulls.to_sea() {
                Some(nulls) => {
                    statement.order_by_expr_with_nulls(order.expr.clone(), direction, nulls)
                }
                None => statement.order_by_expr(order.expr.clone(), direction),
            };
        }
        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                statement.limit(limit);
                if let Some(offset) = offset.filter(|offset| *offset > 0) {
                    statement.offset(offset);
                }
            }
            (None, Some(offset)) if offset > 0 => {
                statement.limit(UNBOUNDED_LIMIT).offset(offset);
            }
            (None, _) => {}
        }
        statement
    }

    /// `SELECT COUNT(*) FROM (<unpaged statement>) AS "counted"`.
    fn to_count_statement(&self) -> SelectStatement {
        let mut statement = SelectStatement::new();
        statement
            .expr(SimpleExpr::from(Func::count(Expr::col(Asterisk))))
            .from_subquery(self.unpaged().to_statement(), Alias::new("counted"));
        statement
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults<T> {
    pub total: u64,
    pub offset: u64,
    pub limit: Option<u64>,
    pub results: Vec<T>,
}

impl<T> QueryResults<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether rows exist beyond this page.
    pub fn has_next(&self) -> bool {
        self.offset + (self.results.len() as u64) < self.total
    }

    /// Converts every row, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryResults<U> {
        QueryResults {
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Executable `SELECT` bound to a connection, decoding rows via `P`.
pub struct Query<'c, P> {
    conn: &'c Connection,
    spec: QuerySpec,
    projection: P,
}

impl<'c, P: Projection> Query<'c, P> {
    pub(crate) fn new(conn: &'c Connection, projection: P) -> Self {
        let spec = QuerySpec {
            select: projection.expressions(),
            ..QuerySpec::default()
        };
        Self {
            conn,
            spec,
            projection,
        }
    }

    /// Adds a source. Several sources form a cross (theta) join filtered by
    /// `where_`.
    pub fn from(mut self, source: &impl EntityPath) -> Self {
        self.spec.from.push(source.table_ref());
        self
    }

    /// Inner join along the member → team association.
    pub fn join(mut self, association: TeamAssociation, team: &QTeam) -> Self {
        self.spec.add_join(
            JoinKind::Inner,
            team.table_ref(),
            Some(association.join_condition(team)),
        );
        self
    }

    /// Left outer join along the member → team association.
    ///
    /// Team columns are NULL for members without a team; project them
    /// through `team.nullable()` so they decode as `Option`.
    pub fn left_join(mut self, association: TeamAssociation, team: &QTeam) -> Self {
        self.spec.add_join(
            JoinKind::Left,
            team.table_ref(),
            Some(association.join_condition(team)),
        );
        self
    }

    /// Inner join on an unrelated entity; supply the condition with [`Self::on`].
    pub fn join_entity(mut self, target: &impl EntityPath) -> Self {
        self.spec.add_join(JoinKind::Inner, target.table_ref(), None);
        self
    }

    /// Left outer join on an unrelated entity; supply the condition with [`Self::on`].
    ///
    /// Unmatched rows carry NULL in every column of `target`.
    pub fn left_join_entity(mut self, target: &impl EntityPath) -> Self {
        self.spec.add_join(JoinKind::Left, target.table_ref(), None);
        self
    }

    /// Adds `condition` to the `ON` clause of the most recent join.
    ///
    /// Without a preceding join the condition is added to `WHERE`.
    pub fn on(mut self, condition: Predicate) -> Self {
        self.spec.add_join_condition(condition);
        self
    }

    pub fn where_(mut self, condition: Predicate) -> Self {
        self.spec.add_filter(condition);
        self
    }

    /// `None` leaves the filter unchanged.
    pub fn where_opt(mut self, condition: Option<Predicate>) -> Self {
        if let Some(condition) = condition {
            self.spec.add_filter(condition);
        }
        self
    }

    /// ANDs every present condition; absent ones are ignored.
    pub fn where_all<I>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Option<Predicate>>,
    {
        self.where_opt(all_of(conditions))
    }

    pub fn group_by<T>(mut self, expr: &TypedExpr<T>) -> Self {
        self.spec.group_by.push(expr.expr().clone());
        self
    }

    pub fn having(mut self, condition: Predicate) -> Self {
        self.spec.add_having(condition);
        self
    }

    /// Appends an ordering term; call repeatedly for secondary keys.
    pub fn order_by(mut self, order: OrderSpecifier) -> Self {
        self.spec.order_by.push(order);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.spec.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.spec.distinct = true;
        self
    }

    /// Rendered SQL text, with `?` placeholders for bound values.
    pub fn to_sql(&self) -> String {
        self.spec.to_statement().build_rusqlite(SqliteQueryBuilder).0
    }

    /// All matching rows.
    pub fn fetch(&self) -> QueryResult<Vec<P::Output>> {
        self.collect(&self.spec, None)
    }

    /// The single matching row, `None` when there is none.
    ///
    /// # Errors
    /// - [`QueryError::NonUniqueResult`] when more than one row matches.
    pub fn fetch_one(&self) -> QueryResult<Option<P::Output>> {
        let mut rows = self.collect(&self.spec, Some(2))?;
        if rows.len() > 1 {
            return Err(QueryError::NonUniqueResult);
        }
        Ok(rows.pop())
    }

    /// The first row (`LIMIT 1`), `None` when there is none.
    pub fn fetch_first(&self) -> QueryResult<Option<P::Output>> {
        let spec = QuerySpec {
            limit: Some(1),
            ..self.spec.clone()
        };
        Ok(self.collect(&spec, Some(1))?.into_iter().next())
    }

    /// Number of rows the query matches, ignoring `offset`/`limit`.
    pub fn fetch_count(&self) -> QueryResult<u64> {
        let started_at = Instant::now();
        let (sql, values) = self
            .spec
            .to_count_statement()
            .build_rusqlite(SqliteQueryBuilder);
        let count: i64 = self
            .conn
            .query_row(&sql, &*values.as_params(), |row| row.get(0))?;
        debug!(
            "event=query_count module=query status=ok count={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// The current page plus the unpaged total.
    pub fn fetch_page(&self) -> QueryResult<QueryResults<P::Output>> {
        let total = self.fetch_count()?;
        let results = self.fetch()?;
        Ok(QueryResults {
            total,
            offset: self.spec.offset.unwrap_or(0),
            limit: self.spec.limit,
            results,
        })
    }

    /// All rows converted into `D`.
    pub fn fetch_into<D: From<P::Output>>(&self) -> QueryResult<Vec<D>> {
        Ok(self.fetch()?.into_iter().map(D::from).collect())
    }

    fn collect(&self, spec: &QuerySpec, max_rows: Option<usize>) -> QueryResult<Vec<P::Output>> {
        let started_at = Instant::now();
        let (sql, values) = spec.to_statement().build_rusqlite(SqliteQueryBuilder);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(&*values.as_params())?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(self.projection.decode(row, 0)?);
            if max_rows.is_some_and(|max| results.len() >= max) {
                break;
            }
        }
        debug!(
            "event=query_fetch module=query status=ok rows={} duration_ms={}",
            results.len(),
            started_at.elapsed().as_millis()
        );
        Ok(results)
    }
}

impl<'c> Query<'c, QMember> {
    /// Inner-joins the team and loads it into each member (`TeamRef::Loaded`).
    pub fn join_fetch(self, association: TeamAssociation, team: &QTeam) -> Query<'c, FetchedMember> {
        self.into_fetched(team).join(association, team)
    }

    /// Left-joins the team and loads it when present; members without a
    /// team keep `team = None`.
    pub fn left_join_fetch(
        self,
        association: TeamAssociation,
        team: &QTeam,
    ) -> Query<'c, FetchedMember> {
        self.into_fetched(team).left_join(association, team)
    }

    fn into_fetched(self, team: &QTeam) -> Query<'c, FetchedMember> {
        let projection = FetchedMember::new(self.projection, *team);
        let spec = QuerySpec {
            select: projection.expressions(),
            ..self.spec
        };
        Query {
            conn: self.conn,
            spec,
            projection,
        }
    }
}

/// Subquery selecting a single expression of type `T`.
pub struct SubQuery<T> {
    spec: QuerySpec,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for SubQuery<T> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> Debug for SubQuery<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SubQuery").field(&self.spec).finish()
    }
}

impl<T> PartialEq for SubQuery<T> {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

/// Starts a subquery projecting `expr`.
///
/// Paths inside a subquery need their own alias when the outer query uses
/// the same table, e.g. `QMember::new("memberSub")`.
pub fn sub_select<T>(expr: TypedExpr<T>) -> SubQuery<T> {
    SubQuery {
        spec: QuerySpec {
            select: vec![expr.select_item()],
            ..QuerySpec::default()
        },
        _type: PhantomData,
    }
}

impl<T> SubQuery<T> {
    pub fn from(mut self, source: &impl EntityPath) -> Self {
        self.spec.from.push(source.table_ref());
        self
    }

    pub fn join(mut self, association: TeamAssociation, team: &QTeam) -> Self {
        self.spec.add_join(
            JoinKind::Inner,
            team.table_ref(),
            Some(association.join_condition(team)),
        );
        self
    }

    pub fn where_(mut self, condition: Predicate) -> Self {
        self.spec.add_filter(condition);
        self
    }

    pub fn where_opt(mut self, condition: Option<Predicate>) -> Self {
        if let Some(condition) = condition {
            self.spec.add_filter(condition);
        }
        self
    }

    pub fn group_by<U>(mut self, expr: &TypedExpr<U>) -> Self {
        self.spec.group_by.push(expr.expr().clone());
        self
    }

    pub fn having(mut self, condition: Predicate) -> Self {
        self.spec.add_having(condition);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    /// `EXISTS (subquery)`.
    pub fn exists(self) -> Predicate {
        Predicate::new(Expr::exists(self.into_statement()))
    }

    /// Scalar subquery usable as a select item or operand.
    pub fn into_expr(self) -> TypedExpr<T> {
        TypedExpr::new(subquery_expr(self))
    }

    /// Scalar subquery named in the select list.
    pub fn as_(self, alias: &'static str) -> TypedExpr<T> {
        self.into_expr().as_(alias)
    }

    pub(crate) fn into_statement(self) -> SelectStatement {
        self.spec.to_statement()
    }
}

#[cfg(test)]
mod tests {
    use super::{sub_select, QueryResults, QuerySpec};
    use crate::query::expr::CaseBuilder;
    use crate::query::path::{EntityPath, QMember, MEMBER, TEAM};
    use crate::query::projection::Projection;
    use sea_query::SqliteQueryBuilder;
    use sea_query_rusqlite::RusqliteBinder;

    fn spec_for(select: impl Projection) -> QuerySpec {
        QuerySpec {
            select: select.expressions(),
            from: vec![MEMBER.table_ref()],
            ..QuerySpec::default()
        }
    }

    #[test]
    fn has_next_reports_remaining_rows() {
        let page = QueryResults {
            total: 4,
            offset: 0,
            limit: Some(2),
            results: vec![1, 2],
        };
        assert!(page.has_next());

        let last = QueryResults {
            total: 4,
            offset: 2,
            limit: Some(2),
            results: vec![3, 4],
        };
        assert!(!last.has_next());
    }

    #[test]
    fn filter_values_are_bound_not_inlined() {
        let mut spec = spec_for(MEMBER.username());
        spec.add_filter(MEMBER.username().eq("member1"));
        spec.add_filter(MEMBER.age().eq(10));

        let (sql, values) = spec.to_statement().build_rusqlite(SqliteQueryBuilder);
        assert!(sql.contains(r#"FROM "members" AS "member""#));
        assert!(sql.contains("WHERE"));
        assert!(!sql.contains("member1"));
        assert_eq!(values.0.len(), 2);
    }

    #[test]
    fn absent_filter_renders_no_where() {
        let spec = spec_for(MEMBER);
        let (sql, values) = spec.to_statement().build_rusqlite(SqliteQueryBuilder);
        assert!(!sql.contains("WHERE"));
        assert!(values.0.is_empty());
    }

    #[test]
    fn offset_without_limit_gets_unbounded_limit() {
        let mut spec = spec_for(MEMBER.age());
        spec.offset = Some(2);
        let (sql, _) = spec.to_statement().build_rusqlite(SqliteQueryBuilder);
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn count_drops_paging_and_ordering() {
        let mut spec = spec_for(MEMBER);
        spec.order_by.push(MEMBER.age().desc());
        spec.limit = Some(2);
        let (sql, values) = spec
            .to_count_statement()
            .build_rusqlite(SqliteQueryBuilder);
        assert!(sql.starts_with("SELECT COUNT(*) FROM (SELECT"));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("LIMIT"));
        assert!(values.0.is_empty());
    }

    #[test]
    fn nested_subquery_and_select_alias_render_inline() {
        let member_sub = QMember::new("memberSub");
        let mut spec = spec_for((
            MEMBER.age(),
            TEAM.name().as_("team_name"),
            CaseBuilder::new()
                .when(MEMBER.age().between(0, 20))
                .then("young")
                .otherwise("other"),
        ));
        spec.add_filter(MEMBER.age().eq(sub_select(member_sub.age().max()).from(&member_sub)));

        let (sql, values) = spec.to_statement().build_rusqlite(SqliteQueryBuilder);
        assert!(sql.contains(r#"AS "team_name""#));
        assert!(sql.contains("CASE WHEN"));
        assert!(sql.contains(r#"FROM "members" AS "memberSub""#));
        assert_eq!(values.0.len(), 4);
    }

    #[test]
    fn subquery_collects_filters() {
        let member_sub = QMember::new("memberSub");
        let sub = sub_select(member_sub.age())
            .from(&member_sub)
            .where_(member_sub.age().gt(10))
            .where_opt(None);
        assert_eq!(sub.spec.from.len(), 1);
        assert!(sub.spec.filter.is_some());
    }

    #[test]
    fn on_without_join_falls_back_to_filter() {
        let mut spec = QuerySpec::default();
        spec.add_join_condition(MEMBER.age().eq(1));
        assert!(spec.filter.is_some());
        assert!(spec.joins.is_empty());
    }
}
