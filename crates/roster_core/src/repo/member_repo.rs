//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Generic CRUD over `members`, plus lookups by username and team.
//! - Condition search returning entities, flat member/team rows, or pages.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before SQL mutations.
//! - Reads leave the team association unloaded (`TeamRef::Unloaded`).
//! - Search results are ordered by member id.

use super::crud::{count_from_db, ensure_schema_version, ensure_table_ready, CrudRepository};
use super::error::{RepoError, RepoResult};
use crate::dto::MemberTeamDto;
use crate::model::member::{Member, MemberId};
use crate::model::team::TeamId;
use crate::query::expr::TypedExpr;
use crate::query::factory::QueryFactory;
use crate::query::path::{MEMBER, TEAM};
use crate::query::select::{Query, QueryResults};
use crate::search::condition::MemberSearchCondition;
use crate::search::page::PageRequest;
use log::debug;
use rusqlite::{params, Connection};

const MEMBER_TABLE: &str = "members";
const MEMBER_COLUMNS: [&str; 4] = ["member_id", "username", "age", "team_id"];

/// Member persistence operations on top of generic CRUD.
pub trait MemberRepository: CrudRepository<Member> {
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
    fn find_by_team(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
    /// Members matching every present criterion; all members when none is.
    fn search_members(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<Member>>;
    /// Member/team rows matching `condition`; members without a team are
    /// included with empty team columns.
    fn search(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamDto>>;
    fn search_page(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
    ) -> RepoResult<QueryResults<MemberTeamDto>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
    queries: QueryFactory<'conn>,
}

type MemberTeamProjection = (
    TypedExpr<MemberId>,
    TypedExpr<Option<String>>,
    TypedExpr<i32>,
    TypedExpr<Option<TeamId>>,
    TypedExpr<Option<String>>,
);

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table_ready(conn, MEMBER_TABLE, &MEMBER_COLUMNS)?;
        ensure_table_ready(conn, "teams", &["id", "name"])?;
        Ok(Self {
            conn,
            queries: QueryFactory::new(conn),
        })
    }

    fn search_query(
        &self,
        condition: &MemberSearchCondition,
    ) -> Query<'conn, MemberTeamProjection> {
        self.queries
            .select((
                MEMBER.id(),
                MEMBER.username(),
                MEMBER.age(),
                MEMBER.team_id(),
                TEAM.nullable().name(),
            ))
            .from(&MEMBER)
            .left_join(MEMBER.team(), &TEAM)
            .where_opt(condition.to_predicate(&MEMBER))
            .order_by(MEMBER.id().asc())
    }
}

impl CrudRepository<Member> for SqliteMemberRepository<'_> {
    fn save(&self, member: &Member) -> RepoResult<Member> {
        member.validate()?;

        let id = match member.id {
            None => {
                self.conn.execute(
                    "INSERT INTO members (username, age, team_id) VALUES (?1, ?2, ?3);",
                    params![member.username.as_deref(), member.age, member.team_id()],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE members
                     SET
                        username = ?1,
                        age = ?2,
                        team_id = ?3
                     WHERE member_id = ?4;",
                    params![member.username.as_deref(), member.age, member.team_id(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "member",
                        id,
                    });
                }
                id
            }
        };

        let mut saved = member.clone();
        saved.id = Some(id);
        Ok(saved)
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        Ok(self
            .queries
            .select_from(&MEMBER)
            .where_(MEMBER.id().eq(id))
            .fetch_one()?)
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        Ok(self
            .queries
            .select_from(&MEMBER)
            .order_by(MEMBER.id().asc())
            .fetch()?)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .queries
            .select(MEMBER.count())
            .from(&MEMBER)
            .fetch_one()?
            .unwrap_or_default();
        count_from_db(count)
    }

    fn exists_by_id(&self, id: MemberId) -> RepoResult<bool> {
        Ok(self
            .queries
            .select(MEMBER.id())
            .from(&MEMBER)
            .where_(MEMBER.id().eq(id))
            .fetch_first()?
            .is_some())
    }

    fn delete_by_id(&self, id: MemberId) -> RepoResult<()> {
        let deleted = self
            .queries
            .delete(&MEMBER)
            .where_(MEMBER.id().eq(id))
            .execute()?;
        if deleted == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id,
            });
        }
        Ok(())
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        Ok(self
            .queries
            .select_from(&MEMBER)
            .where_(MEMBER.username().eq(username))
            .order_by(MEMBER.id().asc())
            .fetch()?)
    }

    fn find_by_team(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        Ok(self
            .queries
            .select_from(&MEMBER)
            .where_(MEMBER.team_id().eq(team_id))
            .order_by(MEMBER.id().asc())
            .fetch()?)
    }

    fn search_members(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<Member>> {
        Ok(self
            .queries
            .select_from(&MEMBER)
            .where_opt(condition.to_predicate(&MEMBER))
            .order_by(MEMBER.id().asc())
            .fetch()?)
    }

    fn search(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamDto>> {
        let rows = self.search_query(condition).fetch_into::<MemberTeamDto>()?;
        debug!(
            "event=member_search module=repo status=ok filtered={} rows={}",
            !condition.is_empty(),
            rows.len()
        );
        Ok(rows)
    }

    fn search_page(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
    ) -> RepoResult<QueryResults<MemberTeamDto>> {
        let results = self
            .search_query(condition)
            .offset(page.offset)
            .limit(page.limit)
            .fetch_page()?;
        Ok(results.map(MemberTeamDto::from))
    }
}
