//! Team repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Team::validate()` before SQL mutations.
//! - Deleting a team detaches its members (`team_id` becomes `NULL`).

use super::crud::{count_from_db, ensure_schema_version, ensure_table_ready, CrudRepository};
use super::error::{RepoError, RepoResult};
use crate::model::team::{Team, TeamId};
use crate::query::factory::QueryFactory;
use crate::query::path::TEAM;
use rusqlite::{params, Connection};

const TEAM_TABLE: &str = "teams";
const TEAM_COLUMNS: [&str; 2] = ["id", "name"];

/// Team persistence operations on top of generic CRUD.
pub trait TeamRepository: CrudRepository<Team> {
    /// Lowest-id team with exactly this name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Team>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
    queries: QueryFactory<'conn>,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table_ready(conn, TEAM_TABLE, &TEAM_COLUMNS)?;
        Ok(Self {
            conn,
            queries: QueryFactory::new(conn),
        })
    }
}

impl CrudRepository<Team> for SqliteTeamRepository<'_> {
    fn save(&self, team: &Team) -> RepoResult<Team> {
        team.validate()?;

        let id = match team.id {
            None => {
                self.conn.execute(
                    "INSERT INTO teams (name) VALUES (?1);",
                    params![team.name.as_str()],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE teams SET name = ?1 WHERE id = ?2;",
                    params![team.name.as_str(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "team", id });
                }
                id
            }
        };

        Ok(Team {
            id: Some(id),
            name: team.name.clone(),
        })
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        Ok(self
            .queries
            .select_from(&TEAM)
            .where_(TEAM.id().eq(id))
            .fetch_one()?)
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        Ok(self
            .queries
            .select_from(&TEAM)
            .order_by(TEAM.id().asc())
            .fetch()?)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .queries
            .select(TEAM.count())
            .from(&TEAM)
            .fetch_one()?
            .unwrap_or_default();
        count_from_db(count)
    }

    fn exists_by_id(&self, id: TeamId) -> RepoResult<bool> {
        Ok(self
            .queries
            .select(TEAM.id())
            .from(&TEAM)
            .where_(TEAM.id().eq(id))
            .fetch_first()?
            .is_some())
    }

    fn delete_by_id(&self, id: TeamId) -> RepoResult<()> {
        let deleted = self
            .queries
            .delete(&TEAM)
            .where_(TEAM.id().eq(id))
            .execute()?;
        if deleted == 0 {
            return Err(RepoError::NotFound { entity: "team", id });
        }
        Ok(())
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Team>> {
        Ok(self
            .queries
            .select_from(&TEAM)
            .where_(TEAM.name().eq(name))
            .order_by(TEAM.id().asc())
            .fetch_first()?)
    }
}
