//! Application bootstrap: configuration, logging and storage wiring.
//!
//! # Responsibility
//! - Read runtime settings from the environment.
//! - Open the database and hand out repositories and the query factory,
//!   all borrowing the one connection owned by [`App`].

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{default_log_level, init_logging, LogLevel, LoggingError};
use crate::model::member::Member;
use crate::model::team::Team;
use crate::query::factory::QueryFactory;
use crate::repo::crud::CrudRepository;
use crate::repo::error::RepoError;
use crate::repo::member_repo::SqliteMemberRepository;
use crate::repo::team_repo::SqliteTeamRepository;
use crate::service::roster_service::RosterService;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ROSTER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ROSTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ROSTER_LOG_DIR";

#[derive(Debug)]
pub enum AppError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<LoggingError> for AppError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Runtime settings.
///
/// Defaults: in-memory database, build-dependent log level, logging off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Database file; `None` opens a private in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Reads `ROSTER_DB_PATH`, `ROSTER_LOG_LEVEL` and `ROSTER_LOG_DIR`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => LogLevel::parse(&value)?,
            None => default_log_level(),
        };

        Ok(Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level,
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

/// Open application: owns the connection every repository borrows.
pub struct App {
    conn: Connection,
}

impl App {
    /// Initializes logging (when a directory is configured) and opens the
    /// migrated database.
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        if let Some(log_dir) = config.log_dir.as_ref() {
            init_logging(config.log_level.as_str(), log_dir)?;
        }

        let conn = match config.db_path.as_ref() {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        Ok(Self { conn })
    }

    pub fn query_factory(&self) -> QueryFactory<'_> {
        QueryFactory::new(&self.conn)
    }

    pub fn members(&self) -> Result<SqliteMemberRepository<'_>, AppError> {
        Ok(SqliteMemberRepository::try_new(&self.conn)?)
    }

    pub fn teams(&self) -> Result<SqliteTeamRepository<'_>, AppError> {
        Ok(SqliteTeamRepository::try_new(&self.conn)?)
    }

    pub fn roster_service(
        &self,
    ) -> Result<RosterService<SqliteMemberRepository<'_>, SqliteTeamRepository<'_>>, AppError> {
        Ok(RosterService::new(self.members()?, self.teams()?))
    }

    /// Inserts the demo roster in one transaction: `teamA` with
    /// `member1`/10 and `member2`/20, `teamB` with `member3`/30 and
    /// `member4`/40.
    pub fn seed_demo_roster(&mut self) -> Result<Vec<Member>, AppError> {
        let tx = self.conn.transaction().map_err(DbError::from)?;
        let members = {
            let teams = SqliteTeamRepository::try_new(&tx)?;
            let member_repo = SqliteMemberRepository::try_new(&tx)?;

            let team_a = teams.save(&Team::new("teamA"))?;
            let team_b = teams.save(&Team::new("teamB"))?;

            let mut members = Vec::with_capacity(4);
            for (username, age, team) in [
                ("member1", 10, &team_a),
                ("member2", 20, &team_a),
                ("member3", 30, &team_b),
                ("member4", 40, &team_b),
            ] {
                let member = Member::with_team(username, age, team).map_err(RepoError::from)?;
                members.push(member_repo.save(&member)?);
            }
            members
        };
        tx.commit().map_err(DbError::from)?;

        info!(
            "event=seed_demo_roster module=app status=ok members={}",
            members.len()
        );
        Ok(members)
    }
}
