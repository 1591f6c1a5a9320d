//! Member entity and its team association.
//!
//! # Invariants
//! - `age` is never negative.
//! - A present `username` is never blank; `None` is a legal, unnamed member.
//! - A team can only be assigned once it has been persisted, so the stored
//!   foreign key always points at a real row.

use super::team::{Team, TeamId};
use super::EntityId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MemberId = EntityId;

/// Member → Team association state.
///
/// `Unloaded` is what a plain member query returns: only the foreign key was
/// read. `Loaded` carries the team row, produced by a fetch join or by an
/// in-memory assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRef {
    Unloaded(TeamId),
    Loaded(Team),
}

impl TeamRef {
    /// Returns the referenced team id, if known.
    pub fn id(&self) -> Option<TeamId> {
        match self {
            Self::Unloaded(id) => Some(*id),
            Self::Loaded(team) => team.id,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<MemberId>,
    pub username: Option<String>,
    pub age: i32,
    pub team: Option<TeamRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    NegativeAge(i32),
    BlankUsername,
    UnpersistedTeam,
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeAge(age) => write!(f, "member age must not be negative, got {age}"),
            Self::BlankUsername => write!(f, "member username must not be blank when present"),
            Self::UnpersistedTeam => write!(f, "member can only join a persisted team"),
        }
    }
}

impl Error for MemberValidationError {}

impl Member {
    /// Creates a named member without a team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            username: Some(username.into()),
            age,
            team: None,
        }
    }

    /// Creates a member whose username is absent.
    pub fn unnamed(age: i32) -> Self {
        Self {
            id: None,
            username: None,
            age,
            team: None,
        }
    }

    /// Creates a named member assigned to `team`.
    pub fn with_team(
        username: impl Into<String>,
        age: i32,
        team: &Team,
    ) -> Result<Self, MemberValidationError> {
        let mut member = Self::new(username, age);
        member.change_team(team)?;
        Ok(member)
    }

    /// Moves this member to `team`.
    ///
    /// The previous association, if any, is simply replaced: there is no
    /// inverse collection to keep in sync.
    pub fn change_team(&mut self, team: &Team) -> Result<(), MemberValidationError> {
        if !team.is_persisted() {
            return Err(MemberValidationError::UnpersistedTeam);
        }
        self.team = Some(TeamRef::Loaded(team.clone()));
        Ok(())
    }

    pub fn leave_team(&mut self) {
        self.team = None;
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team.as_ref().and_then(TeamRef::id)
    }

    /// Whether the associated team row is present in memory.
    ///
    /// Members without a team report `false`.
    pub fn is_team_loaded(&self) -> bool {
        self.team.as_ref().is_some_and(TeamRef::is_loaded)
    }

    pub fn loaded_team(&self) -> Option<&Team> {
        match self.team.as_ref() {
            Some(TeamRef::Loaded(team)) => Some(team),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.age < 0 {
            return Err(MemberValidationError::NegativeAge(self.age));
        }
        if self
            .username
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(MemberValidationError::BlankUsername);
        }
        if let Some(TeamRef::Loaded(team)) = self.team.as_ref() {
            if !team.is_persisted() {
                return Err(MemberValidationError::UnpersistedTeam);
            }
        }
        Ok(())
    }
}
