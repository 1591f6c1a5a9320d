//! Team entity.

use super::EntityId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TeamId = EntityId;

/// A named group members can belong to.
///
/// The member roster is not stored here; it is computed by query
/// (see `MemberRepository::find_by_team`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<TeamId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamValidationError {
    BlankName,
}

impl Display for TeamValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "team name must not be blank"),
        }
    }
}

impl Error for TeamValidationError {}

impl Team {
    /// Creates a transient team; `id` is assigned on save.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), TeamValidationError> {
        if self.name.trim().is_empty() {
            return Err(TeamValidationError::BlankName);
        }
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
