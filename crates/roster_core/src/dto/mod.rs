//! Read models filled from query projections.
//!
//! DTOs carry no identity of their own and are never written back; they are
//! what a caller gets when it asks for a subset of columns instead of a
//! full entity.

use crate::model::member::MemberId;
use crate::model::team::TeamId;
use crate::query::expr::{SelectItem, TypedExpr};
use crate::query::projection::Projection;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Member name and age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: i32,
}

impl MemberDto {
    pub fn new(username: Option<String>, age: i32) -> Self {
        Self { username, age }
    }
}

impl From<(Option<String>, i32)> for MemberDto {
    fn from((username, age): (Option<String>, i32)) -> Self {
        Self { username, age }
    }
}

/// Same shape as [`MemberDto`] under different field names; filled from
/// aliased select items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub name: Option<String>,
    pub age: i32,
}

impl From<(Option<String>, i32)> for UserDto {
    fn from((name, age): (Option<String>, i32)) -> Self {
        Self { name, age }
    }
}

/// One row of the member search: member columns plus the team, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeamDto {
    pub member_id: MemberId,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

type MemberTeamRow = (
    MemberId,
    Option<String>,
    i32,
    Option<TeamId>,
    Option<String>,
);

impl From<MemberTeamRow> for MemberTeamDto {
    fn from((member_id, username, age, team_id, team_name): MemberTeamRow) -> Self {
        Self {
            member_id,
            username,
            age,
            team_id,
            team_name,
        }
    }
}

/// Constructor projection into [`MemberDto`].
///
/// The argument types are checked when the query is built: a column of the
/// wrong type does not compile.
#[derive(Debug, Clone, PartialEq)]
pub struct QMemberDto {
    username: TypedExpr<Option<String>>,
    age: TypedExpr<i32>,
}

impl QMemberDto {
    pub fn new(username: TypedExpr<Option<String>>, age: TypedExpr<i32>) -> Self {
        Self { username, age }
    }
}

impl Projection for QMemberDto {
    type Output = MemberDto;

    fn expressions(&self) -> Vec<SelectItem> {
        vec![self.username.select_item(), self.age.select_item()]
    }

    fn width(&self) -> usize {
        2
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<MemberDto> {
        Ok(MemberDto {
            username: row.get(start)?,
            age: row.get(start + 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberDto, MemberTeamDto, QMemberDto, UserDto};
    use crate::query::path::MEMBER;
    use crate::query::projection::Projection;

    #[test]
    fn tuple_conversions_keep_field_order() {
        let member = MemberDto::from((Some("member1".to_string()), 10));
        assert_eq!(member, MemberDto::new(Some("member1".to_string()), 10));

        let user = UserDto::from((None, 3));
        assert_eq!(user.name, None);
        assert_eq!(user.age, 3);
    }

    #[test]
    fn member_team_dto_serializes_missing_team_as_null() {
        let dto = MemberTeamDto::from((7, Some("member1".to_string()), 10, None, None));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["member_id"], 7);
        assert!(json["team_name"].is_null());
    }

    #[test]
    fn constructor_projection_selects_two_columns() {
        let projection = QMemberDto::new(MEMBER.username(), MEMBER.age());
        assert_eq!(projection.width(), projection.expressions().len());
    }
}
