//! Aliased table handles for the `members` and `teams` tables.
//!
//! A path is the query-side view of an entity: it knows its table, the alias
//! it is bound to in a statement, and how to read its columns back. Two
//! paths of the same entity with different aliases can appear in one
//! statement (outer query plus subquery).

use super::expr::{SelectItem, TypedExpr};
use super::predicate::Predicate;
use crate::model::member::{Member, MemberId, TeamRef};
use crate::model::team::{Team, TeamId};
use rusqlite::Row;
use sea_query::{Alias, IntoIden, TableRef};

/// Table plus the alias it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableAlias {
    pub(crate) table: &'static str,
    pub(crate) alias: &'static str,
}

impl TableAlias {
    /// `"table" AS "alias"`.
    pub(crate) fn to_table_ref(self) -> TableRef {
        TableRef::TableAlias(
            Alias::new(self.table).into_iden(),
            Alias::new(self.alias).into_iden(),
        )
    }
}

/// A path that can appear in `FROM`, `JOIN`, `UPDATE` or `DELETE`.
pub trait EntityPath {
    fn table_ref(&self) -> TableAlias;
}

/// Default member path, alias `member`.
pub const MEMBER: QMember = QMember::new("member");
/// Default team path, alias `team`.
pub const TEAM: QTeam = QTeam::new("team");

const MEMBER_TABLE: &str = "members";
const TEAM_TABLE: &str = "teams";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QMember {
    alias: &'static str,
}

impl QMember {
    pub const fn new(alias: &'static str) -> Self {
        Self { alias }
    }

    pub fn alias(&self) -> &'static str {
        self.alias
    }

    pub fn id(&self) -> TypedExpr<MemberId> {
        TypedExpr::column(self.alias, "member_id")
    }

    pub fn username(&self) -> TypedExpr<Option<String>> {
        TypedExpr::column(self.alias, "username")
    }

    pub fn age(&self) -> TypedExpr<i32> {
        TypedExpr::column(self.alias, "age")
    }

    pub fn team_id(&self) -> TypedExpr<Option<TeamId>> {
        TypedExpr::column(self.alias, "team_id")
    }

    /// The member → team association, joinable with [`QTeam`].
    pub fn team(&self) -> TeamAssociation {
        TeamAssociation {
            member_alias: self.alias,
        }
    }

    /// Number of member rows.
    pub fn count(&self) -> TypedExpr<i64> {
        self.id().count()
    }

    pub(crate) const WIDTH: usize = 4;

    pub(crate) fn columns(&self) -> Vec<SelectItem> {
        vec![
            self.id().select_item(),
            self.username().select_item(),
            self.age().select_item(),
            self.team_id().select_item(),
        ]
    }

    /// Reads the columns produced by [`Self::columns`] starting at `start`.
    pub(crate) fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Member> {
        Ok(Member {
            id: Some(row.get(start)?),
            username: row.get(start + 1)?,
            age: row.get(start + 2)?,
            team: row
                .get::<_, Option<TeamId>>(start + 3)?
                .map(TeamRef::Unloaded),
        })
    }
}

impl Default for QMember {
    fn default() -> Self {
        MEMBER
    }
}

impl EntityPath for QMember {
    fn table_ref(&self) -> TableAlias {
        TableAlias {
            table: MEMBER_TABLE,
            alias: self.alias,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QTeam {
    alias: &'static str,
}

impl QTeam {
    pub const fn new(alias: &'static str) -> Self {
        Self { alias }
    }

    pub fn alias(&self) -> &'static str {
        self.alias
    }

    pub fn id(&self) -> TypedExpr<TeamId> {
        TypedExpr::column(self.alias, "id")
    }

    pub fn name(&self) -> TypedExpr<String> {
        TypedExpr::column(self.alias, "name")
    }

    pub fn count(&self) -> TypedExpr<i64> {
        self.id().count()
    }

    /// Outer-join view of this path: the projection decodes to `None` when
    /// no team row matched, and its columns decode as `Option`.
    pub fn nullable(&self) -> NullableTeam {
        NullableTeam { team: *self }
    }

    pub(crate) const WIDTH: usize = 2;

    pub(crate) fn columns(&self) -> Vec<SelectItem> {
        vec![self.id().select_item(), self.name().select_item()]
    }

    pub(crate) fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Team> {
        Ok(Team {
            id: Some(row.get(start)?),
            name: row.get(start + 1)?,
        })
    }

    pub(crate) fn decode_optional(
        &self,
        row: &Row<'_>,
        start: usize,
    ) -> rusqlite::Result<Option<Team>> {
        match row.get::<_, Option<TeamId>>(start)? {
            Some(id) => Ok(Some(Team {
                id: Some(id),
                name: row.get(start + 1)?,
            })),
            None => Ok(None),
        }
    }
}

impl Default for QTeam {
    fn default() -> Self {
        TEAM
    }
}

impl EntityPath for QTeam {
    fn table_ref(&self) -> TableAlias {
        TableAlias {
            table: TEAM_TABLE,
            alias: self.alias,
        }
    }
}

/// A [`QTeam`] on the outer side of a left join.
///
/// Every column can be NULL there, so the accessors are typed `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullableTeam {
    pub(crate) team: QTeam,
}

impl NullableTeam {
    pub fn id(&self) -> TypedExpr<Option<TeamId>> {
        TypedExpr::column(self.team.alias, "id")
    }

    pub fn name(&self) -> TypedExpr<Option<String>> {
        TypedExpr::column(self.team.alias, "name")
    }
}

/// `member.team_id → team.id` association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamAssociation {
    member_alias: &'static str,
}

impl TeamAssociation {
    /// Join condition binding this association to `team`.
    pub(crate) fn join_condition(&self, team: &QTeam) -> Predicate {
        team.id().eq(QMember::new(self.member_alias).team_id())
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityPath, QMember, QTeam, MEMBER, TEAM};
    use crate::query::expr::ColumnName;

    #[test]
    fn custom_alias_is_used_by_columns_and_table() {
        let member_sub = QMember::new("memberSub");
        assert_eq!(
            member_sub.age().column_name(),
            Some(ColumnName {
                alias: "memberSub",
                column: "age"
            })
        );
        assert_eq!(member_sub.table_ref().table, "members");
        assert_eq!(member_sub.table_ref().alias, "memberSub");
    }

    #[test]
    fn association_joins_on_foreign_key() {
        let condition = MEMBER.team().join_condition(&TEAM);
        assert_eq!(condition, TEAM.id().eq(MEMBER.team_id()));
    }

    #[test]
    fn nullable_team_reads_the_same_columns() {
        let outer = TEAM.nullable();
        assert_eq!(outer.name().expr(), TEAM.name().expr());
        assert_eq!(outer.id().column_name(), TEAM.id().column_name());
    }

    #[test]
    fn column_lists_match_widths() {
        assert_eq!(MEMBER.columns().len(), QMember::WIDTH);
        assert_eq!(TEAM.columns().len(), QTeam::WIDTH);
    }
}
