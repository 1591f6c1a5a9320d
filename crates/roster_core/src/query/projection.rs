//! Select-list shapes and how their rows decode.
//!
//! A projection lists the expressions it needs in the select list and reads
//! them back from a row at a given column offset, which lets projections
//! nest inside tuples.

use super::expr::{SelectItem, TypedExpr};
use super::path::{NullableTeam, QMember, QTeam};
use crate::model::member::{Member, TeamRef};
use crate::model::team::Team;
use rusqlite::types::FromSql;
use rusqlite::Row;

pub trait Projection {
    type Output;

    /// Select-list expressions, in decode order.
    fn expressions(&self) -> Vec<SelectItem>;

    /// Number of columns consumed by [`Self::decode`].
    fn width(&self) -> usize {
        self.expressions().len()
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Self::Output>;
}

impl<T: FromSql> Projection for TypedExpr<T> {
    type Output = T;

    fn expressions(&self) -> Vec<SelectItem> {
        vec![self.select_item()]
    }

    fn width(&self) -> usize {
        1
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<T> {
        row.get(start)
    }
}

impl Projection for QMember {
    type Output = Member;

    fn expressions(&self) -> Vec<SelectItem> {
        self.columns()
    }

    fn width(&self) -> usize {
        QMember::WIDTH
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Member> {
        QMember::decode(self, row, start)
    }
}

impl Projection for QTeam {
    type Output = Team;

    fn expressions(&self) -> Vec<SelectItem> {
        self.columns()
    }

    fn width(&self) -> usize {
        QTeam::WIDTH
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Team> {
        QTeam::decode(self, row, start)
    }
}

impl Projection for NullableTeam {
    type Output = Option<Team>;

    fn expressions(&self) -> Vec<SelectItem> {
        self.team.columns()
    }

    fn width(&self) -> usize {
        QTeam::WIDTH
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Option<Team>> {
        self.team.decode_optional(row, start)
    }
}

/// Member rows with the joined team row loaded eagerly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchedMember {
    member: QMember,
    team: QTeam,
}

impl FetchedMember {
    pub(crate) fn new(member: QMember, team: QTeam) -> Self {
        Self { member, team }
    }
}

impl Projection for FetchedMember {
    type Output = Member;

    fn expressions(&self) -> Vec<SelectItem> {
        let mut exprs = self.member.columns();
        exprs.extend(self.team.columns());
        exprs
    }

    fn width(&self) -> usize {
        QMember::WIDTH + QTeam::WIDTH
    }

    fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Member> {
        let mut member = self.member.decode(row, start)?;
        if let Some(team) = self.team.decode_optional(row, start + QMember::WIDTH)? {
            member.team = Some(TeamRef::Loaded(team));
        }
        Ok(member)
    }
}

macro_rules! tuple_projection {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Projection),+> Projection for ($($name,)+) {
            type Output = ($($name::Output,)+);

            fn expressions(&self) -> Vec<SelectItem> {
                let mut exprs = Vec::new();
                $(exprs.extend(self.$idx.expressions());)+
                exprs
            }

            fn width(&self) -> usize {
                0 $(+ self.$idx.width())+
            }

            #[allow(unused_assignments)]
            fn decode(&self, row: &Row<'_>, start: usize) -> rusqlite::Result<Self::Output> {
                let mut offset = start;
                Ok(($(
                    {
                        let value = self.$idx.decode(row, offset)?;
                        offset += self.$idx.width();
                        value
                    },
                )+))
            }
        }
    };
}

tuple_projection!(A: 0, B: 1);
tuple_projection!(A: 0, B: 1, C: 2);
tuple_projection!(A: 0, B: 1, C: 2, D: 3);
tuple_projection!(A: 0, B: 1, C: 2, D: 3, E: 4);
