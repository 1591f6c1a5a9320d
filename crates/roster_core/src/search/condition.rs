//! Optional-criteria member search.
//!
//! # Responsibility
//! - Map each present field of [`MemberSearchCondition`] to one predicate.
//! - AND the present predicates together; absent fields contribute nothing.
//!
//! # Invariants
//! - Every field absent yields `None`, which callers treat as "no filter"
//!   (the query matches every row).
//! - Pure: the same condition always builds an equal predicate.
//! - The conjunction keeps field order, so results never depend on which
//!   subset of fields is present.

use crate::query::path::{QMember, QTeam};
use crate::query::predicate::{all_of, BooleanBuilder, Predicate};
use crate::query::select::sub_select;
use sea_query::Cond;
use serde::{Deserialize, Serialize};

/// Team alias used by the team-name criterion's subquery.
const CONDITION_TEAM: QTeam = QTeam::new("condTeam");

/// Search form for members. Every criterion is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSearchCondition {
    pub username: Option<String>,
    pub age: Option<i32>,
    pub team_name: Option<String>,
    pub age_goe: Option<i32>,
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn with_age_range(mut self, age_goe: Option<i32>, age_loe: Option<i32>) -> Self {
        self.age_goe = age_goe;
        self.age_loe = age_loe;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.age.is_none()
            && self.team_name.is_none()
            && self.age_goe.is_none()
            && self.age_loe.is_none()
    }

    /// Conjunction of the present criteria against `member`, `None` when no
    /// criterion is present.
    pub fn to_predicate(&self, member: &QMember) -> Option<Predicate> {
        if self.is_empty() {
            return None;
        }
        Some(Predicate::all(
            Cond::all()
                .add_option(
                    username_eq(member, self.username.as_deref()).map(Predicate::into_condition),
                )
                .add_option(age_eq(member, self.age).map(Predicate::into_condition))
                .add_option(
                    team_name_eq(member, self.team_name.as_deref()).map(Predicate::into_condition),
                )
                .add_option(age_goe(member, self.age_goe).map(Predicate::into_condition))
                .add_option(age_loe(member, self.age_loe).map(Predicate::into_condition)),
        ))
    }

    /// Same filter built with an accumulating [`BooleanBuilder`].
    pub fn to_builder(&self, member: &QMember) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        builder
            .and_opt(username_eq(member, self.username.as_deref()))
            .and_opt(age_eq(member, self.age))
            .and_opt(team_name_eq(member, self.team_name.as_deref()))
            .and_opt(age_goe(member, self.age_goe))
            .and_opt(age_loe(member, self.age_loe));
        builder
    }
}

pub fn username_eq(member: &QMember, username: Option<&str>) -> Option<Predicate> {
    username.map(|username| member.username().eq(username))
}

pub fn age_eq(member: &QMember, age: Option<i32>) -> Option<Predicate> {
    age.map(|age| member.age().eq(age))
}

/// `member.team_id IN (SELECT id FROM teams WHERE name = ?)`.
pub fn team_name_eq(member: &QMember, team_name: Option<&str>) -> Option<Predicate> {
    team_name.map(|team_name| {
        member.team_id().in_(
            sub_select(CONDITION_TEAM.id())
                .from(&CONDITION_TEAM)
                .where_(CONDITION_TEAM.name().eq(team_name)),
        )
    })
}

pub fn age_goe(member: &QMember, age: Option<i32>) -> Option<Predicate> {
    age.map(|age| member.age().goe(age))
}

pub fn age_loe(member: &QMember, age: Option<i32>) -> Option<Predicate> {
    age.map(|age| member.age().loe(age))
}

/// Username and age equality combined; either side may be absent.
pub fn all_eq(member: &QMember, username: Option<&str>, age: Option<i32>) -> Option<Predicate> {
    all_of([username_eq(member, username), age_eq(member, age)])
}
