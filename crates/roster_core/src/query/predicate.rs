//! Boolean filter expressions and their composition.
//!
//! # Responsibility
//! - Wrap `sea_query::Condition` for `WHERE`/`ON`/`HAVING` clauses.
//! - Combine optional conditions without branching at call sites.
//!
//! # Invariants
//! - `None` is the "no filter" value. Absent conditions are skipped when
//!   combining; a query given `None` has no `WHERE` clause.
//! - Composition is pure; equal inputs produce equal (`PartialEq`)
//!   conditions, and chained `and`/`or` calls extend one flat junction.

use sea_query::{Cond, Condition, SimpleExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Junction {
    All,
    Any,
}

/// Composable boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    condition: Condition,
    junction: Junction,
}

impl Predicate {
    pub(crate) fn new(expr: SimpleExpr) -> Self {
        Self::all(Cond::all().add(expr))
    }

    /// Wraps a `Cond::all()` junction.
    pub fn all(condition: Condition) -> Self {
        Self {
            condition,
            junction: Junction::All,
        }
    }

    /// Wraps a `Cond::any()` junction.
    pub fn any(condition: Condition) -> Self {
        Self {
            condition,
            junction: Junction::Any,
        }
    }

    pub fn into_condition(self) -> Condition {
        self.condition
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Logical AND.
    pub fn and(self, other: Predicate) -> Predicate {
        match self.junction {
            Junction::All => Self::all(self.condition.add(other.condition)),
            Junction::Any => Self::all(Cond::all().add(self.condition).add(other.condition)),
        }
    }

    /// Logical OR.
    pub fn or(self, other: Predicate) -> Predicate {
        match self.junction {
            Junction::Any => Self::any(self.condition.add(other.condition)),
            Junction::All => Self::any(Cond::any().add(self.condition).add(other.condition)),
        }
    }

    /// ANDs `other` when present; an absent condition is skipped.
    pub fn and_opt(self, other: Option<Predicate>) -> Predicate {
        match other {
            Some(other) => self.and(other),
            None => self,
        }
    }

    pub fn not(self) -> Predicate {
        Self::all(Cond::all().add(self.condition.not()))
    }
}

/// ANDs every present condition. Returns `None` when all are absent.
pub fn all_of<I>(conditions: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    let mut present = false;
    let condition = conditions.into_iter().fold(Cond::all(), |all, condition| {
        present |= condition.is_some();
        all.add_option(condition.map(Predicate::into_condition))
    });
    present.then(|| Predicate::all(condition))
}

/// ORs every present condition. Returns `None` when all are absent.
pub fn any_of<I>(conditions: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    let mut present = false;
    let condition = conditions.into_iter().fold(Cond::any(), |any, condition| {
        present |= condition.is_some();
        any.add_option(condition.map(Predicate::into_condition))
    });
    present.then(|| Predicate::any(condition))
}

/// Accumulating predicate builder.
///
/// Starts empty; an empty builder builds `None` (match-all).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanBuilder {
    predicate: Option<Predicate>,
}

impl BooleanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(&mut self, condition: Predicate) -> &mut Self {
        self.predicate = Some(match self.predicate.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }

    pub fn and_opt(&mut self, condition: Option<Predicate>) -> &mut Self {
        if let Some(condition) = condition {
            self.and(condition);
        }
        self
    }

    pub fn or(&mut self, condition: Predicate) -> &mut Self {
        self.predicate = Some(match self.predicate.take() {
            Some(current) => current.or(condition),
            None => condition,
        });
        self
    }

    pub fn has_value(&self) -> bool {
        self.predicate.is_some()
    }

    pub fn build(&self) -> Option<Predicate> {
        self.predicate.clone()
    }
}

impl From<BooleanBuilder> for Option<Predicate> {
    fn from(value: BooleanBuilder) -> Self {
        value.predicate
    }
}
