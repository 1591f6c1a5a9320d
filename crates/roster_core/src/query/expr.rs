//! Typed wrappers over `sea_query` expressions.
//!
//! # Responsibility
//! - Carry the decoded Rust type of an expression in `TypedExpr<T>` so that
//!   projections know how to read the column back.
//! - Offer the comparison, aggregate, arithmetic, text and `CASE` builders
//!   the roster queries use, each lowering to a `SimpleExpr`.
//!
//! # Invariants
//! - Literal values are always carried as `sea_query::Value` and reach
//!   SQLite as bound parameters.
//! - Identifiers (aliases, columns, function names) are `'static` and come
//!   from path definitions, never from runtime input.

use super::predicate::Predicate;
use super::select::SubQuery;
use sea_query::{
    Alias, BinOper, CaseStatement, Expr, Func, Keyword, Order, SimpleExpr, SubQueryStatement,
};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// `alias.column` a typed expression reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnName {
    pub alias: &'static str,
    pub column: &'static str,
}

/// One select-list entry, optionally named.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub(crate) expr: SimpleExpr,
    pub(crate) alias: Option<&'static str>,
}

/// Right-hand side of a comparison or assignment.
///
/// Built from literals, typed expressions or subqueries via `From`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand(SimpleExpr);

impl Operand {
    pub fn null() -> Self {
        Self(SimpleExpr::Keyword(Keyword::Null))
    }

    pub fn into_expr(self) -> SimpleExpr {
        self.0
    }
}

macro_rules! literal_operand {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Self(Expr::val(value).into())
                }
            }
        )+
    };
}

literal_operand!(&str, String, i32, i64, f64, bool);

impl From<&String> for Operand {
    fn from(value: &String) -> Self {
        Self(Expr::val(value.as_str()).into())
    }
}

impl<T> From<TypedExpr<T>> for Operand {
    fn from(value: TypedExpr<T>) -> Self {
        Self(value.expr)
    }
}

impl<T> From<&TypedExpr<T>> for Operand {
    fn from(value: &TypedExpr<T>) -> Self {
        Self(value.expr.clone())
    }
}

impl<T> From<SubQuery<T>> for Operand {
    fn from(value: SubQuery<T>) -> Self {
        Self(subquery_expr(value))
    }
}

pub(crate) fn subquery_expr<T>(subquery: SubQuery<T>) -> SimpleExpr {
    SimpleExpr::SubQuery(
        None,
        Box::new(SubQueryStatement::SelectStatement(subquery.into_statement())),
    )
}

/// Expression whose result decodes to `T`.
pub struct TypedExpr<T> {
    expr: SimpleExpr,
    column: Option<ColumnName>,
    alias: Option<&'static str>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedExpr<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            column: self.column,
            alias: self.alias,
            _type: PhantomData,
        }
    }
}

impl<T> Debug for TypedExpr<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedExpr")
            .field("expr", &self.expr)
            .field("alias", &self.alias)
            .finish()
    }
}

impl<T> PartialEq for TypedExpr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr && self.alias == other.alias
    }
}

impl<T> TypedExpr<T> {
    pub(crate) fn new(expr: SimpleExpr) -> Self {
        Self {
            expr,
            column: None,
            alias: None,
            _type: PhantomData,
        }
    }

    /// `"alias"."column"`.
    pub(crate) fn column(alias: &'static str, column: &'static str) -> Self {
        Self {
            column: Some(ColumnName { alias, column }),
            ..Self::new(Expr::col((Alias::new(alias), Alias::new(column))).into())
        }
    }

    pub fn expr(&self) -> &SimpleExpr {
        &self.expr
    }

    pub fn into_expr(self) -> SimpleExpr {
        self.expr
    }

    /// The table column behind this expression, `None` for computed values.
    pub fn column_name(&self) -> Option<ColumnName> {
        self.column
    }

    pub fn select_item(&self) -> SelectItem {
        SelectItem {
            expr: self.expr.clone(),
            alias: self.alias,
        }
    }

    fn retype<U>(&self) -> TypedExpr<U> {
        TypedExpr {
            expr: self.expr.clone(),
            column: self.column,
            alias: self.alias,
            _type: PhantomData,
        }
    }

    fn lhs(&self) -> Expr {
        Expr::expr(self.expr.clone())
    }

    pub fn eq(&self, rhs: impl Into<Operand>) -> Predicate {
        Predicate::new(self.lhs().eq(rhs.into().into_expr()))
    }

    pub fn ne(&self, rhs: impl Into<Operand>) -> Predicate {
        Predicate::new(self.lhs().ne(rhs.into().into_expr()))
    }

    pub fn lt(&self, rhs: impl Into<Operand>) -> Predicate {
        Predicate::new(self.lhs().lt(rhs.into().into_expr()))
    }

    /// `<=`
    pub fn loe(&self, rhs: impl Into<Operand>) -> Predicate {
        Predicate::new(self.lhs().lte(rhs.into().into_expr()))
    }

    pub fn gt(&self, rhs: impl Into<Operand>) -> Predicate {
        Predicate::new(self.lhs().gt(rhs.into().into_expr()))
    }

    /// `>=`
    pub fn goe(&self, rhs: impl Into<Operand>) -> Predicate {
        Predicate::new(self.lhs().gte(rhs.into().into_expr()))
    }

    /// Inclusive range check.
    pub fn between(&self, low: impl Into<Operand>, high: impl Into<Operand>) -> Predicate {
        Predicate::new(
            self.lhs()
                .between(low.into().into_expr(), high.into().into_expr()),
        )
    }

    /// Membership in a literal list. An empty list matches nothing.
    pub fn in_list<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        Predicate::new(
            self.lhs()
                .is_in(values.into_iter().map(|value| value.into().into_expr())),
        )
    }

    /// Membership in the rows of a subquery.
    pub fn in_<U>(&self, subquery: SubQuery<U>) -> Predicate {
        Predicate::new(self.lhs().in_subquery(subquery.into_statement()))
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::new(self.lhs().is_null())
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::new(self.lhs().is_not_null())
    }

    pub fn asc(&self) -> OrderSpecifier {
        OrderSpecifier::new(self.expr.clone(), OrderDirection::Asc)
    }

    pub fn desc(&self) -> OrderSpecifier {
        OrderSpecifier::new(self.expr.clone(), OrderDirection::Desc)
    }

    /// `COUNT(expr)`; NULL values are not counted.
    pub fn count(&self) -> TypedExpr<i64> {
        TypedExpr::new(Func::count(self.expr.clone()).into())
    }

    /// Names this expression in the select list (`expr AS "alias"`).
    ///
    /// Only the select list sees the name; filters, grouping and ordering
    /// keep using the expression itself.
    pub fn as_(&self, alias: &'static str) -> TypedExpr<T> {
        TypedExpr {
            alias: Some(alias),
            ..self.clone()
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
    impl Sealed for Option<String> {}
}

/// Numeric expression types.
pub trait NumericType: sealed::Sealed {
    /// Decoded type of `SUM` over this type.
    type Sum;
}

impl NumericType for i32 {
    type Sum = i64;
}

impl NumericType for i64 {
    type Sum = i64;
}

impl NumericType for f64 {
    type Sum = f64;
}

/// Text expression types (nullable or not).
pub trait TextType: sealed::Sealed {}

impl TextType for String {}
impl TextType for Option<String> {}

impl<T: NumericType> TypedExpr<T> {
    /// `SUM(expr)`; `None` over an empty set.
    pub fn sum(&self) -> TypedExpr<Option<T::Sum>> {
        TypedExpr::new(Func::sum(self.expr.clone()).into())
    }

    /// `AVG(expr)`; `None` over an empty set.
    pub fn avg(&self) -> TypedExpr<Option<f64>> {
        TypedExpr::new(Func::avg(self.expr.clone()).into())
    }

    pub fn max(&self) -> TypedExpr<Option<T>> {
        TypedExpr::new(Func::max(self.expr.clone()).into())
    }

    pub fn min(&self) -> TypedExpr<Option<T>> {
        TypedExpr::new(Func::min(self.expr.clone()).into())
    }

    pub fn add(&self, rhs: impl Into<Operand>) -> TypedExpr<T> {
        TypedExpr::new(self.lhs().add(rhs.into().into_expr()))
    }

    pub fn subtract(&self, rhs: impl Into<Operand>) -> TypedExpr<T> {
        TypedExpr::new(self.lhs().sub(rhs.into().into_expr()))
    }

    pub fn multiply(&self, rhs: impl Into<Operand>) -> TypedExpr<T> {
        TypedExpr::new(self.lhs().mul(rhs.into().into_expr()))
    }

    /// `expr / rhs`. Integer operands divide with truncation, as in SQLite.
    pub fn divide(&self, rhs: impl Into<Operand>) -> TypedExpr<T> {
        TypedExpr::new(self.lhs().div(rhs.into().into_expr()))
    }

    /// `CAST(expr AS TEXT)`.
    pub fn string_value(&self) -> TypedExpr<String> {
        TypedExpr::new(Func::cast_as(self.expr.clone(), Alias::new("TEXT")).into())
    }

    /// Starts a simple `CASE` on this expression.
    pub fn when(&self, value: impl Into<Operand>) -> SimpleCaseWhen {
        SimpleCaseWhen {
            operand: self.expr.clone(),
            case: None,
            value: value.into().into_expr(),
        }
    }
}

impl<T: TextType> TypedExpr<T> {
    /// `expr || rhs`. The result is NULL whenever either side is NULL.
    pub fn concat(&self, rhs: impl Into<Operand>) -> TypedExpr<Option<String>> {
        TypedExpr::new(SimpleExpr::Binary(
            Box::new(self.expr.clone()),
            BinOper::Custom("||"),
            Box::new(rhs.into().into_expr()),
        ))
    }

    pub fn lower(&self) -> TypedExpr<T> {
        TypedExpr::new(Func::lower(self.expr.clone()).into())
    }

    pub fn upper(&self) -> TypedExpr<T> {
        TypedExpr::new(Func::upper(self.expr.clone()).into())
    }

    /// `replace(expr, from, to)`.
    pub fn replace(&self, from: impl Into<Operand>, to: impl Into<Operand>) -> TypedExpr<T> {
        sql_function(
            "replace",
            [Operand::from(self), from.into(), to.into()],
        )
    }

    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        Predicate::new(self.lhs().like(pattern.into()))
    }

    /// `LIKE '%value%'` with the pattern bound as a parameter.
    pub fn contains(&self, value: &str) -> Predicate {
        self.like(format!("%{value}%"))
    }

    /// Same expression, decoded as nullable text.
    pub fn nullable(&self) -> TypedExpr<Option<String>> {
        self.retype()
    }
}

/// Text constant projected as-is into every row.
pub fn constant(value: &str) -> TypedExpr<String> {
    TypedExpr::new(Expr::val(value).into())
}

/// Calls an SQLite scalar function by name.
///
/// The decoded type `T` is chosen by the caller and must match what the
/// function returns.
pub fn sql_function<T>(
    name: &'static str,
    args: impl IntoIterator<Item = Operand>,
) -> TypedExpr<T> {
    let args: Vec<SimpleExpr> = args.into_iter().map(Operand::into_expr).collect();
    TypedExpr::new(Func::cust(Alias::new(name)).args(args).into())
}

/// Pending `WHEN value` arm of a simple `CASE`.
///
/// Lowered to a searched `CASE WHEN operand = value`, which SQLite
/// evaluates the same way.
#[derive(Debug, Clone)]
pub struct SimpleCaseWhen {
    operand: SimpleExpr,
    case: Option<CaseStatement>,
    value: SimpleExpr,
}

impl SimpleCaseWhen {
    pub fn then(self, result: impl Into<Operand>) -> SimpleCase {
        let condition = Expr::expr(self.operand.clone()).eq(self.value);
        let result = result.into().into_expr();
        let case = match self.case {
            Some(case) => case.case(condition, result),
            None => Expr::case(condition, result),
        };
        SimpleCase {
            operand: self.operand,
            case,
        }
    }
}

/// Simple `CASE` with at least one arm.
#[derive(Debug, Clone)]
pub struct SimpleCase {
    operand: SimpleExpr,
    case: CaseStatement,
}

impl SimpleCase {
    pub fn when(self, value: impl Into<Operand>) -> SimpleCaseWhen {
        SimpleCaseWhen {
            operand: self.operand,
            case: Some(self.case),
            value: value.into().into_expr(),
        }
    }

    pub fn otherwise(self, result: impl Into<Operand>) -> TypedExpr<String> {
        TypedExpr::new(self.case.finally(result.into().into_expr()).into())
    }
}

/// Searched `CASE WHEN condition THEN … ELSE … END` builder.
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    case: Option<CaseStatement>,
}

/// Pending `WHEN condition` arm of a [`CaseBuilder`].
#[derive(Debug, Clone)]
pub struct CaseBuilderWhen {
    case: Option<CaseStatement>,
    condition: Predicate,
}

impl CaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(self, condition: Predicate) -> CaseBuilderWhen {
        CaseBuilderWhen {
            case: self.case,
            condition,
        }
    }

    /// Closes the expression. Without arms this is just `result`.
    pub fn otherwise(self, result: impl Into<Operand>) -> TypedExpr<String> {
        let result = result.into().into_expr();
        match self.case {
            Some(case) => TypedExpr::new(case.finally(result).into()),
            None => TypedExpr::new(result),
        }
    }
}

impl CaseBuilderWhen {
    pub fn then(self, result: impl Into<Operand>) -> CaseBuilder {
        let condition = self.condition.into_condition();
        let result = result.into().into_expr();
        let case = match self.case {
            Some(case) => case.case(condition, result),
            None => Expr::case(condition, result),
        };
        CaseBuilder { case: Some(case) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub(crate) fn to_order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Placement of NULL values in an ordering. `Default` defers to SQLite,
/// which sorts NULLs first ascending and last descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    Default,
    First,
    Last,
}

impl NullOrdering {
    pub(crate) fn to_sea(self) -> Option<sea_query::NullOrdering> {
        match self {
            Self::Default => None,
            Self::First => Some(sea_query::NullOrdering::First),
            Self::Last => Some(sea_query::NullOrdering::Last),
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpecifier {
    pub(crate) expr: SimpleExpr,
    pub(crate) direction: OrderDirection,
    pub(crate) nulls: NullOrdering,
}

impl OrderSpecifier {
    fn new(expr: SimpleExpr, direction: OrderDirection) -> Self {
        Self {
            expr,
            direction,
            nulls: NullOrdering::Default,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullOrdering::First;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullOrdering::Last;
        self
    }
}
