//! Column expressions for filtering and deriving.
//!
//! Expressions are evaluated over a whole table and produce one value per row.
//! Missing values propagate: arithmetic or comparison with `Null` yields
//! `Null`, and a `Null` predicate drops the row in a filter.
//!
//! Conditional branching follows first-match-wins semantics. A row that
//! matches no branch and has no `otherwise` yields `Null`: gaps between the
//! branch conditions stay visibly undefined.
//!
//! ```rust
//! use tidyviz::table::{col, lit, when};
//!
//! let size_class = when(col("age").lt(lit(1000)))
//!     .then(lit("young"))
//!     .when(col("age").between(lit(1000), lit(2000)))
//!     .then(lit("adult"))
//!     .otherwise(lit("old"));
//! assert_eq!(size_class.columns(), vec!["age"]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use super::value::{DataType, Value};
use super::Table;
use crate::error::{Error, Result};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (always produces a float; division by zero is `Null`)
    Div,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// Logical and.
    And,
    /// Logical or.
    Or,
}

impl BinaryOp {
    const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }
}

/// A column expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Reference to a column.
    Column(String),
    /// A constant, broadcast to every row.
    Literal(Value),
    /// A binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Logical negation.
    Not(Box<Expr>),
    /// `true` where the operand is missing.
    IsNull(Box<Expr>),
    /// Inclusive range test `low <= expr <= high`.
    Between {
        /// Tested expression.
        expr: Box<Expr>,
        /// Lower bound (inclusive).
        low: Box<Expr>,
        /// Upper bound (inclusive).
        high: Box<Expr>,
    },
    /// Conditional branches, first match wins.
    When {
        /// `(condition, value)` pairs.
        branches: Vec<(Expr, Expr)>,
        /// Value where no branch matches.
        otherwise: Box<Expr>,
    },
}

/// Reference a column by name.
#[must_use]
pub fn col(name: &str) -> Expr {
    Expr::Column(name.to_string())
}

/// A literal value.
#[must_use]
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// Start a conditional expression.
#[must_use]
pub fn when(condition: Expr) -> When {
    When {
        branches: Vec::new(),
        condition,
    }
}

/// A conditional awaiting the value of its latest branch.
#[derive(Debug, Clone)]
pub struct When {
    branches: Vec<(Expr, Expr)>,
    condition: Expr,
}

impl When {
    /// Value produced where the pending condition holds.
    #[must_use]
    pub fn then(mut self, value: Expr) -> Then {
        self.branches.push((self.condition, value));
        Then {
            branches: self.branches,
        }
    }
}

/// A conditional with at least one complete branch.
#[derive(Debug, Clone)]
pub struct Then {
    branches: Vec<(Expr, Expr)>,
}

impl Then {
    /// Add another branch.
    #[must_use]
    pub fn when(self, condition: Expr) -> When {
        When {
            branches: self.branches,
            condition,
        }
    }

    /// Value where no branch matches.
    #[must_use]
    pub fn otherwise(self, value: Expr) -> Expr {
        Expr::When {
            branches: self.branches,
            otherwise: Box::new(value),
        }
    }
}

impl From<Then> for Expr {
    /// Close the conditional; unmatched rows become `Null`.
    fn from(then: Then) -> Self {
        then.otherwise(Expr::Literal(Value::Null))
    }
}

macro_rules! binary_methods {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(self, other: Expr) -> Expr {
                self.binary(BinaryOp::$op, other)
            }
        )*
    };
}

impl Expr {
    fn binary(self, op: BinaryOp, other: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    binary_methods! {
        /// `self == other`
        eq => Eq,
        /// `self != other`
        neq => NotEq,
        /// `self < other`
        lt => Lt,
        /// `self <= other`
        lt_eq => LtEq,
        /// `self > other`
        gt => Gt,
        /// `self >= other`
        gt_eq => GtEq,
        /// Logical and.
        and => And,
        /// Logical or.
        or => Or,
    }

    /// Logical negation.
    #[must_use]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// `true` where the value is missing.
    #[must_use]
    pub fn is_null(self) -> Expr {
        Expr::IsNull(Box::new(self))
    }

    /// Inclusive range test.
    #[must_use]
    pub fn between(self, low: Expr, high: Expr) -> Expr {
        Expr::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    /// Names of all referenced columns, in first-reference order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Literal(_) => {}
            Expr::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Not(e) | Expr::IsNull(e) => e.collect_columns(out),
            Expr::Between { expr, low, high } => {
                expr.collect_columns(out);
                low.collect_columns(out);
                high.collect_columns(out);
            }
            Expr::When {
                branches,
                otherwise,
            } => {
                for (cond, value) in branches {
                    cond.collect_columns(out);
                    value.collect_columns(out);
                }
                otherwise.collect_columns(out);
            }
        }
    }

    /// Evaluate over every row of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for an unknown column (checked before any
    /// row is evaluated) and [`Error::TypeMismatch`] for ill-typed operands.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<Value>> {
        table.require(&self.columns())?;
        self.eval(table)
    }

    /// Evaluate as a predicate: `true` rows only, `Null` counts as `false`.
    ///
    /// # Errors
    ///
    /// As [`Expr::evaluate`], plus [`Error::TypeMismatch`] if a value is not
    /// boolean.
    pub fn evaluate_mask(&self, table: &Table) -> Result<Vec<bool>> {
        self.evaluate(table)?
            .into_iter()
            .map(|v| match v {
                Value::Bool(b) => Ok(b),
                Value::Null => Ok(false),
                other => Err(self.mismatch(DataType::Bool, other.dtype())),
            })
            .collect()
    }

    fn eval(&self, table: &Table) -> Result<Vec<Value>> {
        let n = table.nrow();
        match self {
            Expr::Column(name) => Ok(table.column(name)?.values().to_vec()),
            Expr::Literal(v) => Ok(vec![v.clone(); n]),
            Expr::Binary { op, left, right } => {
                let l = left.eval(table)?;
                let r = right.eval(table)?;
                l.into_iter()
                    .zip(r)
                    .map(|(a, b)| self.apply(*op, a, b))
                    .collect()
            }
            Expr::Not(e) => e
                .eval(table)?
                .into_iter()
                .map(|v| match v {
                    Value::Bool(b) => Ok(Value::Bool(!b)),
                    Value::Null => Ok(Value::Null),
                    other => Err(self.mismatch(DataType::Bool, other.dtype())),
                })
                .collect(),
            Expr::IsNull(e) => Ok(e.eval(table)?.iter().map(|v| Value::Bool(v.is_null())).collect()),
            Expr::Between { expr, low, high } => {
                let v = expr.eval(table)?;
                let lo = low.eval(table)?;
                let hi = high.eval(table)?;
                v.into_iter()
                    .zip(lo)
                    .zip(hi)
                    .map(|((v, lo), hi)| {
                        let above = self.apply(BinaryOp::GtEq, v.clone(), lo)?;
                        let below = self.apply(BinaryOp::LtEq, v, hi)?;
                        self.apply(BinaryOp::And, above, below)
                    })
                    .collect()
            }
            Expr::When {
                branches,
                otherwise,
            } => {
                let mut out = otherwise.eval(table)?;
                let mut decided = vec![false; n];
                for (cond, value) in branches {
                    let mask = cond.evaluate_mask(table)?;
                    let values = value.eval(table)?;
                    for (row, v) in values.into_iter().enumerate() {
                        if mask[row] && !decided[row] {
                            out[row] = v;
                            decided[row] = true;
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    fn apply(&self, op: BinaryOp, a: Value, b: Value) -> Result<Value> {
        match op {
            BinaryOp::And | BinaryOp::Or => self.logical(op, &a, &b),
            _ if a.is_null() || b.is_null() => Ok(Value::Null),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                self.arithmetic(op, &a, &b)
            }
            _ => self.compare(op, &a, &b),
        }
    }

    fn arithmetic(&self, op: BinaryOp, a: &Value, b: &Value) -> Result<Value> {
        if let (Value::Int(x), Value::Int(y)) = (a, b) {
            let exact = match op {
                BinaryOp::Add => x.checked_add(*y),
                BinaryOp::Sub => x.checked_sub(*y),
                BinaryOp::Mul => x.checked_mul(*y),
                _ => None,
            };
            if let Some(v) = exact {
                return Ok(Value::Int(v));
            }
        }
        let (x, y) = match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => (x, y),
            (None, _) => return Err(self.mismatch(DataType::Float, a.dtype())),
            (_, None) => return Err(self.mismatch(DataType::Float, b.dtype())),
        };
        Ok(match op {
            BinaryOp::Add => Value::Float(x + y),
            BinaryOp::Sub => Value::Float(x - y),
            BinaryOp::Mul => Value::Float(x * y),
            _ if y == 0.0 => Value::Null,
            _ => Value::Float(x / y),
        })
    }

    fn compare(&self, op: BinaryOp, a: &Value, b: &Value) -> Result<Value> {
        let comparable = a.dtype() == b.dtype() || (a.dtype().is_numeric() && b.dtype().is_numeric());
        if !comparable {
            return Err(self.mismatch(a.dtype(), b.dtype()));
        }
        let ord = a.total_cmp(b);
        Ok(Value::Bool(match op {
            BinaryOp::Eq => ord == Ordering::Equal,
            BinaryOp::NotEq => ord != Ordering::Equal,
            BinaryOp::Lt => ord == Ordering::Less,
            BinaryOp::LtEq => ord != Ordering::Greater,
            BinaryOp::Gt => ord == Ordering::Greater,
            _ => ord != Ordering::Less,
        }))
    }

    /// Three-valued logic: `false & NA` is `false`, `true | NA` is `true`.
    fn logical(&self, op: BinaryOp, a: &Value, b: &Value) -> Result<Value> {
        let as_bool = |v: &Value| match v {
            Value::Bool(x) => Ok(Some(*x)),
            Value::Null => Ok(None),
            other => Err(self.mismatch(DataType::Bool, other.dtype())),
        };
        let (x, y) = (as_bool(a)?, as_bool(b)?);
        let dominant = op == BinaryOp::Or;
        Ok(match (x, y) {
            (Some(x), _) if x == dominant => Value::Bool(dominant),
            (_, Some(y)) if y == dominant => Value::Bool(dominant),
            (Some(_), Some(_)) => Value::Bool(!dominant),
            _ => Value::Null,
        })
    }

    fn mismatch(&self, expected: DataType, found: DataType) -> Error {
        Error::TypeMismatch {
            column: self.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => f.write_str(name),
            Expr::Literal(Value::Text(s)) => write!(f, "\"{s}\""),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Not(e) => write!(f, "!{e}"),
            Expr::IsNull(e) => write!(f, "is.na({e})"),
            Expr::Between { expr, low, high } => write!(f, "between({expr}, {low}, {high})"),
            Expr::When {
                branches,
                otherwise,
            } => {
                f.write_str("case_when(")?;
                for (cond, value) in branches {
                    write!(f, "{cond} ~ {value}, ")?;
                }
                write!(f, "TRUE ~ {otherwise})")
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Mul, rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Div, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn specimens() -> Table {
        Table::new(vec![
            Column::text("colour", &["blue", "blue", "black", "black", "black"]),
            Column::int("age", &[1000, 1500, 500, 1200, 1800]),
            Column::new(
                "mass",
                vec![
                    Value::Float(2.0),
                    Value::Null,
                    Value::Float(4.0),
                    Value::Float(1.0),
                    Value::Float(3.0),
                ],
            )
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_arithmetic_keeps_ints() {
        let t = specimens();
        let out = (col("age") + lit(1)).evaluate(&t).unwrap();
        assert_eq!(out[0], Value::Int(1001));
    }

    #[test]
    fn test_division_is_float_and_zero_is_null() {
        let t = specimens();
        let out = (col("age") / lit(1000)).evaluate(&t).unwrap();
        assert_eq!(out[1], Value::Float(1.5));
        let out = (col("age") / lit(0)).evaluate(&t).unwrap();
        assert!(out.iter().all(Value::is_null));
    }

    #[test]
    fn test_null_propagates_through_arithmetic() {
        let t = specimens();
        let out = (col("mass") * lit(2.0)).evaluate(&t).unwrap();
        assert_eq!(out[0], Value::Float(4.0));
        assert!(out[1].is_null());
    }

    #[test]
    fn test_mask_treats_null_as_false() {
        let t = specimens();
        let mask = col("mass").gt(lit(1.5)).evaluate_mask(&t).unwrap();
        assert_eq!(mask, vec![true, false, true, false, true]);
    }

    #[test]
    fn test_three_valued_logic() {
        let t = specimens();
        let out = col("mass")
            .gt(lit(10.0))
            .and(col("colour").eq(lit("blue")))
            .evaluate(&t)
            .unwrap();
        // row 1: NA & true = NA; row 2: false & false = false
        assert!(out[1].is_null());
        assert_eq!(out[2], Value::Bool(false));

        let out = col("mass")
            .gt(lit(10.0))
            .or(col("colour").eq(lit("blue")))
            .evaluate(&t)
            .unwrap();
        assert_eq!(out[1], Value::Bool(true));
    }

    #[test]
    fn test_between_is_inclusive() {
        let t = specimens();
        let mask = col("age").between(lit(1000), lit(1500)).evaluate_mask(&t).unwrap();
        assert_eq!(mask, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_when_first_match_wins() {
        let t = specimens();
        let e = when(col("age").gt(lit(0)))
            .then(lit("first"))
            .when(col("age").gt(lit(1000)))
            .then(lit("second"))
            .otherwise(lit("none"));
        let out = e.evaluate(&t).unwrap();
        assert!(out.iter().all(|v| v.as_str() == Some("first")));
    }

    #[test]
    fn test_when_without_otherwise_is_null() {
        let t = specimens();
        let e: Expr = when(col("colour").eq(lit("blue"))).then(lit(1)).into();
        let out = e.evaluate(&t).unwrap();
        assert_eq!(out[0], Value::Int(1));
        assert!(out[2].is_null());
    }

    #[test]
    fn test_unknown_column_is_schema_error() {
        let t = specimens();
        let err = col("wings").gt(lit(1)).evaluate(&t).unwrap_err();
        assert!(matches!(err, Error::Schema { column, .. } if column == "wings"));
    }

    #[test]
    fn test_comparing_text_with_number_fails() {
        let t = specimens();
        let err = col("colour").gt(lit(1)).evaluate(&t).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_columns_listed_once() {
        let e = col("a").gt(col("b")).and(col("a").lt(lit(3)));
        assert_eq!(e.columns(), vec!["a", "b"]);
    }

    #[test]
    fn test_display() {
        let e = col("colour").eq(lit("blue")).and(col("age").lt(lit(1200)));
        assert_eq!(e.to_string(), "((colour == \"blue\") & (age < 1200))");
    }
}
