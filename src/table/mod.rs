//! Tabular data and the relational transform stage.
//!
//! A [`Table`] is an ordered list of uniquely named, homogeneously typed
//! [`Column`]s of equal length. Every operator in this module is pure: it
//! borrows its input and returns a new table.
//!
//! # Example
//!
//! ```rust
//! use tidyviz::table::{col, lit, Column, Table};
//!
//! let specimens = Table::new(vec![
//!     Column::text("colour", &["blue", "black", "black"]),
//!     Column::int("age", &[900, 1500, 2100]),
//! ])
//! .unwrap();
//!
//! let old = specimens.filter(&col("age").gt(lit(1000))).unwrap();
//! assert_eq!(old.nrow(), 2);
//! ```

mod aggregate;
mod expr;
mod join;
mod loader;
mod ops;
mod pipeline;
mod reshape;
mod value;

pub use aggregate::{AggFn, Aggregation, GroupBy};
pub use expr::{col, lit, when, BinaryOp, Expr, Then, When};
pub use loader::read_csv;
pub use ops::SortKey;
pub use pipeline::{Pipeline, Step};
pub use value::{DataType, Value};

use std::fmt;

use crate::error::{Error, Result};

/// A named, homogeneously typed column.
///
/// Equality compares names and values. A column holding only missing values
/// equals one of any type with the same missing values.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    dtype: DataType,
    values: Vec<Value>,
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.values == other.values
    }
}

impl Column {
    /// Create a column, inferring its type.
    ///
    /// Mixed `Int`/`Float` values are widened to `Float`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the values do not share a type.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        let mut dtype = DataType::Null;
        for v in &values {
            dtype = dtype.unify(v.dtype()).ok_or_else(|| Error::TypeMismatch {
                column: name.clone(),
                expected: dtype.to_string(),
                found: v.dtype().to_string(),
            })?;
        }
        let values = if dtype == DataType::Float {
            values.into_iter().map(|v| v.cast(DataType::Float)).collect()
        } else {
            values
        };
        Ok(Self { name, dtype, values })
    }

    /// Create a float column.
    #[must_use]
    pub fn float(name: impl Into<String>, data: &[f64]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Float,
            values: data.iter().map(|&v| Value::Float(v)).collect(),
        }
    }

    /// Create an integer column.
    #[must_use]
    pub fn int(name: impl Into<String>, data: &[i64]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Int,
            values: data.iter().map(|&v| Value::Int(v)).collect(),
        }
    }

    /// Create a text column.
    #[must_use]
    pub fn text(name: impl Into<String>, data: &[&str]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Text,
            values: data.iter().map(|&s| Value::Text(s.to_string())).collect(),
        }
    }

    /// Create a boolean column.
    #[must_use]
    pub fn bool(name: impl Into<String>, data: &[bool]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Bool,
            values: data.iter().map(|&b| Value::Bool(b)).collect(),
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    #[must_use]
    pub const fn dtype(&self) -> DataType {
        self.dtype
    }

    /// All values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a row.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Values as optional floats (`None` for missing or non-numeric cells).
    #[must_use]
    pub fn to_f64(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Same column under a new name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Distinct non-missing values in sorted order.
    #[must_use]
    pub fn levels(&self) -> Vec<Value> {
        let mut levels: Vec<Value> = Vec::new();
        for v in &self.values {
            if !v.is_null() && !levels.iter().any(|l| l.key_eq(v)) {
                levels.push(v.clone());
            }
        }
        levels.sort_by(Value::total_cmp);
        levels
    }

    pub(crate) fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
        }
    }

    /// Like [`Column::take`], with `None` producing a missing value.
    pub(crate) fn take_optional(&self, rows: &[Option<usize>]) -> Column {
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            values: rows
                .iter()
                .map(|r| r.map_or(Value::Null, |r| self.values[r].clone()))
                .collect(),
        }
    }
}

/// Reference to a column by name or zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// By name.
    Name(String),
    /// By position.
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        ColumnRef::Name(s.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::Name(s)
    }
}

impl From<usize> for ColumnRef {
    fn from(i: usize) -> Self {
        ColumnRef::Index(i)
    }
}

/// An ordered collection of equal-length, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    nrow: usize,
}

impl Table {
    /// Create a table from columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumn`] for repeated names and
    /// [`Error::RaggedColumns`] when lengths disagree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let nrow = columns.first().map_or(0, Column::len);
        for (i, c) in columns.iter().enumerate() {
            if c.len() != nrow {
                return Err(Error::RaggedColumns {
                    column: c.name.clone(),
                    expected: nrow,
                    found: c.len(),
                });
            }
            if columns[..i].iter().any(|other| other.name == c.name) {
                return Err(Error::DuplicateColumn(c.name.clone()));
            }
        }
        Ok(Self { columns, nrow })
    }

    /// Create a table with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get number of rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Get number of columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// All columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Check if a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get a column by name, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] naming the column when it does not exist.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get(name).ok_or_else(|| Error::schema(name, &self.column_names()))
    }

    /// Resolve a [`ColumnRef`] to a position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] or [`Error::ColumnIndex`].
    pub fn position(&self, column: &ColumnRef) -> Result<usize> {
        match column {
            ColumnRef::Name(name) => self
                .columns
                .iter()
                .position(|c| &c.name == name)
                .ok_or_else(|| Error::schema(name, &self.column_names())),
            ColumnRef::Index(i) if *i < self.columns.len() => Ok(*i),
            ColumnRef::Index(i) => Err(Error::ColumnIndex {
                index: *i,
                ncol: self.columns.len(),
            }),
        }
    }

    /// Fail with [`Error::Schema`] unless every name is a column.
    ///
    /// # Errors
    ///
    /// Names the first missing column.
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.column(name.as_ref())?;
        }
        Ok(())
    }

    /// Value at (row, column).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for an unknown column.
    pub fn value(&self, row: usize, name: &str) -> Result<&Value> {
        const NULL: &Value = &Value::Null;
        Ok(self.column(name)?.get(row).unwrap_or(NULL))
    }

    /// A borrowed view of one row.
    #[must_use]
    pub fn row(&self, index: usize) -> Row<'_> {
        Row { table: self, index }
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.nrow).map(move |index| Row { table: self, index })
    }

    /// Add a column, replacing any column with the same name in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RaggedColumns`] if the length does not match.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        if !self.columns.is_empty() && column.len() != self.nrow {
            let found = column.len();
            return Err(Error::RaggedColumns {
                column: column.name,
                expected: self.nrow,
                found,
            });
        }
        if self.columns.is_empty() {
            self.nrow = column.len();
        }
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(i) => self.columns[i] = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    /// Table restricted to the given rows, in the given order.
    pub(crate) fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            nrow: rows.len(),
        }
    }
}

/// A borrowed row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Row position in its table.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Value of a column in this row.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.table.get(name).and_then(|c| c.get(self.index))
    }

    /// All values in column order.
    #[must_use]
    pub fn values(&self) -> Vec<&'a Value> {
        self.table.columns.iter().map(|c| &c.values[self.index]).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_ROWS: usize = 10;
        let shown = self.nrow.min(MAX_ROWS);
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                let mut cells = vec![c.name.clone(), format!("<{}>", c.dtype)];
                cells.extend(c.values[..shown].iter().map(ToString::to_string));
                cells
            })
            .collect();
        let widths: Vec<usize> =
            cells.iter().map(|c| c.iter().map(String::len).max().unwrap_or(0)).collect();

        writeln!(f, "# A table: {} x {}", self.nrow, self.columns.len())?;
        for line in 0..shown + 2 {
            let row: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:>w$}", c[line], w = *w))
                .collect();
            writeln!(f, "{}", row.join("  "))?;
        }
        if self.nrow > shown {
            writeln!(f, "# ... with {} more rows", self.nrow - shown)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::text("colour", &["blue", "black", "blue"]),
            Column::int("age", &[900, 1500, 2100]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_new() {
        let t = sample();
        assert_eq!(t.nrow(), 3);
        assert_eq!(t.ncol(), 2);
        assert_eq!(t.column_names(), vec!["colour", "age"]);
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let err = Table::new(vec![Column::int("a", &[1]), Column::int("a", &[2])]).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let err = Table::new(vec![Column::int("a", &[1, 2]), Column::int("b", &[2])]).unwrap_err();
        assert!(matches!(err, Error::RaggedColumns { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_column_missing_is_schema_error() {
        let err = sample().column("mass").unwrap_err();
        match err {
            Error::Schema { column, available } => {
                assert_eq!(column, "mass");
                assert_eq!(available, vec!["colour", "age"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_column_new_widens_ints() {
        let c = Column::new("x", vec![Value::Int(1), Value::Float(2.5), Value::Null]).unwrap();
        assert_eq!(c.dtype(), DataType::Float);
        assert_eq!(c.get(0), Some(&Value::Float(1.0)));
    }

    #[test]
    fn test_column_new_rejects_mixed_types() {
        let err = Column::new("x", vec![Value::Int(1), Value::from("a")]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_position_by_index() {
        let t = sample();
        assert_eq!(t.position(&ColumnRef::Index(1)).unwrap(), 1);
        assert!(matches!(
            t.position(&ColumnRef::Index(5)),
            Err(Error::ColumnIndex { index: 5, ncol: 2 })
        ));
    }

    #[test]
    fn test_row_view() {
        let t = sample();
        let r = t.row(1);
        assert_eq!(r.get("colour").and_then(Value::as_str), Some("black"));
        assert_eq!(r.get("age").and_then(Value::as_f64), Some(1500.0));
        assert!(r.get("missing").is_none());
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let t = sample().with_column(Column::int("colour", &[1, 2, 3])).unwrap();
        assert_eq!(t.column_names(), vec!["colour", "age"]);
        assert_eq!(t.column("colour").unwrap().dtype(), DataType::Int);
    }

    #[test]
    fn test_empty_columns_equal_regardless_of_type() {
        let typed = Column::float("x", &[1.0]).take(&[]);
        let inferred = Column::new("x", Vec::new()).unwrap();
        assert_eq!(typed, inferred);
        assert_ne!(typed.dtype(), inferred.dtype());
        assert_ne!(Column::float("x", &[1.0]), Column::float("y", &[1.0]));
    }

    #[test]
    fn test_with_column_rejects_ragged() {
        let err = sample().with_column(Column::int("mass", &[1, 2])).unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedColumns { ref column, expected: 3, found: 2 } if column == "mass"
        ));
    }

    #[test]
    fn test_levels_sorted_distinct() {
        let t = sample();
        let levels = t.column("colour").unwrap().levels();
        assert_eq!(levels, vec![Value::from("black"), Value::from("blue")]);
    }

    #[test]
    fn test_display() {
        let s = sample().to_string();
        assert!(s.contains("# A table: 3 x 2"));
        assert!(s.contains("colour"));
        assert!(s.contains("<int>"));
    }
}
