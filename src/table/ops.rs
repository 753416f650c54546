//! Row and column operators: filter, select, rename, derive, arrange.

use std::collections::HashSet;

use tracing::debug;

use super::expr::Expr;
use super::value::KeyPart;
use super::{Column, ColumnRef, Table};
use crate::error::Result;

/// Sort key for [`Table::arrange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Column to sort by.
    pub column: String,
    /// Sort largest first.
    pub descending: bool,
}

impl SortKey {
    /// Ascending order on a column.
    #[must_use]
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: false,
        }
    }

    /// Descending order on a column.
    #[must_use]
    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: true,
        }
    }
}

impl From<&str> for SortKey {
    fn from(s: &str) -> Self {
        SortKey::asc(s)
    }
}

impl Table {
    /// Keep rows where `predicate` is `true`.
    ///
    /// Rows where it is `false` or missing are dropped. An empty result is
    /// valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) if the predicate names an unknown column and
    /// [`Error::TypeMismatch`](crate::Error::TypeMismatch) if it is not boolean.
    pub fn filter(&self, predicate: &Expr) -> Result<Table> {
        let mask = predicate.evaluate_mask(self)?;
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        debug!(rows_in = self.nrow(), rows_out = keep.len(), %predicate, "filter");
        Ok(self.take_rows(&keep))
    }

    /// Keep the given columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) or [`Error::ColumnIndex`](crate::Error::ColumnIndex) for unknown
    /// references and [`Error::DuplicateColumn`](crate::Error::DuplicateColumn) if a column is selected twice.
    pub fn select<C: Into<ColumnRef> + Clone>(&self, columns: &[C]) -> Result<Table> {
        let mut out = Vec::with_capacity(columns.len());
        for c in columns {
            let pos = self.position(&c.clone().into())?;
            out.push(self.columns()[pos].clone());
        }
        Table::new(out)
    }

    /// Select and rename in one step: each pair is `(new_name, column)`.
    ///
    /// # Errors
    ///
    /// As [`Table::select`].
    pub fn select_as<C: Into<ColumnRef> + Clone>(&self, columns: &[(&str, C)]) -> Result<Table> {
        let mut out = Vec::with_capacity(columns.len());
        for (name, c) in columns {
            let pos = self.position(&c.clone().into())?;
            out.push(self.columns()[pos].clone().renamed(*name));
        }
        Table::new(out)
    }

    /// Rename columns: each pair is `(old_name, new_name)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) for an unknown old name and
    /// [`Error::DuplicateColumn`](crate::Error::DuplicateColumn) if a new name collides.
    pub fn rename(&self, pairs: &[(&str, &str)]) -> Result<Table> {
        let mut columns = self.columns().to_vec();
        for (old, new) in pairs {
            let pos = self.position(&ColumnRef::from(*old))?;
            columns[pos] = columns[pos].clone().renamed(*new);
        }
        Table::new(columns)
    }

    /// Add (or replace) a column computed from an expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) for unknown columns and
    /// [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the result is not homogeneously typed.
    pub fn derive(&self, name: &str, expr: &Expr) -> Result<Table> {
        let values = expr.evaluate(self)?;
        let column = Column::new(name, values)?;
        debug!(column = name, %expr, "derive");
        self.clone().with_column(column)
    }

    /// Add several columns; later expressions see earlier results.
    ///
    /// # Errors
    ///
    /// As [`Table::derive`].
    pub fn derive_many(&self, exprs: &[(&str, Expr)]) -> Result<Table> {
        exprs
            .iter()
            .try_fold(self.clone(), |table, (name, expr)| table.derive(name, expr))
    }

    /// Sort rows by one or more keys. The sort is stable and `Null` sorts last
    /// in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) for unknown key columns.
    pub fn arrange<K: Into<SortKey> + Clone>(&self, keys: &[K]) -> Result<Table> {
        let keys: Vec<SortKey> = keys.iter().cloned().map(Into::into).collect();
        let columns = keys
            .iter()
            .map(|k| self.column(&k.column))
            .collect::<Result<Vec<_>>>()?;
        let mut rows: Vec<usize> = (0..self.nrow()).collect();
        rows.sort_by(|&a, &b| {
            keys.iter()
                .zip(&columns)
                .map(|(k, c)| {
                    let ord = c.values()[a].total_cmp(&c.values()[b]);
                    if k.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(self.take_rows(&rows))
    }

    /// Keep the first row of each distinct combination of `columns`
    /// (all columns when empty), preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) for unknown columns.
    pub fn distinct(&self, columns: &[&str]) -> Result<Table> {
        let keyed: Vec<&Column> = if columns.is_empty() {
            self.columns().iter().collect()
        } else {
            columns.iter().map(|c| self.column(c)).collect::<Result<_>>()?
        };
        let mut seen = HashSet::new();
        let rows: Vec<usize> = (0..self.nrow())
            .filter(|&r| {
                let key: Vec<KeyPart> = keyed.iter().map(|c| KeyPart::from(&c.values()[r])).collect();
                seen.insert(key)
            })
            .collect();
        Ok(self.take_rows(&rows))
    }

    /// The first `n` rows.
    #[must_use]
    pub fn head(&self, n: usize) -> Table {
        let rows: Vec<usize> = (0..self.nrow().min(n)).collect();
        self.take_rows(&rows)
    }
}
