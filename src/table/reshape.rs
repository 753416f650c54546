//! Long/wide reshaping.

use std::collections::HashMap;

use tracing::debug;

use super::value::{DataType, KeyPart, Value};
use super::{Column, Table};
use crate::error::{Error, Result};

impl Table {
    /// Gather value columns into `names_to`/`values_to` pairs.
    ///
    /// Each input row yields one output row per column in `cols`, in column
    /// order. The remaining (id) columns are replicated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for unknown columns,
    /// [`Error::TypeMismatch`] if the value columns have no common type and
    /// [`Error::DuplicateColumn`] if an output name clashes with an id column.
    pub fn pivot_longer(&self, cols: &[&str], names_to: &str, values_to: &str) -> Result<Table> {
        let value_columns = cols.iter().map(|c| self.column(c)).collect::<Result<Vec<_>>>()?;
        let mut dtype = DataType::Null;
        for c in &value_columns {
            dtype = dtype.unify(c.dtype()).ok_or_else(|| Error::TypeMismatch {
                column: c.name().to_string(),
                expected: dtype.to_string(),
                found: c.dtype().to_string(),
            })?;
        }

        let ids: Vec<&Column> = self
            .columns()
            .iter()
            .filter(|c| !cols.contains(&c.name()))
            .collect();

        let width = value_columns.len();
        let source_rows: Vec<usize> =
            (0..self.nrow()).flat_map(|r| std::iter::repeat(r).take(width)).collect();

        let mut columns: Vec<Column> = ids.iter().map(|c| c.take(&source_rows)).collect();
        let names = (0..self.nrow())
            .flat_map(|_| value_columns.iter().map(|c| Value::from(c.name())))
            .collect();
        let values = (0..self.nrow())
            .flat_map(|r| value_columns.iter().map(move |c| c.values()[r].clone()))
            .collect();
        columns.push(Column::new(names_to, names)?);
        columns.push(Column::new(values_to, values)?);

        debug!(rows_in = self.nrow(), rows_out = source_rows.len(), "pivot_longer");
        Table::new(columns)
    }

    /// Spread `names_from`/`values_from` pairs into one column per name.
    ///
    /// Id columns are all remaining columns. Rows appear in first-appearance
    /// order of their id tuple and new columns in first-appearance order of
    /// their name. Cells with no value are `Null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for unknown columns,
    /// [`Error::DuplicateKey`] if one cell would receive two values and
    /// [`Error::DuplicateColumn`] if a new column clashes with an id column.
    pub fn pivot_wider(&self, names_from: &str, values_from: &str) -> Result<Table> {
        let names = self.column(names_from)?;
        let values = self.column(values_from)?;
        let ids: Vec<&Column> = self
            .columns()
            .iter()
            .filter(|c| c.name() != names_from && c.name() != values_from)
            .collect();

        let mut row_index: HashMap<Vec<KeyPart>, usize> = HashMap::new();
        let mut first_rows: Vec<usize> = Vec::new();
        let mut column_index: HashMap<String, usize> = HashMap::new();
        let mut new_names: Vec<String> = Vec::new();
        let mut cells: Vec<Vec<Option<Value>>> = Vec::new();

        for r in 0..self.nrow() {
            let id: Vec<KeyPart> = ids.iter().map(|c| KeyPart::from(&c.values()[r])).collect();
            let out_row = *row_index.entry(id).or_insert_with(|| {
                first_rows.push(r);
                for column in &mut cells {
                    column.push(None);
                }
                first_rows.len() - 1
            });

            let name = names.values()[r].to_string();
            let out_col = *column_index.entry(name.clone()).or_insert_with(|| {
                new_names.push(name.clone());
                cells.push(vec![None; first_rows.len()]);
                new_names.len() - 1
            });

            let cell = &mut cells[out_col][out_row];
            if cell.is_some() {
                let id_desc: Vec<String> =
                    ids.iter().map(|c| c.values()[r].to_string()).collect();
                return Err(Error::DuplicateKey {
                    key: format!("({}) / {name}", id_desc.join(", ")),
                });
            }
            *cell = Some(values.values()[r].clone());
        }

        let mut columns: Vec<Column> = ids.iter().map(|c| c.take(&first_rows)).collect();
        for (name, column) in new_names.into_iter().zip(cells) {
            let values = column.into_iter().map(Option::unwrap_or_default).collect();
            columns.push(Column::new(name, values)?);
        }

        debug!(rows_in = self.nrow(), rows_out = first_rows.len(), "pivot_wider");
        Table::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide() -> Table {
        Table::new(vec![
            Column::text("site", &["north", "south"]),
            Column::float("length", &[10.0, 12.0]),
            Column::float("wingspan", &[20.0, 22.5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_pivot_longer_shape_and_order() {
        let long = wide().pivot_longer(&["length", "wingspan"], "measure", "value").unwrap();
        assert_eq!(long.nrow(), 4);
        assert_eq!(long.column_names(), vec!["site", "measure", "value"]);
        assert_eq!(long.value(1, "site").unwrap(), &Value::from("north"));
        assert_eq!(long.value(1, "measure").unwrap(), &Value::from("wingspan"));
        assert_eq!(long.value(2, "value").unwrap(), &Value::Float(12.0));
    }

    #[test]
    fn test_pivot_longer_rejects_incompatible_types() {
        let t = wide().with_column(Column::text("note", &["a", "b"])).unwrap();
        let err = t.pivot_longer(&["length", "note"], "measure", "value").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_pivot_wider_inverts_longer() {
        let long = wide().pivot_longer(&["length", "wingspan"], "measure", "value").unwrap();
        let back = long.pivot_wider("measure", "value").unwrap();
        assert_eq!(back, wide());
    }

    #[test]
    fn test_pivot_wider_fills_missing_cells_with_null() {
        let long = Table::new(vec![
            Column::text("site", &["north", "north", "south"]),
            Column::text("measure", &["length", "mass", "length"]),
            Column::float("value", &[1.0, 2.0, 3.0]),
        ])
        .unwrap();
        let wide = long.pivot_wider("measure", "value").unwrap();
        assert_eq!(wide.nrow(), 2);
        assert!(wide.value(1, "mass").unwrap().is_null());
    }

    #[test]
    fn test_pivot_wider_duplicate_cell_fails() {
        let long = Table::new(vec![
            Column::text("site", &["north", "north"]),
            Column::text("measure", &["length", "length"]),
            Column::float("value", &[1.0, 2.0]),
        ])
        .unwrap();
        let err = long.pivot_wider("measure", "value").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_longer_then_wider_round_trips(
            rows in prop::collection::vec((-1000i64..1000, -1000i64..1000), 0..20),
        ) {
            let ids: Vec<i64> = (0..rows.len() as i64).collect();
            let a: Vec<i64> = rows.iter().map(|r| r.0).collect();
            let b: Vec<i64> = rows.iter().map(|r| r.1).collect();
            let table = Table::new(vec![
                Column::int("id", &ids),
                Column::int("a", &a),
                Column::int("b", &b),
            ]).unwrap();

            let long = table.pivot_longer(&["a", "b"], "name", "value").unwrap();
            prop_assert_eq!(long.nrow(), table.nrow() * 2);
            let back = long.pivot_wider("name", "value").unwrap();
            if table.nrow() > 0 {
                prop_assert_eq!(back, table);
            } else {
                prop_assert_eq!(back.nrow(), 0);
            }
        }
    }
}
