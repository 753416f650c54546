//! Left join.

use std::collections::HashMap;

use tracing::debug;

use super::value::KeyPart;
use super::Table;
use crate::error::{Error, JoinSide, Result};

impl Table {
    /// Left-preserving join on the shared key columns `on`.
    ///
    /// Every left row appears once per matching right row, in right-table
    /// order, or once with missing right-only fields when nothing matches.
    /// Missing keys match missing keys. Non-key columns present on both sides
    /// are suffixed `.x` (left) and `.y` (right).
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyJoinKeys`] when `on` is empty and
    /// [`Error::JoinKey`] naming the key and side when a key column is absent.
    pub fn left_join(&self, right: &Table, on: &[&str]) -> Result<Table> {
        if on.is_empty() {
            return Err(Error::EmptyJoinKeys);
        }
        for key in on {
            if !self.has_column(key) {
                return Err(Error::JoinKey {
                    key: (*key).to_string(),
                    side: JoinSide::Left,
                });
            }
            if !right.has_column(key) {
                return Err(Error::JoinKey {
                    key: (*key).to_string(),
                    side: JoinSide::Right,
                });
            }
        }

        let key_parts = |table: &Table, row: usize| -> Result<Vec<KeyPart>> {
            on.iter().map(|k| table.value(row, k).map(KeyPart::from)).collect()
        };

        let mut lookup: HashMap<Vec<KeyPart>, Vec<usize>> = HashMap::new();
        for r in 0..right.nrow() {
            lookup.entry(key_parts(right, r)?).or_default().push(r);
        }

        let mut left_rows = Vec::with_capacity(self.nrow());
        let mut right_rows = Vec::with_capacity(self.nrow());
        for l in 0..self.nrow() {
            match lookup.get(&key_parts(self, l)?) {
                Some(matches) => {
                    for &r in matches {
                        left_rows.push(l);
                        right_rows.push(Some(r));
                    }
                }
                None => {
                    left_rows.push(l);
                    right_rows.push(None);
                }
            }
        }

        let is_key = |name: &str| on.contains(&name);
        let clashes = |name: &str| !is_key(name) && self.has_column(name) && right.has_column(name);

        let mut columns = Vec::with_capacity(self.ncol() + right.ncol());
        for c in self.columns() {
            let taken = c.take(&left_rows);
            columns.push(if clashes(c.name()) {
                let name = format!("{}.x", c.name());
                taken.renamed(name)
            } else {
                taken
            });
        }
        for c in right.columns().iter().filter(|c| !is_key(c.name())) {
            let taken = c.take_optional(&right_rows);
            columns.push(if clashes(c.name()) {
                let name = format!("{}.y", c.name());
                taken.renamed(name)
            } else {
                taken
            });
        }

        let unmatched = right_rows.iter().filter(|r| r.is_none()).count();
        debug!(rows_left = self.nrow(), rows_out = left_rows.len(), unmatched, "left_join");
        Table::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Value};

    fn specimens() -> Table {
        Table::new(vec![
            Column::text("site", &["north", "south", "east", "north"]),
            Column::float("mass", &[1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap()
    }

    fn sites() -> Table {
        Table::new(vec![
            Column::text("site", &["north", "south", "south"]),
            Column::text("habitat", &["forest", "marsh", "meadow"]),
            Column::float("mass", &[10.0, 20.0, 30.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_left_join_preserves_left_rows() {
        let out = specimens().left_join(&sites(), &["site"]).unwrap();
        // north x1, south x2, east x1 (unmatched), north x1
        assert_eq!(out.nrow(), 5);
        assert_eq!(out.column_names(), vec!["site", "mass.x", "habitat", "mass.y"]);
        assert_eq!(out.value(1, "habitat").unwrap(), &Value::from("marsh"));
        assert_eq!(out.value(2, "habitat").unwrap(), &Value::from("meadow"));
        assert!(out.value(3, "habitat").unwrap().is_null());
        assert_eq!(out.value(3, "site").unwrap(), &Value::from("east"));
    }

    #[test]
    fn test_left_join_empty_keys_fails() {
        let err = specimens().left_join(&sites(), &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyJoinKeys));
    }

    #[test]
    fn test_left_join_missing_key_names_side() {
        let err = specimens().left_join(&sites(), &["habitat"]).unwrap_err();
        assert!(matches!(
            err,
            Error::JoinKey { key, side: JoinSide::Left } if key == "habitat"
        ));
    }

    #[test]
    fn test_left_join_null_keys_match() {
        let left = Table::new(vec![Column::new("k", vec![Value::Null, Value::Int(1)]).unwrap()])
            .unwrap();
        let right = Table::new(vec![
            Column::new("k", vec![Value::Null]).unwrap(),
            Column::text("v", &["missing"]),
        ])
        .unwrap();
        let out = left.left_join(&right, &["k"]).unwrap();
        assert_eq!(out.value(0, "v").unwrap(), &Value::from("missing"));
        assert!(out.value(1, "v").unwrap().is_null());
    }
}
