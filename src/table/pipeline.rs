//! Ordered transform pipelines.
//!
//! A [`Pipeline`] is a list of [`Step`]s applied strictly in order, each
//! consuming the previous step's output. A failing step stops the run and is
//! reported with its position and name.

use std::sync::Arc;

use tracing::debug;

use super::aggregate::Aggregation;
use super::expr::Expr;
use super::ops::SortKey;
use super::{ColumnRef, Table};
use crate::error::{Error, Result};

/// One transform step.
#[derive(Debug, Clone)]
pub enum Step {
    /// Keep rows where the predicate is true.
    Filter(Expr),
    /// Keep columns in the given order.
    Select(Vec<ColumnRef>),
    /// Keep and rename columns: `(new_name, column)`.
    SelectAs(Vec<(String, ColumnRef)>),
    /// Rename columns: `(old, new)`.
    Rename(Vec<(String, String)>),
    /// Add or replace a computed column.
    Derive(String, Expr),
    /// Group by keys and summarise.
    Aggregate {
        /// Grouping columns.
        keys: Vec<String>,
        /// Summary columns.
        aggregations: Vec<Aggregation>,
    },
    /// Wide to long.
    PivotLonger {
        /// Value columns to gather.
        cols: Vec<String>,
        /// Output column holding the former column names.
        names_to: String,
        /// Output column holding the values.
        values_to: String,
    },
    /// Long to wide.
    PivotWider {
        /// Column whose values become column names.
        names_from: String,
        /// Column whose values fill the cells.
        values_from: String,
    },
    /// Left join against a fixed right table.
    LeftJoin {
        /// Lookup table.
        right: Arc<Table>,
        /// Shared key columns.
        on: Vec<String>,
    },
    /// Sort rows.
    Arrange(Vec<SortKey>),
    /// Drop repeated rows.
    Distinct(Vec<String>),
    /// Keep the first rows.
    Head(usize),
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

impl Step {
    /// Short step name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Step::Filter(_) => "filter",
            Step::Select(_) => "select",
            Step::SelectAs(_) => "select_as",
            Step::Rename(_) => "rename",
            Step::Derive(..) => "derive",
            Step::Aggregate { .. } => "aggregate",
            Step::PivotLonger { .. } => "pivot_longer",
            Step::PivotWider { .. } => "pivot_wider",
            Step::LeftJoin { .. } => "left_join",
            Step::Arrange(_) => "arrange",
            Step::Distinct(_) => "distinct",
            Step::Head(_) => "head",
        }
    }

    /// Apply this step to a table.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operator.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        match self {
            Step::Filter(predicate) => table.filter(predicate),
            Step::Select(columns) => table.select(columns),
            Step::SelectAs(pairs) => {
                let pairs: Vec<(&str, ColumnRef)> =
                    pairs.iter().map(|(n, c)| (n.as_str(), c.clone())).collect();
                table.select_as(&pairs)
            }
            Step::Rename(pairs) => {
                let pairs: Vec<(&str, &str)> =
                    pairs.iter().map(|(o, n)| (o.as_str(), n.as_str())).collect();
                table.rename(&pairs)
            }
            Step::Derive(name, expr) => table.derive(name, expr),
            Step::Aggregate { keys, aggregations } => {
                table.group_by(&as_strs(keys))?.aggregate(aggregations)
            }
            Step::PivotLonger {
                cols,
                names_to,
                values_to,
            } => table.pivot_longer(&as_strs(cols), names_to, values_to),
            Step::PivotWider {
                names_from,
                values_from,
            } => table.pivot_wider(names_from, values_from),
            Step::LeftJoin { right, on } => table.left_join(right, &as_strs(on)),
            Step::Arrange(keys) => table.arrange(keys),
            Step::Distinct(columns) => table.distinct(&as_strs(columns)),
            Step::Head(n) => Ok(table.head(*n)),
        }
    }
}

/// Builder for an ordered list of transform steps.
///
/// # Example
///
/// ```rust
/// use tidyviz::table::{col, lit, Aggregation, Column, Pipeline, Table};
///
/// let specimens = Table::new(vec![
///     Column::text("site", &["north", "south", "north"]),
///     Column::float("length", &[10.0, 12.0, 14.0]),
/// ])
/// .unwrap();
///
/// let summary = Pipeline::new()
///     .filter(col("length").gt(lit(9.0)))
///     .aggregate(&["site"], &[Aggregation::mean("length")])
///     .run(&specimens)
///     .unwrap();
/// assert_eq!(summary.nrow(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a filter step.
    #[must_use]
    pub fn filter(self, predicate: Expr) -> Self {
        self.step(Step::Filter(predicate))
    }

    /// Append a select step.
    #[must_use]
    pub fn select<C: Into<ColumnRef> + Clone>(self, columns: &[C]) -> Self {
        self.step(Step::Select(columns.iter().cloned().map(Into::into).collect()))
    }

    /// Append a select-and-rename step.
    #[must_use]
    pub fn select_as<C: Into<ColumnRef> + Clone>(self, columns: &[(&str, C)]) -> Self {
        self.step(Step::SelectAs(
            columns
                .iter()
                .map(|(n, c)| ((*n).to_string(), c.clone().into()))
                .collect(),
        ))
    }

    /// Append a rename step.
    #[must_use]
    pub fn rename(self, pairs: &[(&str, &str)]) -> Self {
        self.step(Step::Rename(
            pairs
                .iter()
                .map(|(o, n)| ((*o).to_string(), (*n).to_string()))
                .collect(),
        ))
    }

    /// Append a derive step.
    #[must_use]
    pub fn derive(self, name: &str, expr: Expr) -> Self {
        self.step(Step::Derive(name.to_string(), expr))
    }

    /// Append a group-and-summarise step.
    #[must_use]
    pub fn aggregate(self, keys: &[&str], aggregations: &[Aggregation]) -> Self {
        self.step(Step::Aggregate {
            keys: keys.iter().map(ToString::to_string).collect(),
            aggregations: aggregations.to_vec(),
        })
    }

    /// Append a wide-to-long step.
    #[must_use]
    pub fn pivot_longer(self, cols: &[&str], names_to: &str, values_to: &str) -> Self {
        self.step(Step::PivotLonger {
            cols: cols.iter().map(ToString::to_string).collect(),
            names_to: names_to.to_string(),
            values_to: values_to.to_string(),
        })
    }

    /// Append a long-to-wide step.
    #[must_use]
    pub fn pivot_wider(self, names_from: &str, values_from: &str) -> Self {
        self.step(Step::PivotWider {
            names_from: names_from.to_string(),
            values_from: values_from.to_string(),
        })
    }

    /// Append a left join step.
    #[must_use]
    pub fn left_join(self, right: impl Into<Arc<Table>>, on: &[&str]) -> Self {
        self.step(Step::LeftJoin {
            right: right.into(),
            on: on.iter().map(ToString::to_string).collect(),
        })
    }

    /// Append a sort step.
    #[must_use]
    pub fn arrange<K: Into<SortKey> + Clone>(self, keys: &[K]) -> Self {
        self.step(Step::Arrange(keys.iter().cloned().map(Into::into).collect()))
    }

    /// Append a distinct step.
    #[must_use]
    pub fn distinct(self, columns: &[&str]) -> Self {
        self.step(Step::Distinct(columns.iter().map(ToString::to_string).collect()))
    }

    /// Append a head step.
    #[must_use]
    pub fn head(self, n: usize) -> Self {
        self.step(Step::Head(n))
    }

    /// Steps in application order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order to `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PipelineStep`] wrapping the first failing step's error.
    pub fn run(&self, input: &Table) -> Result<Table> {
        let mut table = input.clone();
        for (index, step) in self.steps.iter().enumerate() {
            let rows_in = table.nrow();
            table = step.apply(&table).map_err(|source| Error::PipelineStep {
                index,
                step: step.name(),
                source: Box::new(source),
            })?;
            debug!(index, step = step.name(), rows_in, rows_out = table.nrow(), "pipeline step");
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{col, lit, Column, Value};

    fn specimens() -> Table {
        Table::new(vec![
            Column::text("site", &["north", "south", "north", "east"]),
            Column::text("colour", &["blue", "blue", "black", "black"]),
            Column::int("age", &[1000, 1500, 500, 1200]),
            Column::float("mass", &[2.0, 3.0, 4.0, 5.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_steps_apply_in_order() {
        let out = Pipeline::new()
            .derive("mass_g", col("mass") * lit(1000))
            .filter(col("mass_g").gt(lit(2500)))
            .select(&["site", "mass_g"])
            .arrange(&[SortKey::desc("mass_g")])
            .run(&specimens())
            .unwrap();
        assert_eq!(out.column_names(), vec!["site", "mass_g"]);
        assert_eq!(out.nrow(), 3);
        assert_eq!(out.value(0, "site").unwrap(), &Value::from("east"));
    }

    #[test]
    fn test_failing_step_reports_index_and_name() {
        let err = Pipeline::new()
            .filter(col("age").gt(lit(0)))
            .select(&["wingspan"])
            .run(&specimens())
            .unwrap_err();
        match err {
            Error::PipelineStep { index, step, source } => {
                assert_eq!(index, 1);
                assert_eq!(step, "select");
                assert!(matches!(*source, Error::Schema { ref column, .. } if column == "wingspan"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_join_and_summarise() {
        let sites = Table::new(vec![
            Column::text("site", &["north", "south"]),
            Column::text("habitat", &["forest", "marsh"]),
        ])
        .unwrap();
        let out = Pipeline::new()
            .left_join(sites, &["site"])
            .aggregate(&["habitat"], &[Aggregation::count()])
            .run(&specimens())
            .unwrap();
        // forest, marsh, then the unmatched east row under a missing habitat
        assert_eq!(out.nrow(), 3);
        assert_eq!(out.value(0, "n").unwrap(), &Value::Int(2));
        assert!(out.value(2, "habitat").unwrap().is_null());
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let p = Pipeline::new();
        assert!(p.is_empty());
        assert_eq!(p.run(&specimens()).unwrap(), specimens());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::table::{col, lit, Column, Value};
    use proptest::prelude::*;

    fn table(values: &[(i64, Option<f64>)]) -> Table {
        let groups: Vec<i64> = values.iter().map(|v| v.0).collect();
        let xs: Vec<Value> = values.iter().map(|v| v.1.map_or(Value::Null, Value::Float)).collect();
        Table::new(vec![Column::int("g", &groups), Column::new("x", xs).unwrap()]).unwrap()
    }

    fn rows() -> impl Strategy<Value = Vec<(i64, Option<f64>)>> {
        prop::collection::vec((0i64..4, prop::option::weighted(0.8, -100.0f64..100.0)), 0..40)
    }

    proptest! {
        #[test]
        fn prop_filter_keeps_only_matching_rows(values in rows(), threshold in -100.0f64..100.0) {
            let input = table(&values);
            let out = input.filter(&col("x").gt(lit(threshold))).unwrap();
            prop_assert!(out.nrow() <= input.nrow());
            let matching: Vec<usize> = values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.1.is_some_and(|x| x > threshold))
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(out, input.take_rows(&matching));
        }

        #[test]
        fn prop_derive_and_filter_commute(values in rows()) {
            let input = table(&values);
            let a = Pipeline::new()
                .derive("double", col("x") * lit(2.0))
                .derive("shifted", col("x") + lit(1.0))
                .filter(col("g").lt(lit(2)))
                .run(&input)
                .unwrap();
            let b = Pipeline::new()
                .filter(col("g").lt(lit(2)))
                .derive("shifted", col("x") + lit(1.0))
                .derive("double", col("x") * lit(2.0))
                .select(&["g", "x", "double", "shifted"])
                .run(&input)
                .unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_group_stats_ignore_missing_values(
            values in prop::collection::vec(
                (0i64..4, prop::option::weighted(0.7, -100.0f64..100.0)),
                1..40,
            ),
        ) {
            let out = table(&values)
                .group_by(&["g"])
                .unwrap()
                .aggregate(&[
                    Aggregation::count(),
                    Aggregation::n("x"),
                    Aggregation::mean("x"),
                    Aggregation::se("x"),
                ])
                .unwrap();

            let mut keys: Vec<i64> = values.iter().map(|v| v.0).collect();
            keys.sort_unstable();
            keys.dedup();
            prop_assert_eq!(out.nrow(), keys.len());

            for (row, key) in keys.iter().enumerate() {
                let group: Vec<Option<f64>> =
                    values.iter().filter(|v| v.0 == *key).map(|v| v.1).collect();
                let xs: Vec<f64> = group.iter().flatten().copied().collect();
                prop_assert_eq!(out.value(row, "count").unwrap(), &Value::Int(group.len() as i64));
                prop_assert_eq!(out.value(row, "n_x").unwrap(), &Value::Int(xs.len() as i64));

                let mean = out.value(row, "mean_x").unwrap();
                if xs.is_empty() {
                    prop_assert!(mean.is_null());
                    prop_assert!(out.value(row, "se_x").unwrap().is_null());
                    continue;
                }
                let n = xs.len() as f64;
                let direct = xs.iter().sum::<f64>() / n;
                prop_assert!((mean.as_f64().unwrap() - direct).abs() < 1e-9);

                let se = out.value(row, "se_x").unwrap();
                if xs.len() < 2 {
                    prop_assert!(se.is_null());
                } else {
                    let var = xs.iter().map(|x| (x - direct).powi(2)).sum::<f64>() / (n - 1.0);
                    let expected = (var / n).sqrt();
                    prop_assert!((se.as_f64().unwrap() - expected).abs() < 1e-9);
                }
            }
        }
    }
}
