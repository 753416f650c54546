//! Group-by and summary statistics.
//!
//! Missing values are ignored by every statistic, and `n` (used by the
//! standard deviation and standard error) is the number of non-missing values
//! that actually entered the statistic. A statistic with no defined value,
//! such as the mean of an empty group or the standard deviation of a single
//! value, is `Null`.

use std::collections::HashMap;

use tracing::debug;

use super::value::{DataType, KeyPart, Value};
use super::{Column, Table};
use crate::error::{Error, Result};

/// Summary function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFn {
    /// Number of rows in the group.
    Count,
    /// Number of non-missing values.
    N,
    /// Sum.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Median (mean of the two middle values for even counts).
    Median,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Sample standard deviation (n - 1 denominator).
    Sd,
    /// Standard error of the mean: `sd / sqrt(n)`.
    Se,
}

impl AggFn {
    /// Short name used for default output columns.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AggFn::Count => "count",
            AggFn::N => "n",
            AggFn::Sum => "sum",
            AggFn::Mean => "mean",
            AggFn::Median => "median",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Sd => "sd",
            AggFn::Se => "se",
        }
    }

    /// Apply to the non-missing values of one group.
    fn compute(self, rows: usize, values: &[f64]) -> Value {
        let n = values.len();
        let mean = || (n > 0).then(|| values.iter().sum::<f64>() / n as f64);
        let sd = || {
            let m = mean()?;
            (n > 1).then(|| {
                (values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
            })
        };
        let result = match self {
            AggFn::Count => return Value::Int(rows as i64),
            AggFn::N => return Value::Int(n as i64),
            AggFn::Sum => Some(values.iter().sum()),
            AggFn::Mean => mean(),
            AggFn::Median => median(values),
            AggFn::Min => values.iter().copied().reduce(f64::min),
            AggFn::Max => values.iter().copied().reduce(f64::max),
            AggFn::Sd => sd(),
            AggFn::Se => sd().map(|s| s / (n as f64).sqrt()),
        };
        result.map_or(Value::Null, Value::Float)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// One summary column of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Summary function.
    pub func: AggFn,
    /// Input column (`None` for [`AggFn::Count`]).
    pub column: Option<String>,
    /// Output column name.
    pub output: String,
}

impl Aggregation {
    fn on(func: AggFn, column: &str) -> Self {
        Self {
            func,
            column: Some(column.to_string()),
            output: format!("{}_{column}", func.name()),
        }
    }

    /// Rows per group, output `n`.
    #[must_use]
    pub fn count() -> Self {
        Self {
            func: AggFn::Count,
            column: None,
            output: "n".to_string(),
        }
    }

    /// Non-missing values per group.
    #[must_use]
    pub fn n(column: &str) -> Self {
        Self::on(AggFn::N, column)
    }

    /// Sum of a column.
    #[must_use]
    pub fn sum(column: &str) -> Self {
        Self::on(AggFn::Sum, column)
    }

    /// Mean of a column.
    #[must_use]
    pub fn mean(column: &str) -> Self {
        Self::on(AggFn::Mean, column)
    }

    /// Median of a column.
    #[must_use]
    pub fn median(column: &str) -> Self {
        Self::on(AggFn::Median, column)
    }

    /// Minimum of a column.
    #[must_use]
    pub fn min(column: &str) -> Self {
        Self::on(AggFn::Min, column)
    }

    /// Maximum of a column.
    #[must_use]
    pub fn max(column: &str) -> Self {
        Self::on(AggFn::Max, column)
    }

    /// Sample standard deviation of a column.
    #[must_use]
    pub fn sd(column: &str) -> Self {
        Self::on(AggFn::Sd, column)
    }

    /// Standard error of the mean of a column.
    #[must_use]
    pub fn se(column: &str) -> Self {
        Self::on(AggFn::Se, column)
    }

    /// Rename the output column.
    #[must_use]
    pub fn alias(mut self, name: &str) -> Self {
        self.output = name.to_string();
        self
    }
}

/// A table partitioned by key columns.
#[derive(Debug, Clone)]
pub struct GroupBy<'a> {
    table: &'a Table,
    keys: Vec<String>,
    /// Key tuple and member rows, ordered by key tuple.
    groups: Vec<(Vec<Value>, Vec<usize>)>,
}

impl Table {
    /// Partition rows by the distinct values of `keys`.
    ///
    /// With no keys the whole table is one group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for unknown key columns.
    pub fn group_by(&self, keys: &[&str]) -> Result<GroupBy<'_>> {
        let key_columns = keys.iter().map(|k| self.column(k)).collect::<Result<Vec<_>>>()?;

        let mut index: HashMap<Vec<KeyPart>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
        if keys.is_empty() {
            groups.push((Vec::new(), (0..self.nrow()).collect()));
        } else {
            for row in 0..self.nrow() {
                let tuple: Vec<Value> =
                    key_columns.iter().map(|c| c.values()[row].clone()).collect();
                let hashed: Vec<KeyPart> = tuple.iter().map(KeyPart::from).collect();
                let slot = *index.entry(hashed).or_insert_with(|| {
                    groups.push((tuple, Vec::new()));
                    groups.len() - 1
                });
                groups[slot].1.push(row);
            }
        }
        groups.sort_by(|(a, _), (b, _)| {
            a.iter()
                .zip(b)
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(GroupBy {
            table: self,
            keys: keys.iter().map(ToString::to_string).collect(),
            groups,
        })
    }
}

impl GroupBy<'_> {
    /// Number of groups.
    #[must_use]
    pub fn ngroups(&self) -> usize {
        self.groups.len()
    }

    /// Key column names.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// One output row per group: key columns followed by one column per
    /// aggregation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for unknown input columns,
    /// [`Error::TypeMismatch`] for non-numeric inputs and
    /// [`Error::DuplicateColumn`] for clashing output names.
    pub fn aggregate(&self, aggregations: &[Aggregation]) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.keys.len() + aggregations.len());
        for (i, key) in self.keys.iter().enumerate() {
            let values = self.groups.iter().map(|(k, _)| k[i].clone()).collect();
            columns.push(Column::new(key.clone(), values)?);
        }

        for agg in aggregations {
            let input = match &agg.column {
                Some(name) => {
                    let c = self.table.column(name)?;
                    if !matches!(c.dtype(), DataType::Int | DataType::Float | DataType::Null)
                        && agg.func != AggFn::N
                    {
                        return Err(Error::TypeMismatch {
                            column: name.clone(),
                            expected: "numeric".to_string(),
                            found: c.dtype().to_string(),
                        });
                    }
                    Some(c)
                }
                None => None,
            };
            let values = self
                .groups
                .iter()
                .map(|(_, rows)| {
                    let present: Vec<f64> = match input {
                        Some(c) if agg.func == AggFn::N => rows
                            .iter()
                            .filter(|&&r| !c.values()[r].is_null())
                            .map(|_| 0.0)
                            .collect(),
                        Some(c) => rows.iter().filter_map(|&r| c.values()[r].as_f64()).collect(),
                        None => Vec::new(),
                    };
                    agg.func.compute(rows.len(), &present)
                })
                .collect();
            columns.push(Column::new(agg.output.clone(), values)?);
        }

        debug!(keys = ?self.keys, groups = self.groups.len(), "aggregate");
        Table::new(columns)
    }
}
