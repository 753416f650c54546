//! Statistical summaries computed before drawing.
//!
//! Box plots display the distribution of data through quartiles, with
//! whiskers reaching the most extreme values within 1.5 × IQR of the box.

/// Statistics computed for a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    /// Lower whisker end (smallest value inside the fence).
    pub lower: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Upper whisker end (largest value inside the fence).
    pub upper: f64,
    /// Values outside the fences.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Compute box plot statistics, ignoring non-finite values.
    ///
    /// Returns `None` when no finite value remains.
    #[must_use]
    pub fn from_data(data: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        let lower = sorted
            .iter()
            .copied()
            .find(|&x| x >= lower_fence)
            .unwrap_or(sorted[0]);
        let upper = sorted
            .iter()
            .rev()
            .copied()
            .find(|&x| x <= upper_fence)
            .unwrap_or(sorted[sorted.len() - 1]);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|&x| x < lower_fence || x > upper_fence)
            .collect();

        Some(Self {
            lower,
            q1,
            median,
            q3,
            upper,
            outliers,
        })
    }

    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Smallest and largest value the box plot draws, outliers included.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        self.outliers
            .iter()
            .fold((self.lower, self.upper), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// Percentile of sorted data using linear interpolation between ranks.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted {
        [] => f64::NAN,
        [only] => *only,
        _ => {
            let k = (p / 100.0) * (sorted.len() - 1) as f64;
            let f = k.floor() as usize;
            let c = (k.ceil() as usize).min(sorted.len() - 1);
            let d = k - f as f64;
            sorted[f] * (1.0 - d) + sorted[c] * d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&data, 50.0), 2.5);
        assert_relative_eq!(percentile(&data, 25.0), 1.75);
        assert_relative_eq!(percentile(&data, 100.0), 4.0);
        assert_relative_eq!(percentile(&[7.0], 30.0), 7.0);
    }

    #[test]
    fn test_box_stats_quartiles() {
        let stats = BoxStats::from_data(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(stats.q1, 2.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.q3, 4.0);
        assert_relative_eq!(stats.iqr(), 2.0);
        assert_relative_eq!(stats.lower, 1.0);
        assert_relative_eq!(stats.upper, 5.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_outliers() {
        let stats = BoxStats::from_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(stats.outliers, vec![100.0]);
        assert_relative_eq!(stats.upper, 5.0);
        assert_eq!(stats.extent(), (1.0, 100.0));
    }

    #[test]
    fn test_box_stats_ignores_non_finite() {
        assert!(BoxStats::from_data(&[]).is_none());
        assert!(BoxStats::from_data(&[f64::NAN]).is_none());
        let stats = BoxStats::from_data(&[f64::NAN, 2.0]).unwrap();
        assert_relative_eq!(stats.median, 2.0);
    }
}
