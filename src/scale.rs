//! Scale functions for data-to-visual mappings.
//!
//! Scales transform data values to visual properties (position, color).
//! Continuous positions use [`LinearScale`], text-valued positions use
//! [`BandScale`], and numeric colour uses [`ColorScale`].

use crate::color::{gradient, Rgba};
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain(format!(
                "domain must be finite, got {} to {}",
                domain.0, domain.1
            )));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Create a scale covering the data extent, padded by `expand` (a
    /// fraction of the extent) on both sides.
    ///
    /// A single distinct value is widened to a unit interval around it.
    /// Returns `None` when there are no finite values.
    #[must_use]
    pub fn from_data<I>(data: I, range: (f32, f32), expand: f64) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = extent(data)?;
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            let pad = (max - min) * expand;
            (min - pad, max + pad)
        };
        Self::new((min, max), range).ok()
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f32) -> f64 {
        let t = f64::from(value - self.range_min) / f64::from(self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Whether `value` lies inside the domain.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = ordered(self.domain_min, self.domain_max);
        value >= lo - f64::EPSILON && value <= hi + f64::EPSILON
    }

    /// "Nice" tick positions inside the domain, about `count` of them.
    #[must_use]
    pub fn ticks(&self, count: u32) -> Ticks {
        let (lo, hi) = ordered(self.domain_min, self.domain_max);
        let mut ticks = nice_ticks(lo, hi, count);
        let tolerance = ticks.step * 1e-9;
        ticks.values.retain(|v| *v >= lo - tolerance && *v <= hi + tolerance);
        ticks
    }
}

impl Scale<f64, f32> for LinearScale {
    fn scale(&self, value: f64) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + (t as f32) * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Smallest and largest finite value.
#[must_use]
pub fn extent<I: IntoIterator<Item = f64>>(data: I) -> Option<(f64, f64)> {
    data.into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Tick positions with a common step.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticks {
    /// Tick positions, ascending.
    pub values: Vec<f64>,
    /// Distance between neighbouring ticks.
    pub step: f64,
}

impl Ticks {
    /// Labels with just enough decimals to tell neighbouring ticks apart.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let decimals = if self.step > 0.0 {
            (-self.step.log10().floor()).max(0.0) as usize
        } else {
            0
        };
        // 2.5 steps need one more digit than their magnitude suggests
        let decimals = if (self.step / 10f64.powi(-(decimals as i32)) - 2.5).abs() < 1e-9 {
            decimals + 1
        } else {
            decimals
        };
        self.values
            .iter()
            .map(|v| {
                let s = format!("{v:.decimals$}");
                if s.starts_with('-') && s.trim_start_matches(['-', '0', '.']).is_empty() {
                    s[1..].to_string()
                } else {
                    s
                }
            })
            .collect()
    }
}

/// Ticks covering `[min, max]` with a step of 1, 2, 2.5 or 5 times a power
/// of ten, about `count` intervals wide.
#[must_use]
pub fn nice_ticks(min: f64, max: f64, count: u32) -> Ticks {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 || count == 0 {
        return Ticks {
            values: if min.is_finite() { vec![min] } else { Vec::new() },
            step: 0.0,
        };
    }
    let step = span / f64::from(count);
    let k = step.log10().floor();
    let base = step / 10f64.powf(k);
    let nice_base = match base {
        b if b <= 1.0 => 1.0,
        b if b <= 2.0 => 2.0,
        b if b <= 2.5 => 2.5,
        b if b <= 5.0 => 5.0,
        _ => 10.0,
    };
    let step = nice_base * 10f64.powf(k);
    let lo = (min / step).floor() as i64;
    let hi = (max / step).ceil() as i64;
    let values = (lo..=hi).map(|i| i as f64 * step).collect();
    Ticks { values, step }
}

/// Band scale for text-valued positions: one equal-width band per level.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    levels: Vec<String>,
    range_min: f32,
    range_max: f32,
    padding: f32,
}

impl BandScale {
    /// Create a band scale; `padding` is the fraction of each band left empty.
    #[must_use]
    pub fn new(levels: Vec<String>, range: (f32, f32), padding: f32) -> Self {
        Self {
            levels,
            range_min: range.0,
            range_max: range.1,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    /// Levels in band order.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    fn step(&self) -> f32 {
        (self.range_max - self.range_min) / self.levels.len().max(1) as f32
    }

    /// Width of the drawable part of a band.
    #[must_use]
    pub fn bandwidth(&self) -> f32 {
        self.step().abs() * (1.0 - self.padding)
    }

    /// Centre of the band holding `level`.
    #[must_use]
    pub fn position(&self, level: &str) -> Option<f32> {
        self.levels.iter().position(|l| l == level).map(|i| self.scale(i))
    }
}

impl Scale<usize, f32> for BandScale {
    fn scale(&self, index: usize) -> f32 {
        self.range_min + self.step() * (index as f32 + 0.5)
    }

    fn domain(&self) -> (usize, usize) {
        (0, self.levels.len().saturating_sub(1))
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Color scale for mapping numbers to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    colors: Vec<Rgba>,
    domain_min: f64,
    domain_max: f64,
}

impl ColorScale {
    /// Create a new color scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if `colors` is empty.
    pub fn new(colors: Vec<Rgba>, domain: (f64, f64)) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::ScaleDomain("Color scale requires at least one color".to_string()));
        }
        Ok(Self {
            colors,
            domain_min: domain.0,
            domain_max: domain.1,
        })
    }

    /// Two-colour gradient from dark to light blue.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in stops.
    pub fn blues(domain: (f64, f64)) -> Result<Self> {
        Self::new(vec![Rgba::rgb(19, 43, 67), Rgba::rgb(86, 177, 247)], domain)
    }
}

impl Scale<f64, Rgba> for ColorScale {
    fn scale(&self, value: f64) -> Rgba {
        let span = self.domain_max - self.domain_min;
        let t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            ((value - self.domain_min) / span).clamp(0.0, 1.0)
        };
        gradient(&self.colors, t as f32)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (
            *self.colors.first().unwrap_or(&Rgba::BLACK),
            *self.colors.last().unwrap_or(&Rgba::WHITE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 1.0)).unwrap();
        assert_relative_eq!(scale.scale(0.0), 0.0);
        assert_relative_eq!(scale.scale(50.0), 0.5);
        assert_relative_eq!(scale.scale(100.0), 1.0);
        assert_relative_eq!(scale.invert(0.5), 50.0);
    }

    #[test]
    fn test_linear_scale_inverted_range() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0)).unwrap();
        assert_relative_eq!(scale.scale(0.0), 100.0);
        assert_relative_eq!(scale.scale(10.0), 0.0);
    }

    #[test]
    fn test_linear_scale_rejects_empty_domain() {
        assert!(matches!(LinearScale::new((1.0, 1.0), (0.0, 1.0)), Err(Error::ScaleDomain(_))));
        assert!(LinearScale::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_from_data_pads() {
        let scale = LinearScale::from_data([0.0, 10.0], (0.0, 1.0), 0.05).unwrap();
        assert_eq!(scale.domain(), (-0.5, 10.5));
        let single = LinearScale::from_data([3.0, 3.0], (0.0, 1.0), 0.05).unwrap();
        assert_eq!(single.domain(), (2.5, 3.5));
        assert!(LinearScale::from_data(Vec::new(), (0.0, 1.0), 0.05).is_none());
    }

    #[test]
    fn test_nice_ticks_steps() {
        let ticks = nice_ticks(0.0, 100.0, 5);
        assert_relative_eq!(ticks.step, 20.0);
        assert_eq!(ticks.values, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);

        let ticks = nice_ticks(0.0, 1.0, 4);
        assert_relative_eq!(ticks.step, 0.25);
    }

    #[test]
    fn test_ticks_inside_domain() {
        let scale = LinearScale::new((-0.5, 10.5), (0.0, 1.0)).unwrap();
        let ticks = scale.ticks(5);
        assert_eq!(ticks.values, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(ticks.labels(), vec!["0.0", "2.5", "5.0", "7.5", "10.0"]);
    }

    #[test]
    fn test_tick_labels_integer_step() {
        let ticks = nice_ticks(0.0, 2000.0, 4);
        assert_eq!(ticks.labels(), vec!["0", "500", "1000", "1500", "2000"]);
    }

    #[test]
    fn test_band_scale() {
        let scale = BandScale::new(vec!["a".into(), "b".into()], (0.0, 100.0), 0.2);
        assert_eq!(scale.position("a"), Some(25.0));
        assert_eq!(scale.position("b"), Some(75.0));
        assert_eq!(scale.position("c"), None);
        assert_relative_eq!(scale.bandwidth(), 40.0);
    }

    #[test]
    fn test_color_scale_endpoints() {
        let scale = ColorScale::new(vec![Rgba::BLACK, Rgba::WHITE], (0.0, 10.0)).unwrap();
        assert_eq!(scale.scale(0.0), Rgba::BLACK);
        assert_eq!(scale.scale(10.0), Rgba::WHITE);
        assert_eq!(scale.scale(20.0), Rgba::WHITE);
        assert!(ColorScale::new(Vec::new(), (0.0, 1.0)).is_err());
    }
}
