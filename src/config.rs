//! Session configuration.
//!
//! YAML with every key optional:
//!
//! ```yaml
//! version: 1
//! theme: minimal
//! base_size: 12
//! palette: set2
//! dimensions:
//!   width: 800
//!   height: 600
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Palette;
use crate::error::{Error, Result};
use crate::grammar::{Theme, DEFAULT_DIMENSIONS};

/// Default pixel size for charts without an explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_DIMENSIONS.0,
            height: DEFAULT_DIMENSIONS.1,
        }
    }
}

/// Configuration applied by a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Theme preset name (see [`Theme::PRESETS`]).
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Base text size.
    #[serde(default = "default_base_size")]
    pub base_size: f32,

    /// Discrete palette name: `hue`, `viridis` or `set2`.
    #[serde(default = "default_palette")]
    pub palette: String,

    /// Default chart size.
    #[serde(default)]
    pub dimensions: Dimensions,
}

fn default_version() -> u32 {
    1
}
fn default_theme() -> String {
    "grey".to_string()
}
fn default_base_size() -> f32 {
    11.0
}
fn default_palette() -> String {
    "hue".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            theme: default_theme(),
            base_size: default_base_size(),
            palette: default_palette(),
            dimensions: Dimensions::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the offending line for malformed
    /// YAML, an unknown theme or palette, or a zero dimension.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })?;

        let invalid = |key: &str, message: String| Error::ConfigParse {
            line: key_line(yaml, key),
            message,
        };
        if Theme::from_name(&config.theme).is_none() {
            return Err(invalid(
                "theme",
                format!(
                    "unknown theme `{}` (expected one of {})",
                    config.theme,
                    Theme::PRESETS.join(", ")
                ),
            ));
        }
        if Palette::from_name(&config.palette).is_none() {
            return Err(invalid(
                "palette",
                format!("unknown palette `{}` (expected hue, viridis or set2)", config.palette),
            ));
        }
        if config.dimensions.width == 0 || config.dimensions.height == 0 {
            return Err(invalid("dimensions", "dimensions must be positive".to_string()));
        }
        if !(config.base_size.is_finite() && config.base_size > 0.0) {
            return Err(invalid("base_size", "base_size must be positive".to_string()));
        }
        Ok(config)
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// The configured theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme).unwrap_or_default()
    }

    /// The configured discrete palette.
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::from_name(&self.palette).unwrap_or_default()
    }

    /// Default chart size as `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.dimensions.width, self.dimensions.height)
    }
}

/// One-based line of the first top-level `key:` in `yaml`, 0 if absent.
fn key_line(yaml: &str, key: &str) -> usize {
    yaml.lines()
        .position(|line| {
            line.strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        })
        .map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::new();
        assert_eq!(config.version, 1);
        assert_eq!(config.theme(), Theme::grey());
        assert_eq!(config.palette(), Palette::Hue);
        assert_eq!(config.dimensions(), DEFAULT_DIMENSIONS);
    }

    #[test]
    fn test_config_parse_minimal() {
        let config = Config::parse("version: 1").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r"
version: 1
theme: minimal
base_size: 14
palette: set2
dimensions:
  width: 1200
  height: 900
";
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.theme(), Theme::minimal());
        assert!((config.base_size - 14.0).abs() < f32::EPSILON);
        assert_eq!(config.palette(), Palette::Set2);
        assert_eq!(config.dimensions(), (1200, 900));
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r"
version: 1
base_size: large
";
        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_unknown_theme_reports_line() {
        let yaml = "version: 1\npalette: hue\ntheme: neon\n";
        let err = Config::parse(yaml).unwrap_err();
        match err {
            Error::ConfigParse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("neon"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_palette_rejected() {
        let err = Config::parse("palette: rainbow").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { line: 1, .. }));
    }

    #[test]
    fn test_config_load_or_default() {
        let config = Config::load_or_default("/nonexistent/path.yaml");
        assert_eq!(config.version, 1);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tidyviz.yaml");
        std::fs::write(&path, "theme: bw\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().theme(), Theme::bw());
    }
}
