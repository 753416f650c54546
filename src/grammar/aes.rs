//! Aesthetic mappings for Grammar of Graphics.
//!
//! Maps table columns to visual channels, plus fixed (unmapped) styling.

use crate::color::Rgba;

/// Aesthetic mapping specification.
///
/// Channels hold column names; the `*_value` fields hold fixed styling that
/// applies to every mark of a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aes {
    /// X position mapping (column name).
    pub x: Option<String>,
    /// Y position mapping (column name).
    pub y: Option<String>,
    /// Outline / point colour mapping (column name).
    pub colour: Option<String>,
    /// Fill colour mapping (column name).
    pub fill: Option<String>,
    /// Size mapping (column name).
    pub size: Option<String>,
    /// Shape mapping (column name).
    pub shape: Option<String>,
    /// Group mapping (column name).
    pub group: Option<String>,
    /// Label mapping (column name).
    pub label: Option<String>,
    /// Lower x bound (column name).
    pub xmin: Option<String>,
    /// Upper x bound (column name).
    pub xmax: Option<String>,
    /// Lower y bound (column name).
    pub ymin: Option<String>,
    /// Upper y bound (column name).
    pub ymax: Option<String>,

    // Fixed values (not data-mapped)
    /// Fixed colour value.
    pub colour_value: Option<Rgba>,
    /// Fixed fill value.
    pub fill_value: Option<Rgba>,
    /// Fixed size value.
    pub size_value: Option<f32>,
    /// Fixed alpha value.
    pub alpha_value: Option<f32>,
}

macro_rules! channel {
    ($($(#[$doc:meta])* $name:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(mut self, column: &str) -> Self {
                self.$name = Some(column.to_string());
                self
            }
        )*
    };
}

impl Aes {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    channel! {
        /// Map x position to a column.
        x;
        /// Map y position to a column.
        y;
        /// Map colour to a column.
        colour;
        /// Map fill colour to a column.
        fill;
        /// Map size to a column.
        size;
        /// Map shape to a column.
        shape;
        /// Map group to a column.
        group;
        /// Map label to a column.
        label;
        /// Map the lower x bound to a column.
        xmin;
        /// Map the upper x bound to a column.
        xmax;
        /// Map the lower y bound to a column.
        ymin;
        /// Map the upper y bound to a column.
        ymax;
    }

    /// Set a fixed colour.
    #[must_use]
    pub fn colour_value(mut self, color: Rgba) -> Self {
        self.colour_value = Some(color);
        self
    }

    /// Set a fixed fill.
    #[must_use]
    pub fn fill_value(mut self, color: Rgba) -> Self {
        self.fill_value = Some(color);
        self
    }

    /// Set a fixed size.
    #[must_use]
    pub fn size_value(mut self, size: f32) -> Self {
        self.size_value = Some(size.max(0.0));
        self
    }

    /// Set a fixed alpha value.
    #[must_use]
    pub fn alpha_value(mut self, alpha: f32) -> Self {
        self.alpha_value = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Merge another Aes, with other taking precedence.
    #[must_use]
    pub fn merge(&self, other: &Aes) -> Aes {
        fn pick(a: &Option<String>, b: &Option<String>) -> Option<String> {
            b.clone().or_else(|| a.clone())
        }
        Aes {
            x: pick(&self.x, &other.x),
            y: pick(&self.y, &other.y),
            colour: pick(&self.colour, &other.colour),
            fill: pick(&self.fill, &other.fill),
            size: pick(&self.size, &other.size),
            shape: pick(&self.shape, &other.shape),
            group: pick(&self.group, &other.group),
            label: pick(&self.label, &other.label),
            xmin: pick(&self.xmin, &other.xmin),
            xmax: pick(&self.xmax, &other.xmax),
            ymin: pick(&self.ymin, &other.ymin),
            ymax: pick(&self.ymax, &other.ymax),
            colour_value: other.colour_value.or(self.colour_value),
            fill_value: other.fill_value.or(self.fill_value),
            size_value: other.size_value.or(self.size_value),
            alpha_value: other.alpha_value.or(self.alpha_value),
        }
    }

    /// Every mapped column, in channel order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        [
            &self.x,
            &self.y,
            &self.colour,
            &self.fill,
            &self.size,
            &self.shape,
            &self.group,
            &self.label,
            &self.xmin,
            &self.xmax,
            &self.ymin,
            &self.ymax,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .collect()
    }
}
