//! Chart customisations.
//!
//! Each [`Overlay`] sets exactly one property. A chart keeps its overlays in
//! order and [`Decorations::resolve`] folds them, so the later of two
//! overlays on one property wins and overlays on different properties
//! commute.

use crate::color::Palette;

use super::theme::Theme;

/// Where the legend is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    /// Right of the panels.
    #[default]
    Right,
    /// Below the panels.
    Bottom,
    /// Above the panels.
    Top,
    /// Left of the panels.
    Left,
    /// No legend.
    None,
}

impl LegendPosition {
    /// Position by name: `right`, `bottom`, `top`, `left` or `none`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "top" => Some(Self::Top),
            "left" => Some(Self::Left),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// A single-property customisation layered onto a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Replace the complete theme.
    Theme(Theme),
    /// Chart title.
    Title(String),
    /// Chart subtitle.
    Subtitle(String),
    /// X axis title.
    XLabel(String),
    /// Y axis title.
    YLabel(String),
    /// Legend placement.
    Legend(LegendPosition),
    /// Base text size in pixels.
    BaseSize(f32),
    /// Palette for a discrete `fill` mapping.
    FillPalette(Palette),
    /// Palette for a discrete `colour` mapping.
    ColourPalette(Palette),
    /// Fixed x axis limits.
    XLimits(f64, f64),
    /// Fixed y axis limits.
    YLimits(f64, f64),
}

/// Property an overlay sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// See [`Overlay::Theme`].
    Theme,
    /// See [`Overlay::Title`].
    Title,
    /// See [`Overlay::Subtitle`].
    Subtitle,
    /// See [`Overlay::XLabel`].
    XLabel,
    /// See [`Overlay::YLabel`].
    YLabel,
    /// See [`Overlay::Legend`].
    Legend,
    /// See [`Overlay::BaseSize`].
    BaseSize,
    /// See [`Overlay::FillPalette`].
    FillPalette,
    /// See [`Overlay::ColourPalette`].
    ColourPalette,
    /// See [`Overlay::XLimits`].
    XLimits,
    /// See [`Overlay::YLimits`].
    YLimits,
}

impl Overlay {
    /// Set the chart title.
    #[must_use]
    pub fn title(text: impl Into<String>) -> Self {
        Overlay::Title(text.into())
    }

    /// Set the chart subtitle.
    #[must_use]
    pub fn subtitle(text: impl Into<String>) -> Self {
        Overlay::Subtitle(text.into())
    }

    /// Set the x axis title.
    #[must_use]
    pub fn xlab(text: impl Into<String>) -> Self {
        Overlay::XLabel(text.into())
    }

    /// Set the y axis title.
    #[must_use]
    pub fn ylab(text: impl Into<String>) -> Self {
        Overlay::YLabel(text.into())
    }

    /// The property this overlay sets.
    #[must_use]
    pub const fn property(&self) -> Property {
        match self {
            Overlay::Theme(_) => Property::Theme,
            Overlay::Title(_) => Property::Title,
            Overlay::Subtitle(_) => Property::Subtitle,
            Overlay::XLabel(_) => Property::XLabel,
            Overlay::YLabel(_) => Property::YLabel,
            Overlay::Legend(_) => Property::Legend,
            Overlay::BaseSize(_) => Property::BaseSize,
            Overlay::FillPalette(_) => Property::FillPalette,
            Overlay::ColourPalette(_) => Property::ColourPalette,
            Overlay::XLimits(..) => Property::XLimits,
            Overlay::YLimits(..) => Property::YLimits,
        }
    }
}

/// Resolved chart properties after folding every overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    /// Active theme.
    pub theme: Theme,
    /// Title.
    pub title: Option<String>,
    /// Subtitle.
    pub subtitle: Option<String>,
    /// X axis title; defaults to the mapped column.
    pub x_label: Option<String>,
    /// Y axis title; defaults to the mapped column.
    pub y_label: Option<String>,
    /// Legend placement.
    pub legend: LegendPosition,
    /// Base text size in pixels.
    pub base_size: f32,
    /// Discrete fill palette.
    pub fill_palette: Palette,
    /// Discrete colour palette.
    pub colour_palette: Palette,
    /// Fixed x limits.
    pub x_limits: Option<(f64, f64)>,
    /// Fixed y limits.
    pub y_limits: Option<(f64, f64)>,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            title: None,
            subtitle: None,
            x_label: None,
            y_label: None,
            legend: LegendPosition::default(),
            base_size: 11.0,
            fill_palette: Palette::default(),
            colour_palette: Palette::default(),
            x_limits: None,
            y_limits: None,
        }
    }
}

impl Decorations {
    /// Fold overlays in order over the defaults.
    #[must_use]
    pub fn resolve<'a, I>(overlays: I) -> Self
    where
        I: IntoIterator<Item = &'a Overlay>,
    {
        overlays.into_iter().fold(Self::default(), |mut d, overlay| {
            d.apply(overlay);
            d
        })
    }

    /// Apply one overlay, replacing only the property it names.
    pub fn apply(&mut self, overlay: &Overlay) {
        match overlay {
            Overlay::Theme(theme) => self.theme = theme.clone(),
            Overlay::Title(t) => self.title = Some(t.clone()),
            Overlay::Subtitle(t) => self.subtitle = Some(t.clone()),
            Overlay::XLabel(t) => self.x_label = Some(t.clone()),
            Overlay::YLabel(t) => self.y_label = Some(t.clone()),
            Overlay::Legend(p) => self.legend = *p,
            Overlay::BaseSize(s) => self.base_size = s.max(1.0),
            Overlay::FillPalette(p) => self.fill_palette = p.clone(),
            Overlay::ColourPalette(p) => self.colour_palette = p.clone(),
            Overlay::XLimits(a, b) => self.x_limits = Some((a.min(*b), a.max(*b))),
            Overlay::YLimits(a, b) => self.y_limits = Some((a.min(*b), a.max(*b))),
        }
    }
}
