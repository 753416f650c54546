//! Theme system for Grammar of Graphics.
//!
//! Controls the non-data visual appearance of charts. Text size and legend
//! placement are separate overlays so a theme change leaves them alone.

use crate::color::Rgba;

/// Theme specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Background color.
    pub background: Rgba,
    /// Panel background color.
    pub panel_background: Rgba,
    /// Grid line color.
    pub grid_color: Rgba,
    /// Axis line color.
    pub axis_color: Rgba,
    /// Text color.
    pub text_color: Rgba,
    /// Facet strip background.
    pub strip_background: Rgba,
    /// Show grid lines.
    pub show_grid: bool,
    /// Show axis lines.
    pub show_axis: bool,
    /// Show panel border.
    pub show_panel_border: bool,
    /// Grid line width.
    pub grid_width: f32,
    /// Axis line width.
    pub axis_width: f32,
    /// Margin around the chart in pixels.
    pub margin: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::grey()
    }
}

impl Theme {
    /// Preset names accepted by [`Theme::from_name`].
    pub const PRESETS: [&'static str; 6] = ["grey", "bw", "minimal", "classic", "dark", "void"];

    /// Grey panel with white grid lines.
    #[must_use]
    pub fn grey() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::GREY92,
            grid_color: Rgba::WHITE,
            axis_color: Rgba::GREY20,
            text_color: Rgba::GREY30,
            strip_background: Rgba::GREY85,
            show_grid: true,
            show_axis: false,
            show_panel_border: false,
            grid_width: 1.0,
            axis_width: 1.0,
            margin: 12.0,
        }
    }

    /// Minimal theme with white background.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::WHITE,
            grid_color: Rgba::rgb(220, 220, 220),
            axis_color: Rgba::rgb(100, 100, 100),
            text_color: Rgba::GREY30,
            strip_background: Rgba::WHITE,
            show_grid: true,
            show_axis: false,
            show_panel_border: false,
            grid_width: 0.5,
            axis_width: 0.5,
            margin: 12.0,
        }
    }

    /// Black and white theme.
    #[must_use]
    pub fn bw() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::WHITE,
            grid_color: Rgba::GREY92,
            axis_color: Rgba::GREY20,
            text_color: Rgba::GREY30,
            strip_background: Rgba::GREY85,
            show_grid: true,
            show_axis: false,
            show_panel_border: true,
            grid_width: 0.5,
            axis_width: 1.0,
            margin: 12.0,
        }
    }

    /// Classic theme: axis lines, no grid.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::WHITE,
            grid_color: Rgba::WHITE,
            axis_color: Rgba::BLACK,
            text_color: Rgba::BLACK,
            strip_background: Rgba::WHITE,
            show_grid: false,
            show_axis: true,
            show_panel_border: false,
            grid_width: 0.0,
            axis_width: 1.0,
            margin: 12.0,
        }
    }

    /// Dark panel.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::rgb(50, 50, 50),
            grid_color: Rgba::rgb(80, 80, 80),
            axis_color: Rgba::GREY20,
            text_color: Rgba::GREY30,
            strip_background: Rgba::rgb(30, 30, 30),
            show_grid: true,
            show_axis: false,
            show_panel_border: false,
            grid_width: 0.5,
            axis_width: 0.5,
            margin: 12.0,
        }
    }

    /// Void theme (nothing but data).
    #[must_use]
    pub fn void() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::WHITE,
            grid_color: Rgba::WHITE,
            axis_color: Rgba::WHITE,
            text_color: Rgba::GREY30,
            strip_background: Rgba::WHITE,
            show_grid: false,
            show_axis: false,
            show_panel_border: false,
            grid_width: 0.0,
            axis_width: 0.0,
            margin: 6.0,
        }
    }

    /// Preset by name (see [`Theme::PRESETS`]).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "grey" | "gray" => Some(Self::grey()),
            "bw" => Some(Self::bw()),
            "minimal" => Some(Self::minimal()),
            "classic" => Some(Self::classic()),
            "dark" => Some(Self::dark()),
            "void" => Some(Self::void()),
            _ => None,
        }
    }

    /// Whether tick labels and axis titles are drawn.
    #[must_use]
    pub fn shows_axis_text(&self) -> bool {
        self.axis_color != self.background || self.show_axis
    }

    /// Set background color.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Set panel background color.
    #[must_use]
    pub fn panel_background(mut self, color: Rgba) -> Self {
        self.panel_background = color;
        self
    }

    /// Set grid color.
    #[must_use]
    pub fn grid_color(mut self, color: Rgba) -> Self {
        self.grid_color = color;
        self
    }

    /// Set margin.
    #[must_use]
    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = margin.max(0.0);
        self
    }

    /// Enable or disable grid lines.
    #[must_use]
    pub fn grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Enable or disable axis lines.
    #[must_use]
    pub fn axis(mut self, show: bool) -> Self {
        self.show_axis = show;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_grey_is_default() {
        let t = Theme::default();
        assert_eq!(t, Theme::grey());
        assert_eq!(t.panel_background, Rgba::GREY92);
        assert!(t.show_grid);
    }

    #[test]
    fn test_theme_customization() {
        let t = Theme::minimal().background(Rgba::rgb(250, 250, 250)).margin(20.0).grid(false);
        assert!((t.margin - 20.0).abs() < f32::EPSILON);
        assert!(!t.show_grid);
    }

    #[test]
    fn test_theme_bw() {
        let t = Theme::bw();
        assert!(t.show_panel_border);
        assert_eq!(t.panel_background, Rgba::WHITE);
    }

    #[test]
    fn test_theme_classic() {
        let t = Theme::classic();
        assert!(!t.show_grid);
        assert!(t.show_axis);
    }

    #[test]
    fn test_theme_void() {
        let t = Theme::void();
        assert!(!t.show_grid);
        assert!(!t.show_axis);
        assert!(!t.shows_axis_text());
    }

    #[test]
    fn test_theme_from_name() {
        for name in Theme::PRESETS {
            assert!(Theme::from_name(name).is_some(), "{name}");
        }
        assert_eq!(Theme::from_name("dark"), Some(Theme::dark()));
        assert!(Theme::from_name("neon").is_none());
    }
}
