//! Execution context that remembers the last figure.
//!
//! Every chart or layout recorded with [`Session::plot`] or
//! [`Session::compose`] replaces the previous one, and [`Session::save`]
//! exports whichever was recorded last.

use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::{self, ExportOptions, Figure};
use crate::grammar::{Chart, Overlay};
use crate::layout::Layout;

/// Holds the configuration and the most recently recorded figure.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: Config,
    last: Option<Figure>,
}

impl Session {
    /// Create a session with `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, last: None }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Overlays every recorded chart starts from. The chart's own overlays
    /// come after them and therefore win.
    #[must_use]
    pub fn default_overlays(&self) -> Vec<Overlay> {
        let palette = self.config.palette();
        vec![
            Overlay::Theme(self.config.theme()),
            Overlay::BaseSize(self.config.base_size),
            Overlay::FillPalette(palette.clone()),
            Overlay::ColourPalette(palette),
        ]
    }

    fn apply_defaults(&self, chart: Chart) -> Chart {
        chart.with_defaults(&self.default_overlays(), self.config.dimensions())
    }

    /// Record `chart` as the last figure and return it with the session
    /// defaults applied.
    pub fn plot(&mut self, chart: Chart) -> &Figure {
        let chart = self.apply_defaults(chart);
        debug!(layers = chart.layers().len(), "chart recorded");
        self.last.insert(Figure::from(chart))
    }

    /// Record `layout` as the last figure, applying the session defaults to
    /// every chart in it.
    pub fn compose(&mut self, layout: Layout) -> &Figure {
        let layout = self.apply_layout_defaults(layout);
        debug!(charts = layout.leaves().len(), "layout recorded");
        self.last.insert(Figure::from(layout))
    }

    fn apply_layout_defaults(&self, layout: Layout) -> Layout {
        match layout {
            Layout::Leaf(chart) => Layout::Leaf(Box::new(self.apply_defaults(*chart))),
            Layout::Beside(children) => Layout::Beside(self.map_children(children)),
            Layout::Stack(children) => Layout::Stack(self.map_children(children)),
            Layout::Group {
                children,
                nrow,
                ncol,
                sealed,
            } => Layout::Group {
                children: self.map_children(children),
                nrow,
                ncol,
                sealed,
            },
        }
    }

    fn map_children(&self, children: Vec<Layout>) -> Vec<Layout> {
        children
            .into_iter()
            .map(|child| self.apply_layout_defaults(child))
            .collect()
    }

    /// The last recorded figure.
    #[must_use]
    pub fn last(&self) -> Option<&Figure> {
        self.last.as_ref()
    }

    /// Export the last recorded figure. The record is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExportTarget`] if nothing has been recorded yet, and
    /// any error of [`export::save`].
    pub fn save(&self, path: impl AsRef<Path>, options: &ExportOptions) -> Result<()> {
        let path = path.as_ref();
        let figure = self
            .last
            .as_ref()
            .ok_or_else(|| Error::export_target(path, "no figure has been plotted yet"))?;
        export::save(figure, path, options)
    }

    /// Export an explicit figure without recording it.
    ///
    /// # Errors
    ///
    /// Returns any error of [`export::save`].
    pub fn save_figure(
        &self,
        figure: impl Into<Figure>,
        path: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<()> {
        export::save(&figure.into(), path, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Aes, Geom, Theme};
    use crate::table::{Column, Table};

    fn chart(title: &str) -> Chart {
        let table = Table::new(vec![
            Column::float("age", &[1.0, 2.0]),
            Column::float("mass", &[3.0, 4.0]),
        ])
        .unwrap();
        Chart::new(table, Aes::new().x("age").y("mass"))
            .unwrap()
            .geom(Geom::point())
            .unwrap()
            .overlay(Overlay::title(title))
    }

    fn last_title(session: &Session) -> Option<String> {
        session.last()?.charts().first()?.decorations().title
    }

    #[test]
    fn test_last_writer_wins() {
        let mut session = Session::default();
        assert!(session.last().is_none());
        session.plot(chart("A"));
        session.plot(chart("B"));
        assert_eq!(last_title(&session).as_deref(), Some("B"));
    }

    #[test]
    fn test_save_without_figure_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let err = Session::default().save(&path, &ExportOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ExportTarget { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_defaults_applied_and_user_overlays_win() {
        let config = Config::parse("theme: bw\nbase_size: 15\ndimensions:\n  width: 200\n  height: 100\n")
            .unwrap();
        let mut session = Session::new(config);
        let figure = session.plot(chart("A").overlay(Overlay::BaseSize(9.0)));
        let recorded = figure.charts()[0];
        let deco = recorded.decorations();
        assert_eq!(deco.theme, Theme::bw());
        assert!((deco.base_size - 9.0).abs() < f32::EPSILON);
        assert_eq!((recorded.width(), recorded.height()), (200, 100));
    }

    #[test]
    fn test_compose_records_layout() {
        let mut session = Session::new(Config::parse("theme: minimal").unwrap());
        session.plot(chart("A"));
        let figure = session.compose(chart("B") | chart("C"));
        assert!(matches!(figure, Figure::Layout(_)));
        assert_eq!(figure.charts().len(), 2);
        assert_eq!(figure.charts()[0].decorations().theme, Theme::minimal());
        assert_eq!(last_title(&session).as_deref(), Some("B"));
    }

    #[test]
    fn test_save_leaves_record_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::default();
        session.plot(chart("A"));
        session.save(dir.path().join("a.svg"), &ExportOptions::new()).unwrap();
        session
            .save_figure(chart("explicit"), dir.path().join("b.svg"), &ExportOptions::new())
            .unwrap();
        assert_eq!(last_title(&session).as_deref(), Some("A"));
        let b = std::fs::read_to_string(dir.path().join("b.svg")).unwrap();
        assert!(b.contains("explicit"));
    }
}
