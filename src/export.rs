//! Writing figures to image files.
//!
//! A [`Figure`] is either one chart or a composed [`Layout`]. [`save`]
//! renders it completely in memory at the pixel size derived from
//! [`ExportOptions`] and then performs a single write, so a failed export
//! leaves nothing behind.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::{Framebuffer, MAX_PIXELS};
use crate::geometry::Rect;
use crate::grammar::Chart;
use crate::layout::Layout;
use crate::output::{PngEncoder, SvgEncoder};
use crate::render::Canvas;

/// Something that can be exported: a chart or a layout of charts.
#[derive(Debug, Clone)]
pub enum Figure {
    /// A single chart.
    Chart(Box<Chart>),
    /// Several charts arranged together.
    Layout(Layout),
}

impl From<Chart> for Figure {
    fn from(chart: Chart) -> Self {
        Figure::Chart(Box::new(chart))
    }
}

impl From<Layout> for Figure {
    fn from(layout: Layout) -> Self {
        Figure::Layout(layout)
    }
}

impl Figure {
    /// Preferred pixel size when no export size is given.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        match self {
            Figure::Chart(chart) => (chart.width(), chart.height()),
            Figure::Layout(layout) => layout.pixel_size(),
        }
    }

    /// Charts in the figure, left to right and top to bottom.
    #[must_use]
    pub fn charts(&self) -> Vec<&Chart> {
        match self {
            Figure::Chart(chart) => vec![chart.as_ref()],
            Figure::Layout(layout) => layout.leaves(),
        }
    }

    /// Draw the figure into `area`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a chart.
    pub fn render(&self, canvas: &mut dyn Canvas, area: Rect) -> Result<()> {
        match self {
            Figure::Chart(chart) => chart.draw(canvas, area),
            Figure::Layout(layout) => {
                canvas.fill_rect(area, Rgba::WHITE);
                for (rect, chart) in layout.arrange(area) {
                    chart.draw(canvas, rect)?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Length unit for export sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// Pixels.
    #[default]
    Px,
    /// Inches.
    In,
    /// Centimetres.
    Cm,
    /// Millimetres.
    Mm,
}

impl Unit {
    /// Unit by its suffix: `px`, `in`, `cm` or `mm`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "px" => Some(Unit::Px),
            "in" => Some(Unit::In),
            "cm" => Some(Unit::Cm),
            "mm" => Some(Unit::Mm),
            _ => None,
        }
    }

    /// Suffix used in SVG length attributes.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::In => "in",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
        }
    }

    /// Convert `length` in this unit to pixels at `dpi`.
    #[must_use]
    pub fn to_pixels(self, length: f64, dpi: f64) -> f64 {
        match self {
            Unit::Px => length,
            Unit::In => length * dpi,
            Unit::Cm => length / 2.54 * dpi,
            Unit::Mm => length / 25.4 * dpi,
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raster PNG.
    Png,
    /// Vector SVG.
    Svg,
}

impl Format {
    /// Format for a file extension, case-insensitive.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Format::Png),
            "svg" => Some(Format::Svg),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Png => f.write_str("png"),
            Format::Svg => f.write_str("svg"),
        }
    }
}

/// Size, resolution and format of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    width: Option<f64>,
    height: Option<f64>,
    unit: Unit,
    dpi: f64,
    format: Option<Format>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            unit: Unit::Px,
            dpi: Self::DEFAULT_DPI,
            format: None,
        }
    }
}

impl ExportOptions {
    /// Resolution used when none is set.
    pub const DEFAULT_DPI: f64 = 96.0;

    /// Options that keep the figure's own pixel size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output size in [`ExportOptions::unit`]s.
    #[must_use]
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Unit of the size.
    #[must_use]
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Resolution in dots per inch.
    #[must_use]
    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Force a format instead of inferring it from the extension.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Resolution in dots per inch.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.dpi
    }

    /// Pixel size for a figure whose own size is `fallback`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a non-positive size or
    /// resolution, or when the raster would exceed [`MAX_PIXELS`].
    pub fn pixel_size(&self, fallback: (u32, u32)) -> Result<(u32, u32)> {
        let (width, height) = match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            _ => (f64::from(fallback.0), f64::from(fallback.1)),
        };
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(Error::InvalidDimensions { width, height });
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidDimensions { width, height });
        }
        let unit = if self.width.is_some() { self.unit } else { Unit::Px };
        let px = |len: f64| unit.to_pixels(len, self.dpi).round().max(1.0);
        let (w, h) = (px(width), px(height));
        if w > f64::from(u32::MAX) || h > f64::from(u32::MAX) || w * h > MAX_PIXELS as f64 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok((w as u32, h as u32))
    }

    /// Physical SVG size such as `("15cm", "10cm")`, when a physical unit
    /// was given.
    fn physical_size(&self) -> Option<(String, String)> {
        match (self.width, self.height, self.unit) {
            (_, _, Unit::Px) | (None, _, _) | (_, None, _) => None,
            (Some(w), Some(h), unit) => Some((
                format!("{w}{}", unit.suffix()),
                format!("{h}{}", unit.suffix()),
            )),
        }
    }

    fn resolve_format(&self, path: &Path) -> Result<Format> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Format::from_extension(ext).ok_or_else(|| {
            Error::export_target(path, format!("unknown image format `{ext}`"))
        })
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Render `figure` to encoded bytes without touching the file system.
///
/// # Errors
///
/// Returns an error for invalid dimensions, a failing chart or a failing
/// encoder.
pub fn encode(figure: &Figure, format: Format, options: &ExportOptions) -> Result<Vec<u8>> {
    let (width, height) = options.pixel_size(figure.pixel_size())?;
    let area = Rect::new(0.0, 0.0, width as f32, height as f32);
    match format {
        Format::Png => {
            let mut fb = Framebuffer::new(width, height)?;
            figure.render(&mut fb, area)?;
            let (min, max, mean) = fb.luminance_stats();
            debug!(backend = ?Framebuffer::backend(), min, max, mean, "raster rendered");
            if max - min < f32::EPSILON {
                warn!(width, height, "rendered figure is a single flat colour");
            }
            PngEncoder::to_bytes_with_dpi(&fb, Some(options.resolution()))
        }
        Format::Svg => {
            let mut svg = SvgEncoder::new(width, height).background(None);
            if let Some((w, h)) = options.physical_size() {
                svg = svg.physical_size(w, h);
            }
            figure.render(&mut svg, area)?;
            Ok(svg.render().into_bytes())
        }
    }
}

/// Render `figure` and write it to `path`.
///
/// # Errors
///
/// Returns [`Error::ExportTarget`] when the format cannot be resolved, the
/// parent directory is missing or the write fails, and
/// [`Error::InvalidDimensions`] for a bad size. Nothing is written on error.
pub fn save(figure: &Figure, path: impl AsRef<Path>, options: &ExportOptions) -> Result<()> {
    let path = path.as_ref();
    let format = options.resolve_format(path)?;
    check_target(path)?;

    let bytes = encode(figure, format, options)?;
    std::fs::write(path, &bytes).map_err(|e| Error::export_target(path, e.to_string()))?;

    let (width, height) = options.pixel_size(figure.pixel_size())?;
    info!(
        path = %path.display(),
        %format,
        width,
        height,
        bytes = bytes.len(),
        "figure exported"
    );
    Ok(())
}

fn check_target(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(Error::export_target(path, "target is a directory"));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(
            Error::export_target(path, "parent directory does not exist"),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Aes, Geom, Overlay};
    use crate::table::{Column, Table};
    use batuta_common::display::WithDimensions;

    fn chart(title: &str) -> Chart {
        let table = Table::new(vec![
            Column::float("age", &[500.0, 1200.0, 1800.0]),
            Column::float("mass", &[3.0, 5.5, 4.1]),
        ])
        .unwrap();
        Chart::new(table, Aes::new().x("age").y("mass"))
            .unwrap()
            .geom(Geom::point())
            .unwrap()
            .overlay(Overlay::title(title))
            .dimensions(160, 120)
    }

    #[test]
    fn test_unit_conversion() {
        assert!((Unit::Cm.to_pixels(2.54, 300.0) - 300.0).abs() < 1e-9);
        assert!((Unit::Mm.to_pixels(25.4, 72.0) - 72.0).abs() < 1e-9);
        assert!((Unit::Px.to_pixels(640.0, 300.0) - 640.0).abs() < 1e-9);
        assert_eq!(Unit::from_name("in"), Some(Unit::In));
        assert_eq!(Unit::from_name("pt"), None);
    }

    #[test]
    fn test_pixel_size() {
        let opts = ExportOptions::new().size(2.0, 1.0).unit(Unit::In).dpi(150.0);
        assert_eq!(opts.pixel_size((1, 1)).unwrap(), (300, 150));
        assert_eq!(ExportOptions::new().pixel_size((640, 480)).unwrap(), (640, 480));
    }

    #[test]
    fn test_invalid_dimensions() {
        let zero_dpi = ExportOptions::new().dpi(0.0);
        assert!(matches!(
            zero_dpi.pixel_size((10, 10)),
            Err(Error::InvalidDimensions { .. })
        ));
        let negative = ExportOptions::new().size(-1.0, 5.0);
        assert!(matches!(
            negative.pixel_size((10, 10)),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_oversized_export_is_invalid_dimensions() {
        let huge = ExportOptions::new().size(1.0e7, 1.0e7);
        let err = encode(&chart("a").into(), Format::Png, &huge).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));

        let wide = ExportOptions::new().size(1.0e12, 10.0);
        assert!(wide.pixel_size((1, 1)).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.svg");
        let opts = ExportOptions::new().size(500.0, 500.0).unit(Unit::In).dpi(600.0);
        assert!(save(&chart("a").into(), &path, &opts).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_png_records_size_and_dpi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scatter.png");
        let opts = ExportOptions::new().size(2.0, 1.0).unit(Unit::In).dpi(100.0);
        save(&chart("a").into(), &path, &opts).unwrap();

        let decoder = png::Decoder::new(std::fs::File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (200, 100));
        let dims = info.pixel_dims.expect("pHYs chunk");
        assert_eq!(dims.xppu, (100.0_f64 / 0.0254).round() as u32);
    }

    #[test]
    fn test_svg_records_physical_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scatter.svg");
        let opts = ExportOptions::new().size(15.0, 10.0).unit(Unit::Cm).dpi(96.0);
        save(&chart("Mass by age").into(), &path, &opts).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("width=\"15cm\""));
        assert!(svg.contains("height=\"10cm\""));
        assert!(svg.contains("Mass by age"));
    }

    #[test]
    fn test_unknown_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scatter.gif");
        let err = save(&chart("a").into(), &path, &ExportOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ExportTarget { .. }));
        assert!(!path.exists());

        let forced = ExportOptions::new().format(Format::Svg);
        save(&chart("a").into(), &path, &forced).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_parent_is_export_target_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let err = save(&chart("a").into(), &path, &ExportOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ExportTarget { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_size_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let opts = ExportOptions::new().size(0.0, 4.0).unit(Unit::In);
        let err = save(&chart("a").into(), &path, &opts).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_layout_figure() {
        let figure = Figure::from(chart("left") | chart("right"));
        assert_eq!(figure.pixel_size(), (320, 120));
        assert_eq!(figure.charts().len(), 2);

        let svg = String::from_utf8(encode(&figure, Format::Svg, &ExportOptions::new()).unwrap())
            .unwrap();
        assert!(svg.contains(">left</text>"));
        assert!(svg.contains(">right</text>"));
    }
}
