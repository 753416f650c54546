//! Drawing a chart onto a [`Canvas`].
//!
//! Scales are trained once on the full table and shared by every facet
//! panel. Values a scale cannot place (missing, non-numeric on a continuous
//! axis, outside fixed limits) are skipped and reported at `trace` level.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::aes::Aes;
use super::chart::{Chart, Layer};
use super::facet::Facet;
use super::geom::{GeomType, PointShape, Position};
use super::overlay::{Decorations, LegendPosition};
use super::stat::BoxStats;
use super::theme::Theme;
use crate::color::{Palette, Rgba};
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::output::SvgEncoder;
use crate::render::{Canvas, TextAnchor, TextStyle};
use crate::scale::{extent, nice_ticks, BandScale, ColorScale, LinearScale, Scale};
use crate::table::{Column, DataType, Table, Value};

/// Fraction of the data range added on both sides of continuous axes.
const EXPAND: f64 = 0.05;
/// Share of a band split between dodged marks.
const DODGE_WIDTH: f32 = 0.9;
const DEFAULT_INK: Rgba = Rgba::GREY20;
const DEFAULT_FILL: Rgba = Rgba::rgb(89, 89, 89);
const NA_COLOUR: Rgba = Rgba::rgb(127, 127, 127);
const POINT_RADIUS: f32 = 2.5;
const SIZE_RANGE: (f32, f32) = (1.5, 6.0);
/// Average glyph width relative to font size.
const GLYPH_WIDTH: f32 = 0.55;

impl Chart {
    /// Draw the chart into `area` of `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rendering`] if a layer lacks a channel its mark
    /// needs (for example a point layer without `y`).
    pub fn draw(&self, canvas: &mut dyn Canvas, area: Rect) -> Result<()> {
        let deco = self.decorations();
        let theme = &deco.theme;
        let table = self.data();
        let panels = split_panels(table, self.facet_spec())?;
        let trained = Trained::train(self, &deco, &panels)?;

        canvas.fill_rect(area, theme.background);

        let base = deco.base_size;
        let mut inner = area.inset(theme.margin, theme.margin, theme.margin, theme.margin);

        if let Some(title) = &deco.title {
            let size = base * 1.2;
            canvas.text(
                Point::new(inner.x, inner.y + size),
                title,
                &TextStyle::new(size, theme.text_color),
            );
            inner = inner.inset(size + 6.0, 0.0, 0.0, 0.0);
        }
        if let Some(subtitle) = &deco.subtitle {
            let size = base * 0.9;
            canvas.text(
                Point::new(inner.x, inner.y + size),
                subtitle,
                &TextStyle::new(size, theme.text_color),
            );
            inner = inner.inset(size + 6.0, 0.0, 0.0, 0.0);
        }

        let legends = trained.legends();
        if !legends.is_empty() && deco.legend != LegendPosition::None {
            inner = place_legends(canvas, &legends, inner, &deco);
        }

        let show_text = theme.shows_axis_text();
        let tick_size = base * 0.8;
        let y_probe = LinearScale::new(trained.y, (1.0, 0.0))?;
        let y_label_width = y_probe
            .ticks(5)
            .labels()
            .iter()
            .map(|l| text_width(l, tick_size))
            .fold(0.0_f32, f32::max);

        let x_title = deco.x_label.clone().or_else(|| default_title(self, |a| &a.x));
        let y_title = deco.y_label.clone().or_else(|| default_title(self, |a| &a.y));
        let (left, bottom) = if show_text {
            (
                y_label_width + 8.0 + y_title.as_ref().map_or(0.0, |_| base + 6.0),
                tick_size + 8.0 + x_title.as_ref().map_or(0.0, |_| base + 6.0),
            )
        } else {
            (0.0, 0.0)
        };
        let plot_area = inner.inset(0.0, 0.0, bottom, left);

        if show_text {
            let style = TextStyle::new(base, theme.text_color).anchor(TextAnchor::Middle);
            if let Some(t) = &x_title {
                canvas.text(
                    Point::new(plot_area.center().x, plot_area.bottom() + tick_size + 6.0 + base),
                    t,
                    &style,
                );
            }
            if let Some(t) = &y_title {
                canvas.text(
                    Point::new(inner.x + base * 0.8, plot_area.center().y),
                    t,
                    &style.rotate(-90.0),
                );
            }
        }

        let faceted = self.facet_spec().column().is_some();
        let (nrow, ncol) = self.facet_spec().dimensions(panels.len());
        let strip = if faceted { tick_size + 8.0 } else { 0.0 };
        let gap = if faceted { 6.0 } else { 0.0 };

        for (i, panel) in panels.iter().enumerate() {
            let (r, c) = (i / ncol, i % ncol);
            let cell = plot_area.grid_cell(r, c, nrow, ncol, gap);
            let rect = cell.inset(strip, 0.0, 0.0, 0.0);

            if let Some(label) = &panel.label {
                let strip_rect = Rect::new(cell.x, cell.y, cell.width, strip);
                canvas.fill_rect(strip_rect, theme.strip_background);
                canvas.text(
                    Point::new(strip_rect.center().x, strip_rect.center().y + tick_size * 0.35),
                    label,
                    &TextStyle::new(tick_size, strip_text_colour(theme)).anchor(TextAnchor::Middle),
                );
            }

            let painter = PanelPainter::new(table, &trained, rect)?;
            painter.draw(canvas, self.layers(), &panel.rows, theme)?;

            if show_text {
                let last_in_column = i + ncol >= panels.len();
                if last_in_column {
                    painter.x_labels(canvas, tick_size, theme);
                }
                if c == 0 {
                    painter.y_labels(canvas, tick_size, theme);
                }
            }
        }

        debug!(
            panels = panels.len(),
            layers = self.layers().len(),
            width = area.width,
            height = area.height,
            "chart drawn"
        );
        Ok(())
    }

    /// Render at the chart's own size to a raster framebuffer. Text is not
    /// drawn in raster output.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is invalid or drawing fails.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width(), self.height())?;
        self.draw(&mut fb, Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32))?;
        Ok(fb)
    }

    /// Render at the chart's own size to an SVG scene.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    pub fn to_svg(&self) -> Result<SvgEncoder> {
        let mut svg = SvgEncoder::new(self.width(), self.height()).background(None);
        self.draw(&mut svg, Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32))?;
        Ok(svg)
    }
}

fn default_title(chart: &Chart, channel: impl Fn(&Aes) -> &Option<String>) -> Option<String> {
    channel(chart.mapping())
        .clone()
        .or_else(|| chart.layers().iter().find_map(|l| channel(&l.aes).clone()))
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH
}

fn strip_text_colour(theme: &Theme) -> Rgba {
    let bg = theme.strip_background;
    let luma = 0.299 * f32::from(bg.r) + 0.587 * f32::from(bg.g) + 0.114 * f32::from(bg.b);
    if luma < 128.0 {
        Rgba::WHITE
    } else {
        theme.text_color
    }
}

fn numbers(values: &[Value]) -> impl Iterator<Item = f64> + '_ {
    values.iter().filter_map(Value::as_f64).filter(|v| v.is_finite())
}

fn padded<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    LinearScale::from_data(values, (0.0, 1.0), EXPAND).map(|s| s.domain())
}

fn required<'a>(channel: &'a Option<String>, geom: &str, name: &str) -> Result<&'a str> {
    channel
        .as_deref()
        .ok_or_else(|| Error::Rendering(format!("{geom} layer needs a `{name}` mapping")))
}

// ============================================================================
// Panels
// ============================================================================

struct Panel {
    label: Option<String>,
    rows: Vec<usize>,
}

fn split_panels(table: &Table, facet: &Facet) -> Result<Vec<Panel>> {
    let Some(var) = facet.column() else {
        return Ok(vec![Panel {
            label: None,
            rows: (0..table.nrow()).collect(),
        }]);
    };
    let column = table.column(var)?;
    let levels = column.levels();
    let mut panels: Vec<Panel> = levels
        .iter()
        .map(|l| Panel {
            label: Some(l.to_string()),
            rows: Vec::new(),
        })
        .collect();
    for (row, v) in column.values().iter().enumerate() {
        match levels.iter().position(|l| l.key_eq(v)) {
            Some(i) => panels[i].rows.push(row),
            None => trace!(row, column = var, "missing facet value, row not drawn"),
        }
    }
    if panels.is_empty() {
        panels.push(Panel {
            label: None,
            rows: Vec::new(),
        });
    }
    Ok(panels)
}

// ============================================================================
// Trained scales
// ============================================================================

enum XDomain {
    Discrete(Vec<String>),
    Continuous((f64, f64)),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Colour,
    Fill,
}

#[derive(Debug, Clone, PartialEq)]
enum ColourMapping {
    Discrete { levels: Vec<Value>, colors: Vec<Rgba> },
    Continuous(ColorScale),
}

impl ColourMapping {
    fn train(column: &Column, palette: &Palette) -> Option<Self> {
        if column.dtype().is_numeric() {
            let domain = extent(numbers(column.values()))?;
            ColorScale::blues(domain).ok().map(Self::Continuous)
        } else {
            let levels = column.levels();
            let colors = palette.colors(levels.len());
            Some(Self::Discrete { levels, colors })
        }
    }

    fn color(&self, v: &Value) -> Rgba {
        match self {
            Self::Discrete { levels, colors } => levels
                .iter()
                .position(|l| l.key_eq(v))
                .and_then(|i| colors.get(i).copied())
                .unwrap_or(NA_COLOUR),
            Self::Continuous(scale) => v
                .as_f64()
                .filter(|x| x.is_finite())
                .map_or(NA_COLOUR, |x| scale.scale(x)),
        }
    }

    fn entries(&self) -> Vec<(Rgba, String)> {
        match self {
            Self::Discrete { levels, colors } => levels
                .iter()
                .zip(colors)
                .map(|(l, c)| (*c, l.to_string()))
                .collect(),
            Self::Continuous(scale) => {
                let (lo, hi) = scale.domain();
                let mut ticks = nice_ticks(lo, hi, 4);
                let tolerance = ticks.step * 1e-9;
                ticks.values.retain(|v| *v >= lo - tolerance && *v <= hi + tolerance);
                ticks
                    .values
                    .iter()
                    .zip(ticks.labels())
                    .map(|(v, label)| (scale.scale(*v), label))
                    .collect()
            }
        }
    }
}

struct ChannelMap {
    channel: Channel,
    column: String,
    mapping: ColourMapping,
}

struct LegendSpec {
    title: String,
    square: bool,
    entries: Vec<(Rgba, String)>,
}

/// Everything trained on the whole table.
struct Trained {
    x: XDomain,
    x_resolution: Option<f64>,
    y: (f64, f64),
    maps: Vec<ChannelMap>,
    shapes: Option<(String, Vec<Value>)>,
    sizes: Option<(String, (f64, f64))>,
}

impl Trained {
    fn train(chart: &Chart, deco: &Decorations, panels: &[Panel]) -> Result<Self> {
        let table = chart.data();
        let layers = chart.layers();
        let (x, x_resolution) = train_x(table, layers, deco)?;
        let y = train_y(table, layers, deco, panels)?;

        let mut maps: Vec<ChannelMap> = Vec::new();
        for layer in layers {
            let channels = [
                (Channel::Colour, layer.aes.colour.as_deref(), &deco.colour_palette),
                (Channel::Fill, layer.aes.fill.as_deref(), &deco.fill_palette),
            ];
            for (channel, column, palette) in channels {
                let Some(column) = column else { continue };
                if maps.iter().any(|m| m.channel == channel && m.column == column) {
                    continue;
                }
                if let Some(mapping) = ColourMapping::train(table.column(column)?, palette) {
                    maps.push(ChannelMap {
                        channel,
                        column: column.to_string(),
                        mapping,
                    });
                }
            }
        }

        let mut shapes = None;
        let mut sizes = None;
        for layer in layers {
            if let (None, Some(col)) = (&shapes, layer.aes.shape.as_deref()) {
                shapes = Some((col.to_string(), table.column(col)?.levels()));
            }
            if let (None, Some(col)) = (&sizes, layer.aes.size.as_deref()) {
                if let Some(range) = extent(numbers(table.column(col)?.values())) {
                    sizes = Some((col.to_string(), range));
                }
            }
        }

        Ok(Self {
            x,
            x_resolution,
            y,
            maps,
            shapes,
            sizes,
        })
    }

    fn mapped(&self, table: &Table, channel: Channel, column: Option<&str>, row: usize) -> Option<Rgba> {
        let column = column?;
        let map = self
            .maps
            .iter()
            .find(|m| m.channel == channel && m.column == column)?;
        let value = table.get(column)?.get(row)?;
        Some(map.mapping.color(value))
    }

    /// Outline / point colour of a row.
    fn ink(&self, table: &Table, aes: &Aes, row: usize) -> Rgba {
        let color = self
            .mapped(table, Channel::Colour, aes.colour.as_deref(), row)
            .or(aes.colour_value)
            .unwrap_or(DEFAULT_INK);
        with_alpha(color, aes.alpha_value)
    }

    /// Fill colour of a row.
    fn paint(&self, table: &Table, aes: &Aes, row: usize, default: Rgba) -> Rgba {
        let color = self
            .mapped(table, Channel::Fill, aes.fill.as_deref(), row)
            .or(aes.fill_value)
            .unwrap_or(default);
        with_alpha(color, aes.alpha_value)
    }

    fn shape(&self, table: &Table, aes: &Aes, row: usize) -> Option<PointShape> {
        let column = aes.shape.as_deref()?;
        let (trained, levels) = self.shapes.as_ref()?;
        if trained != column {
            return None;
        }
        let value = table.get(column)?.get(row)?;
        let index = levels.iter().position(|l| l.key_eq(value))?;
        Some(PointShape::CYCLE[index % PointShape::CYCLE.len()])
    }

    fn radius(&self, table: &Table, aes: &Aes, row: usize) -> f32 {
        let fixed = aes.size_value.unwrap_or(POINT_RADIUS);
        let Some(column) = aes.size.as_deref() else {
            return fixed;
        };
        let Some((_, (lo, hi))) = self.sizes.as_ref().filter(|(c, _)| c == column) else {
            return fixed;
        };
        let value = table.get(column).and_then(|c| c.get(row)).and_then(Value::as_f64);
        match value {
            Some(v) if hi > lo => {
                let t = ((v - lo) / (hi - lo)) as f32;
                SIZE_RANGE.0 + t * (SIZE_RANGE.1 - SIZE_RANGE.0)
            }
            Some(_) => (SIZE_RANGE.0 + SIZE_RANGE.1) / 2.0,
            None => fixed,
        }
    }

    fn legends(&self) -> Vec<LegendSpec> {
        let mut out: Vec<LegendSpec> = Vec::new();
        for map in &self.maps {
            let entries = map.mapping.entries();
            let square = map.channel == Channel::Fill;
            if let Some(existing) = out
                .iter_mut()
                .find(|l| l.title == map.column && l.entries == entries)
            {
                existing.square |= square;
                continue;
            }
            out.push(LegendSpec {
                title: map.column.clone(),
                square,
                entries,
            });
        }
        out
    }
}

fn with_alpha(color: Rgba, alpha: Option<f32>) -> Rgba {
    alpha.map_or(color, |a| color.with_opacity(a))
}

fn is_boxplot(layer: &Layer) -> bool {
    matches!(layer.geom.geom_type, GeomType::Boxplot { .. })
}

fn train_x(table: &Table, layers: &[Layer], deco: &Decorations) -> Result<(XDomain, Option<f64>)> {
    let mut discrete = false;
    let mut columns = Vec::new();
    for layer in layers {
        if let Some(x) = layer.aes.x.as_deref() {
            let column = table.column(x)?;
            discrete |= matches!(column.dtype(), DataType::Text | DataType::Bool);
            columns.push(column);
        } else if is_boxplot(layer) {
            discrete = true;
        }
    }

    if discrete {
        let mut levels: Vec<Value> = Vec::new();
        for column in &columns {
            for level in column.levels() {
                if !levels.iter().any(|l| l.key_eq(&level)) {
                    levels.push(level);
                }
            }
        }
        levels.sort_by(Value::total_cmp);
        let mut labels: Vec<String> = levels.iter().map(ToString::to_string).collect();
        if layers.iter().any(|l| l.aes.x.is_none() && is_boxplot(l)) {
            labels.push(String::new());
        }
        return Ok((XDomain::Discrete(labels), None));
    }

    let mut values = Vec::new();
    for layer in layers {
        for name in [&layer.aes.x, &layer.aes.xmin, &layer.aes.xmax].into_iter().flatten() {
            values.extend(numbers(table.column(name)?.values()));
        }
    }
    let positions: Vec<f64> = columns.iter().flat_map(|c| numbers(c.values())).collect();
    let domain = match deco.x_limits {
        Some((a, b)) => padded([a, b]),
        None => padded(values),
    };
    Ok((
        XDomain::Continuous(domain.unwrap_or((0.0, 1.0))),
        resolution(positions),
    ))
}

/// Smallest gap between distinct positions.
fn resolution(mut values: Vec<f64>) -> Option<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .min_by(f64::total_cmp)
}

fn train_y(table: &Table, layers: &[Layer], deco: &Decorations, panels: &[Panel]) -> Result<(f64, f64)> {
    if let Some((a, b)) = deco.y_limits {
        return Ok(padded([a, b]).unwrap_or((0.0, 1.0)));
    }
    let mut values = Vec::new();
    for layer in layers {
        match &layer.geom.geom_type {
            GeomType::Col { position, .. } => {
                values.push(0.0);
                for panel in panels {
                    for bar in stack_bars(table, &layer.aes, &panel.rows, *position)? {
                        values.push(bar.lo);
                        values.push(bar.hi);
                    }
                }
            }
            GeomType::Hline { yintercept } => values.push(*yintercept),
            _ => {
                for name in [&layer.aes.y, &layer.aes.ymin, &layer.aes.ymax].into_iter().flatten() {
                    values.extend(numbers(table.column(name)?.values()));
                }
            }
        }
    }
    Ok(padded(values).unwrap_or((0.0, 1.0)))
}

struct Bar {
    row: usize,
    lo: f64,
    hi: f64,
}

/// Column extents; stacking accumulates per x position, positives and
/// negatives separately, in row order.
fn stack_bars(table: &Table, aes: &Aes, rows: &[usize], position: Position) -> Result<Vec<Bar>> {
    let ys = table.column(required(&aes.y, "col", "y")?)?.values();
    let xs = match aes.x.as_deref() {
        Some(x) => Some(table.column(x)?.values()),
        None => None,
    };
    let mut positive: HashMap<String, f64> = HashMap::new();
    let mut negative: HashMap<String, f64> = HashMap::new();
    let mut bars = Vec::with_capacity(rows.len());
    for &row in rows {
        let Some(y) = ys[row].as_f64().filter(|v| v.is_finite()) else {
            trace!(row, "missing column height, bar skipped");
            continue;
        };
        let (lo, hi) = if position == Position::Stack {
            let key = xs.map_or_else(String::new, |xs| xs[row].to_string());
            let totals = if y >= 0.0 { &mut positive } else { &mut negative };
            let level = totals.entry(key).or_insert(0.0);
            let start = *level;
            *level += y;
            (start, *level)
        } else {
            (0.0, y)
        };
        bars.push(Bar { row, lo, hi });
    }
    Ok(bars)
}

/// Side-by-side placement keyed by `group`, else `fill`, else `colour`.
struct Dodge<'a> {
    values: Option<&'a [Value]>,
    levels: Vec<Value>,
}

impl<'a> Dodge<'a> {
    fn new(table: &'a Table, aes: &Aes) -> Result<Self> {
        let key = aes
            .group
            .as_deref()
            .or(aes.fill.as_deref())
            .or(aes.colour.as_deref());
        match key {
            Some(name) => {
                let column = table.column(name)?;
                Ok(Self {
                    values: Some(column.values()),
                    levels: column.levels(),
                })
            }
            None => Ok(Self {
                values: None,
                levels: Vec::new(),
            }),
        }
    }

    /// Centre offset and slot width of `row` within a band.
    fn slot(&self, row: usize, band: f32) -> (f32, f32) {
        let n = self.levels.len().max(1);
        let span = band * DODGE_WIDTH;
        let slot = span / n as f32;
        let index = self
            .values
            .and_then(|v| self.levels.iter().position(|l| l.key_eq(&v[row])))
            .unwrap_or(0);
        (-span / 2.0 + slot * (index as f32 + 0.5), slot)
    }
}

// ============================================================================
// Panel drawing
// ============================================================================

enum XScale {
    Band(BandScale),
    Linear { scale: LinearScale, band: f32 },
}

impl XScale {
    fn place(&self, v: &Value) -> Option<f32> {
        match self {
            XScale::Band(b) if !v.is_null() => b.position(&v.to_string()),
            XScale::Band(_) => None,
            XScale::Linear { scale, .. } => v
                .as_f64()
                .filter(|x| x.is_finite() && scale.contains(*x))
                .map(|x| scale.scale(x)),
        }
    }

    fn place_label(&self, label: &str) -> Option<f32> {
        match self {
            XScale::Band(b) => b.position(label),
            XScale::Linear { .. } => None,
        }
    }

    fn band(&self) -> f32 {
        match self {
            XScale::Band(b) => b.bandwidth(),
            XScale::Linear { band, .. } => *band,
        }
    }
}

struct PanelPainter<'a> {
    table: &'a Table,
    trained: &'a Trained,
    rect: Rect,
    x: XScale,
    y: LinearScale,
}

impl<'a> PanelPainter<'a> {
    fn new(table: &'a Table, trained: &'a Trained, rect: Rect) -> Result<Self> {
        let range = (rect.x, rect.right());
        let x = match &trained.x {
            XDomain::Discrete(levels) => XScale::Band(BandScale::new(levels.clone(), range, 0.0)),
            XDomain::Continuous(domain) => {
                let scale = LinearScale::new(*domain, range)?;
                let per_unit = rect.width / (domain.1 - domain.0).abs() as f32;
                let band = trained
                    .x_resolution
                    .map_or(rect.width * 0.05, |r| r as f32 * per_unit);
                XScale::Linear { scale, band }
            }
        };
        let y = LinearScale::new(trained.y, (rect.bottom(), rect.y))?;
        Ok(Self {
            table,
            trained,
            rect,
            x,
            y,
        })
    }

    fn place_y(&self, v: f64) -> Option<f32> {
        (v.is_finite() && self.y.contains(v)).then(|| self.y.scale(v))
    }

    fn values(&self, name: &str) -> Result<&'a [Value]> {
        Ok(self.table.column(name)?.values())
    }

    fn draw(&self, canvas: &mut dyn Canvas, layers: &[Layer], rows: &[usize], theme: &Theme) -> Result<()> {
        canvas.fill_rect(self.rect, theme.panel_background);
        if theme.show_grid {
            self.grid(canvas, theme);
        }

        for layer in layers {
            let aes = &layer.aes;
            match &layer.geom.geom_type {
                GeomType::Point { shape } => self.points(canvas, aes, *shape, rows)?,
                GeomType::Line { width } => self.lines(canvas, aes, *width, rows)?,
                GeomType::Boxplot { width } => self.boxplots(canvas, aes, *width, rows)?,
                GeomType::Col { width, position } => self.cols(canvas, aes, *width, *position, rows)?,
                GeomType::Errorbar { width, position } => {
                    self.errorbars(canvas, aes, *width, *position, rows)?;
                }
                GeomType::Hline { yintercept } => self.hline(canvas, aes, *yintercept),
            }
        }

        if theme.show_panel_border {
            canvas.stroke_rect(self.rect, theme.axis_color, 1.0);
        }
        if theme.show_axis {
            let bottom_left = Point::new(self.rect.x, self.rect.bottom());
            canvas.line(
                bottom_left,
                Point::new(self.rect.right(), self.rect.bottom()),
                theme.axis_color,
                theme.axis_width,
            );
            canvas.line(
                bottom_left,
                Point::new(self.rect.x, self.rect.y),
                theme.axis_color,
                theme.axis_width,
            );
        }
        Ok(())
    }

    fn x_ticks(&self) -> Vec<(f32, String)> {
        match &self.x {
            XScale::Band(b) => b
                .levels()
                .iter()
                .enumerate()
                .map(|(i, l)| (b.scale(i), l.clone()))
                .collect(),
            XScale::Linear { scale, .. } => {
                let ticks = scale.ticks(5);
                ticks
                    .values
                    .iter()
                    .zip(ticks.labels())
                    .map(|(v, l)| (scale.scale(*v), l))
                    .collect()
            }
        }
    }

    fn y_ticks(&self) -> Vec<(f32, String)> {
        let ticks = self.y.ticks(5);
        ticks
            .values
            .iter()
            .zip(ticks.labels())
            .map(|(v, l)| (self.y.scale(*v), l))
            .collect()
    }

    /// Draw grid lines.
    fn grid(&self, canvas: &mut dyn Canvas, theme: &Theme) {
        let color = theme.grid_color;
        for (py, _) in self.y_ticks() {
            canvas.line(
                Point::new(self.rect.x, py),
                Point::new(self.rect.right(), py),
                color,
                theme.grid_width,
            );
        }
        for (px, _) in self.x_ticks() {
            canvas.line(
                Point::new(px, self.rect.y),
                Point::new(px, self.rect.bottom()),
                color,
                theme.grid_width,
            );
        }
    }

    fn x_labels(&self, canvas: &mut dyn Canvas, size: f32, theme: &Theme) {
        let style = TextStyle::new(size, theme.text_color).anchor(TextAnchor::Middle);
        let y = self.rect.bottom();
        for (px, label) in self.x_ticks() {
            canvas.line(Point::new(px, y), Point::new(px, y + 3.0), theme.axis_color, 1.0);
            canvas.text(Point::new(px, y + 4.0 + size), &label, &style);
        }
    }

    fn y_labels(&self, canvas: &mut dyn Canvas, size: f32, theme: &Theme) {
        let style = TextStyle::new(size, theme.text_color).anchor(TextAnchor::End);
        let x = self.rect.x;
        for (py, label) in self.y_ticks() {
            canvas.line(Point::new(x - 3.0, py), Point::new(x, py), theme.axis_color, 1.0);
            canvas.text(Point::new(x - 5.0, py + size * 0.35), &label, &style);
        }
    }

    fn points(&self, canvas: &mut dyn Canvas, aes: &Aes, shape: PointShape, rows: &[usize]) -> Result<()> {
        let xs = self.values(required(&aes.x, "point", "x")?)?;
        let ys = self.values(required(&aes.y, "point", "y")?)?;
        for &row in rows {
            let placed = self.x.place(&xs[row]).zip(ys[row].as_f64().and_then(|v| self.place_y(v)));
            let Some((px, py)) = placed else {
                trace!(row, "point outside scales, skipped");
                continue;
            };
            let color = self.trained.ink(self.table, aes, row);
            let radius = self.trained.radius(self.table, aes, row);
            let shape = self.trained.shape(self.table, aes, row).unwrap_or(shape);
            draw_shape(canvas, Point::new(px, py), radius, shape, color);
        }
        Ok(())
    }

    fn lines(&self, canvas: &mut dyn Canvas, aes: &Aes, width: f32, rows: &[usize]) -> Result<()> {
        let xs = self.values(required(&aes.x, "line", "x")?)?;
        let ys = self.values(required(&aes.y, "line", "y")?)?;
        let keys: Vec<Option<&[Value]>> = [&aes.group, &aes.colour]
            .into_iter()
            .map(|c| c.as_deref().map(|name| self.values(name)).transpose())
            .collect::<Result<_>>()?;

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for &row in rows {
            let key = keys
                .iter()
                .flatten()
                .map(|values| values[row].to_string())
                .collect::<Vec<_>>()
                .join("\u{1f}");
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(row),
                None => groups.push((key, vec![row])),
            }
        }

        for (_, members) in groups {
            let mut points: Vec<Point> = members
                .iter()
                .filter_map(|&row| {
                    let placed = self.x.place(&xs[row]).zip(ys[row].as_f64().and_then(|v| self.place_y(v)));
                    if placed.is_none() {
                        trace!(row, "line vertex outside scales, skipped");
                    }
                    placed.map(|(x, y)| Point::new(x, y))
                })
                .collect();
            points.sort_by(|a, b| a.x.total_cmp(&b.x));
            if points.len() >= 2 {
                let color = self.trained.ink(self.table, aes, members[0]);
                canvas.polyline(&points, color, width);
            }
        }
        Ok(())
    }

    fn boxplots(&self, canvas: &mut dyn Canvas, aes: &Aes, width: f32, rows: &[usize]) -> Result<()> {
        let ys = self.values(required(&aes.y, "boxplot", "y")?)?;
        let xs = aes.x.as_deref().map(|x| self.values(x)).transpose()?;

        let mut groups: Vec<(String, usize, Vec<f64>)> = Vec::new();
        for &row in rows {
            let key = xs.map_or_else(String::new, |xs| xs[row].to_string());
            let Some(y) = ys[row].as_f64() else {
                trace!(row, "missing box plot value, skipped");
                continue;
            };
            match groups.iter_mut().find(|(k, _, _)| *k == key) {
                Some((_, _, values)) => values.push(y),
                None => groups.push((key, row, vec![y])),
            }
        }

        let w = self.x.band() * width;
        for (key, first, values) in groups {
            let center = match xs {
                Some(xs) => self.x.place(&xs[first]),
                None => self.x.place_label(&key),
            };
            let (Some(cx), Some(stats)) = (center, BoxStats::from_data(&values)) else {
                trace!(group = key.as_str(), "box plot group cannot be placed, skipped");
                continue;
            };
            let ink = self.trained.ink(self.table, aes, first);
            let fill = self.trained.paint(self.table, aes, first, Rgba::WHITE);
            let at = |v: f64| self.place_y(v);
            let (Some(q1), Some(q3), Some(median)) = (at(stats.q1), at(stats.q3), at(stats.median)) else {
                trace!(group = key.as_str(), "box outside limits, skipped");
                continue;
            };
            if let Some(upper) = at(stats.upper) {
                canvas.line(Point::new(cx, q3), Point::new(cx, upper), ink, 1.0);
            }
            if let Some(lower) = at(stats.lower) {
                canvas.line(Point::new(cx, q1), Point::new(cx, lower), ink, 1.0);
            }
            let body = Rect::from_corners(Point::new(cx - w / 2.0, q3), Point::new(cx + w / 2.0, q1));
            canvas.fill_rect(body, fill);
            canvas.stroke_rect(body, ink, 1.0);
            canvas.line(
                Point::new(body.x, median),
                Point::new(body.right(), median),
                ink,
                2.0,
            );
            for outlier in stats.outliers.iter().filter_map(|&v| at(v)) {
                canvas.circle(Point::new(cx, outlier), 1.5, ink);
            }
        }
        Ok(())
    }

    fn cols(
        &self,
        canvas: &mut dyn Canvas,
        aes: &Aes,
        width: f32,
        position: Position,
        rows: &[usize],
    ) -> Result<()> {
        let bars = stack_bars(self.table, aes, rows, position)?;
        let xs = self.values(required(&aes.x, "col", "x")?)?;
        let dodge = Dodge::new(self.table, aes)?;
        let band = self.x.band();
        let outlined = aes.colour.is_some() || aes.colour_value.is_some();

        for bar in bars {
            let Some(cx) = self.x.place(&xs[bar.row]) else {
                trace!(row = bar.row, "column outside x scale, skipped");
                continue;
            };
            let (cx, w) = if position == Position::Dodge {
                let (offset, slot) = dodge.slot(bar.row, band);
                (cx + offset, slot * (width / DODGE_WIDTH).min(1.0))
            } else {
                (cx, band * width)
            };
            let (Some(y0), Some(y1)) = (self.place_y(bar.lo), self.place_y(bar.hi)) else {
                trace!(row = bar.row, "column outside y scale, skipped");
                continue;
            };
            let rect = Rect::from_corners(Point::new(cx - w / 2.0, y0), Point::new(cx + w / 2.0, y1));
            canvas.fill_rect(rect, self.trained.paint(self.table, aes, bar.row, DEFAULT_FILL));
            if outlined {
                canvas.stroke_rect(rect, self.trained.ink(self.table, aes, bar.row), 1.0);
            }
        }
        Ok(())
    }

    fn errorbars(
        &self,
        canvas: &mut dyn Canvas,
        aes: &Aes,
        width: f32,
        position: Position,
        rows: &[usize],
    ) -> Result<()> {
        if let (Some(lo), Some(hi)) = (aes.ymin.as_deref(), aes.ymax.as_deref()) {
            let xs = self.values(required(&aes.x, "errorbar", "x")?)?;
            let (los, his) = (self.values(lo)?, self.values(hi)?);
            let dodge = Dodge::new(self.table, aes)?;
            let band = self.x.band();
            for &row in rows {
                let Some(cx) = self.x.place(&xs[row]) else {
                    trace!(row, "error bar outside x scale, skipped");
                    continue;
                };
                let (cx, cap) = if position == Position::Dodge {
                    let (offset, slot) = dodge.slot(row, band);
                    (cx + offset, slot * width)
                } else {
                    (cx, band * width)
                };
                let bounds = los[row]
                    .as_f64()
                    .and_then(|v| self.place_y(v))
                    .zip(his[row].as_f64().and_then(|v| self.place_y(v)));
                let Some((y0, y1)) = bounds else {
                    trace!(row, "error bar bounds cannot be placed, skipped");
                    continue;
                };
                let ink = self.trained.ink(self.table, aes, row);
                canvas.line(Point::new(cx, y0), Point::new(cx, y1), ink, 1.0);
                for y in [y0, y1] {
                    canvas.line(Point::new(cx - cap / 2.0, y), Point::new(cx + cap / 2.0, y), ink, 1.0);
                }
            }
            return Ok(());
        }

        if let (Some(lo), Some(hi)) = (aes.xmin.as_deref(), aes.xmax.as_deref()) {
            // Bounds on the x axis: horizontal bars at each y.
            let ys = self.values(required(&aes.y, "errorbar", "y")?)?;
            let (los, his) = (self.values(lo)?, self.values(hi)?);
            let cap = 8.0 * width;
            for &row in rows {
                let placed = ys[row]
                    .as_f64()
                    .and_then(|v| self.place_y(v))
                    .zip(self.x.place(&los[row]).zip(self.x.place(&his[row])));
                let Some((py, (x0, x1))) = placed else {
                    trace!(row, "error bar bounds cannot be placed, skipped");
                    continue;
                };
                let ink = self.trained.ink(self.table, aes, row);
                canvas.line(Point::new(x0, py), Point::new(x1, py), ink, 1.0);
                for x in [x0, x1] {
                    canvas.line(Point::new(x, py - cap / 2.0), Point::new(x, py + cap / 2.0), ink, 1.0);
                }
            }
            return Ok(());
        }

        Err(Error::Rendering(
            "errorbar layer needs `ymin`/`ymax` or `xmin`/`xmax` mappings".to_string(),
        ))
    }

    fn hline(&self, canvas: &mut dyn Canvas, aes: &Aes, yintercept: f64) {
        let Some(py) = self.place_y(yintercept) else {
            trace!(yintercept, "reference line outside y scale, skipped");
            return;
        };
        let color = with_alpha(aes.colour_value.unwrap_or(DEFAULT_INK), aes.alpha_value);
        canvas.line(
            Point::new(self.rect.x, py),
            Point::new(self.rect.right(), py),
            color,
            1.0,
        );
    }
}

fn draw_shape(canvas: &mut dyn Canvas, at: Point, r: f32, shape: PointShape, color: Rgba) {
    match shape {
        PointShape::Circle => canvas.circle(at, r, color),
        PointShape::Ring => canvas.circle_outline(at, r, color),
        PointShape::Square => canvas.fill_rect(Rect::new(at.x - r, at.y - r, 2.0 * r, 2.0 * r), color),
        PointShape::Triangle => canvas.polygon(
            &[
                Point::new(at.x, at.y - r * 1.2),
                Point::new(at.x + r * 1.1, at.y + r * 0.8),
                Point::new(at.x - r * 1.1, at.y + r * 0.8),
            ],
            color,
        ),
        PointShape::Diamond => canvas.polygon(
            &[
                Point::new(at.x, at.y - r * 1.3),
                Point::new(at.x + r * 1.3, at.y),
                Point::new(at.x, at.y + r * 1.3),
                Point::new(at.x - r * 1.3, at.y),
            ],
            color,
        ),
    }
}

// ============================================================================
// Legends
// ============================================================================

struct LegendMetrics {
    key: f32,
    title: f32,
    label: f32,
}

impl LegendMetrics {
    fn new(base: f32) -> Self {
        Self {
            key: base * 1.2,
            title: base * 0.9,
            label: base * 0.8,
        }
    }

    fn size(&self, legend: &LegendSpec, horizontal: bool) -> (f32, f32) {
        let title_w = text_width(&legend.title, self.title);
        if horizontal {
            let entries: f32 = legend
                .entries
                .iter()
                .map(|(_, l)| self.key + 4.0 + text_width(l, self.label) + 10.0)
                .sum();
            (title_w + 8.0 + entries, self.key + 4.0)
        } else {
            let labels = legend
                .entries
                .iter()
                .map(|(_, l)| text_width(l, self.label))
                .fold(0.0_f32, f32::max);
            (
                title_w.max(self.key + 5.0 + labels),
                self.title + 6.0 + legend.entries.len() as f32 * (self.key + 3.0),
            )
        }
    }
}

/// Reserve space for the legends on the configured side, draw them, and
/// return what is left for the panels.
fn place_legends(canvas: &mut dyn Canvas, legends: &[LegendSpec], inner: Rect, deco: &Decorations) -> Rect {
    let metrics = LegendMetrics::new(deco.base_size);
    let horizontal = matches!(deco.legend, LegendPosition::Top | LegendPosition::Bottom);
    let sizes: Vec<(f32, f32)> = legends.iter().map(|l| metrics.size(l, horizontal)).collect();
    let gap = 10.0;
    let (w, h) = if horizontal {
        (
            sizes.iter().map(|s| s.0).sum::<f32>() + gap * (sizes.len() - 1) as f32,
            sizes.iter().map(|s| s.1).fold(0.0_f32, f32::max),
        )
    } else {
        (
            sizes.iter().map(|s| s.0).fold(0.0_f32, f32::max),
            sizes.iter().map(|s| s.1).sum::<f32>() + gap * (sizes.len() - 1) as f32,
        )
    };

    let (remaining, origin) = match deco.legend {
        LegendPosition::Left => (
            inner.inset(0.0, 0.0, 0.0, w + gap),
            Point::new(inner.x, inner.y + (inner.height - h).max(0.0) / 2.0),
        ),
        LegendPosition::Top => (
            inner.inset(h + gap, 0.0, 0.0, 0.0),
            Point::new(inner.x + (inner.width - w).max(0.0) / 2.0, inner.y),
        ),
        LegendPosition::Bottom => (
            inner.inset(0.0, 0.0, h + gap, 0.0),
            Point::new(inner.x + (inner.width - w).max(0.0) / 2.0, inner.bottom() - h),
        ),
        LegendPosition::Right | LegendPosition::None => (
            inner.inset(0.0, w + gap, 0.0, 0.0),
            Point::new(inner.right() - w, inner.y + (inner.height - h).max(0.0) / 2.0),
        ),
    };

    let theme = &deco.theme;
    let mut cursor = origin;
    for (legend, (lw, lh)) in legends.iter().zip(&sizes) {
        draw_legend(canvas, legend, cursor, &metrics, horizontal, theme);
        if horizontal {
            cursor.x += lw + gap;
        } else {
            cursor.y += lh + gap;
        }
    }
    remaining
}

fn draw_legend(
    canvas: &mut dyn Canvas,
    legend: &LegendSpec,
    at: Point,
    metrics: &LegendMetrics,
    horizontal: bool,
    theme: &Theme,
) {
    let key = metrics.key;
    let title_style = TextStyle::new(metrics.title, theme.text_color);
    let label_style = TextStyle::new(metrics.label, theme.text_color);

    let (mut x, mut y) = if horizontal {
        canvas.text(
            Point::new(at.x, at.y + key / 2.0 + metrics.title * 0.35),
            &legend.title,
            &title_style,
        );
        (at.x + text_width(&legend.title, metrics.title) + 8.0, at.y)
    } else {
        canvas.text(Point::new(at.x, at.y + metrics.title), &legend.title, &title_style);
        (at.x, at.y + metrics.title + 6.0)
    };

    for (color, label) in &legend.entries {
        let cell = Rect::new(x, y, key, key);
        canvas.fill_rect(cell, theme.panel_background);
        if legend.square {
            canvas.fill_rect(cell.inset(2.0, 2.0, 2.0, 2.0), *color);
        } else {
            canvas.circle(cell.center(), key * 0.3, *color);
        }
        canvas.text(
            Point::new(x + key + 4.0, y + key / 2.0 + metrics.label * 0.35),
            label,
            &label_style,
        );
        if horizontal {
            x += key + 4.0 + text_width(label, metrics.label) + 10.0;
        } else {
            y += key + 3.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Geom, Overlay};
    use crate::table::Column;

    fn survey() -> Table {
        Table::new(vec![
            Column::text("site", &["a", "a", "b", "b", "c", "c"]),
            Column::text("colour", &["blue", "black", "blue", "black", "blue", "black"]),
            Column::float("age", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Column::float("mass", &[10.0, 20.0, 15.0, 25.0, 12.0, 30.0]),
            Column::float("se", &[1.0, 2.0, 1.5, 2.5, 1.2, 3.0]),
        ])
        .unwrap()
    }

    fn scatter() -> Chart {
        Chart::new(survey(), Aes::new().x("age").y("mass").colour("colour"))
            .unwrap()
            .geom(Geom::point())
            .unwrap()
    }

    #[test]
    fn test_scatter_renders_points() {
        let fb = scatter().to_framebuffer().unwrap();
        assert_eq!(fb.width(), 800);
        // background stays white at the corner, panel is grey inside
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::WHITE));
    }

    #[test]
    fn test_svg_has_axis_titles_and_legend() {
        let svg = scatter()
            .overlay(Overlay::title("Mass by age"))
            .to_svg()
            .unwrap()
            .render();
        assert!(svg.contains(">Mass by age</text>"));
        assert!(svg.contains(">age</text>"));
        assert!(svg.contains(">mass</text>"));
        assert!(svg.contains(">colour</text>"));
        assert!(svg.contains(">blue</text>"));
        assert_eq!(svg.matches("<circle").count(), 6 + 2);
    }

    #[test]
    fn test_legend_hidden() {
        let svg = scatter()
            .overlay(Overlay::Legend(LegendPosition::None))
            .to_svg()
            .unwrap()
            .render();
        assert!(!svg.contains(">colour</text>"));
        assert_eq!(svg.matches("<circle").count(), 6);
    }

    #[test]
    fn test_facet_strips() {
        let chart = scatter().facet(Facet::wrap("site")).unwrap();
        let svg = chart.to_svg().unwrap().render();
        for site in ["a", "b", "c"] {
            assert!(svg.contains(&format!(">{site}</text>")));
        }
        assert_eq!(svg.matches("<circle").count(), 6 + 2);
    }

    #[test]
    fn test_dodged_cols_with_errorbars() {
        let chart = Chart::new(survey(), Aes::new().x("site").y("mass").fill("colour"))
            .unwrap()
            .geom(Geom::col().position(Position::Dodge))
            .unwrap()
            .geom(
                Geom::errorbar()
                    .position(Position::Dodge)
                    .aes(Aes::new().ymin("age").ymax("mass")),
            )
            .unwrap();
        let svg = chart.to_svg().unwrap().render();
        assert!(svg.contains(">site</text>"));
        assert!(chart.to_framebuffer().is_ok());
    }

    #[test]
    fn test_misplaced_errorbar_renders_without_error() {
        let chart = Chart::new(survey(), Aes::new().x("site").y("mass"))
            .unwrap()
            .geom(Geom::col())
            .unwrap()
            .geom(Geom::errorbar().aes(Aes::new().xmin("age").xmax("mass")))
            .unwrap();
        assert!(chart.to_svg().is_ok());
    }

    #[test]
    fn test_stacked_heights_set_y_range() {
        let chart = Chart::new(survey(), Aes::new().x("site").y("mass").fill("colour"))
            .unwrap()
            .geom(Geom::col())
            .unwrap();
        let deco = chart.decorations();
        let panels = split_panels(chart.data(), chart.facet_spec()).unwrap();
        let trained = Trained::train(&chart, &deco, &panels).unwrap();
        // site c stacks 12 + 30
        assert!(trained.y.1 >= 42.0);
        assert!(trained.y.0 <= 0.0);
    }

    #[test]
    fn test_boxplot_and_limits() {
        let chart = Chart::new(survey(), Aes::new().x("site").y("mass"))
            .unwrap()
            .geom(Geom::boxplot())
            .unwrap()
            .overlay(Overlay::YLimits(0.0, 50.0));
        let svg = chart.to_svg().unwrap().render();
        // padded to -2.5..52.5, ticks every 20
        assert!(svg.contains(">40</text>"));
        assert!(!svg.contains(">60</text>"));
    }

    #[test]
    fn test_point_layer_without_y_fails() {
        let chart = Chart::new(survey(), Aes::new().x("age"))
            .unwrap()
            .geom(Geom::point())
            .unwrap();
        assert!(matches!(chart.to_svg(), Err(Error::Rendering(_))));
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let table = Table::new(vec![
            Column::float("x", &[1.0, 2.0, 3.0]),
            Column::new("y", vec![Value::Float(1.0), Value::Null, Value::Float(3.0)]).unwrap(),
        ])
        .unwrap();
        let chart = Chart::new(table, Aes::new().x("x").y("y"))
            .unwrap()
            .geom(Geom::point())
            .unwrap();
        let svg = chart.to_svg().unwrap().render();
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_resolution() {
        assert_eq!(resolution(vec![3.0, 1.0, 2.0, 2.0]), Some(1.0));
        assert_eq!(resolution(vec![1.0]), None);
    }
}
