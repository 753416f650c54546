//! Chart specification builder.
//!
//! A [`Chart`] is an immutable value: every builder method consumes the chart
//! and returns a new one. Mapped columns are checked against the source table
//! whenever the spec is constructed or extended, so rendering never meets an
//! unknown column.

use std::sync::Arc;

use tracing::debug;

use super::aes::Aes;
use super::facet::Facet;
use super::geom::Geom;
use super::overlay::{Decorations, Overlay};
use crate::error::{Error, Result};
use crate::table::Table;

/// Pixel size used when none was set.
pub const DEFAULT_DIMENSIONS: (u32, u32) = (800, 600);

/// A layer in the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// The geometry.
    pub geom: Geom,
    /// Chart aesthetics with the layer's merged over them.
    pub aes: Aes,
}

/// Declarative chart: shared data, mapping, layers, facet and overlays.
#[derive(Debug, Clone)]
pub struct Chart {
    data: Arc<Table>,
    aes: Aes,
    layers: Vec<Layer>,
    facet: Facet,
    overlays: Vec<Overlay>,
    dimensions: Option<(u32, u32)>,
}

impl Chart {
    /// Create a chart over `data` with chart-level aesthetics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a mapped column is not in `data`.
    pub fn new(data: impl Into<Arc<Table>>, aes: Aes) -> Result<Self> {
        let data = data.into();
        data.require(&aes.columns())?;
        debug!(rows = data.nrow(), columns = ?aes.columns(), "chart created");
        Ok(Self {
            data,
            aes,
            layers: Vec::new(),
            facet: Facet::None,
            overlays: Vec::new(),
            dimensions: None,
        })
    }

    /// Add a geometry layer on top of the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the merged layer mapping names a column
    /// that is not in the data.
    pub fn geom(mut self, geom: Geom) -> Result<Self> {
        let aes = match &geom.aes {
            Some(layer) => self.aes.merge(layer),
            None => self.aes.clone(),
        };
        self.data.require(&aes.columns())?;
        debug!(geom = geom.name(), layer = self.layers.len(), "layer added");
        self.layers.push(Layer { geom, aes });
        Ok(self)
    }

    /// Split the chart into panels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the facet column is unknown, or
    /// [`Error::InvalidDimensions`] if a fixed grid cannot hold every panel.
    pub fn facet(mut self, facet: Facet) -> Result<Self> {
        if let Some(var) = facet.column() {
            let panels = self.data.column(var)?.levels().len();
            if let Facet::Wrap {
                nrow: Some(r),
                ncol: Some(c),
                ..
            } = facet
            {
                if r.saturating_mul(c) < panels {
                    return Err(Error::InvalidDimensions {
                        width: c as f64,
                        height: r as f64,
                    });
                }
            }
            debug!(column = var, panels, "facet set");
        }
        self.facet = facet;
        Ok(self)
    }

    /// Layer a customisation onto the chart.
    #[must_use]
    pub fn overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.push(overlay);
        self
    }

    /// Layer several customisations, in order.
    #[must_use]
    pub fn overlays(mut self, overlays: impl IntoIterator<Item = Overlay>) -> Self {
        self.overlays.extend(overlays);
        self
    }

    /// Source table.
    #[must_use]
    pub fn data(&self) -> &Table {
        &self.data
    }

    /// Shared handle to the source table.
    #[must_use]
    pub fn shared_data(&self) -> Arc<Table> {
        Arc::clone(&self.data)
    }

    /// Chart-level aesthetics.
    #[must_use]
    pub fn mapping(&self) -> &Aes {
        &self.aes
    }

    /// Layers in draw order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Faceting.
    #[must_use]
    pub fn facet_spec(&self) -> &Facet {
        &self.facet
    }

    /// Overlays in the order they were added.
    #[must_use]
    pub fn overlay_list(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Properties after folding every overlay.
    #[must_use]
    pub fn decorations(&self) -> Decorations {
        Decorations::resolve(&self.overlays)
    }

    /// Preferred width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.dimensions.unwrap_or(DEFAULT_DIMENSIONS).0
    }

    /// Preferred height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.dimensions.unwrap_or(DEFAULT_DIMENSIONS).1
    }

    /// Whether a size was set explicitly.
    #[must_use]
    pub fn has_dimensions(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Put `defaults` before the chart's own overlays and fill in the size if
    /// none was set.
    #[must_use]
    pub(crate) fn with_defaults(mut self, defaults: &[Overlay], dimensions: (u32, u32)) -> Self {
        let mut overlays = defaults.to_vec();
        overlays.append(&mut self.overlays);
        self.overlays = overlays;
        self.dimensions.get_or_insert(dimensions);
        self
    }
}

impl batuta_common::display::WithDimensions for Chart {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.dimensions = Some((width, height));
    }
}
