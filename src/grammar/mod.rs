//! Grammar of Graphics implementation.
//!
//! Provides declarative chart specification based on Wilkinson's
//! Grammar of Graphics [Wilkinson 2005].
//!
//! # Components
//!
//! - **Aesthetics**: Mappings from columns to visual channels (x, y, colour, fill, bounds)
//! - **Geometries**: Marks (point, line, boxplot, col, errorbar, hline)
//! - **Statistics**: Box plot summaries
//! - **Facets**: Small multiples for conditioning
//! - **Overlays**: Themes, titles, labels, legend placement, palettes, limits
//!
//! # Example
//!
//! ```rust
//! use tidyviz::grammar::*;
//! use tidyviz::table::Column;
//! use tidyviz::Table;
//!
//! let table = Table::new(vec![
//!     Column::float("age", &[1.0, 2.0, 3.0]),
//!     Column::float("mass", &[4.0, 5.0, 6.0]),
//! ])?;
//! let chart = Chart::new(table, Aes::new().x("age").y("mass"))?
//!     .geom(Geom::point())?
//!     .overlay(Overlay::Theme(Theme::minimal()));
//! assert_eq!(chart.layers().len(), 1);
//! # Ok::<(), tidyviz::Error>(())
//! ```
//!
//! # References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2010). "A Layered Grammar of Graphics." Journal of Computational
//!   and Graphical Statistics.

mod aes;
mod chart;
mod facet;
mod geom;
mod overlay;
mod render;
mod stat;
mod theme;

pub use aes::Aes;
pub use chart::{Chart, Layer, DEFAULT_DIMENSIONS};
pub use facet::Facet;
pub(crate) use facet::wrap_dimensions;
pub use geom::{Geom, GeomType, PointShape, Position};
pub use overlay::{Decorations, LegendPosition, Overlay, Property};
pub use stat::BoxStats;
pub use theme::Theme;
