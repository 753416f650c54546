//! # tidyviz
//!
//! Tidy data wrangling and a layered grammar of graphics in pure Rust.
//!
//! Data flows through one linear pipeline:
//!
//! 1. load a [`Table`] from CSV or the bundled [`datasets`],
//! 2. transform it with pure relational operators ([`table::Pipeline`]),
//! 3. describe a [`grammar::Chart`] by mapping columns to aesthetics,
//! 4. optionally compose charts with `|`, `/` and `+` into a [`layout::Layout`],
//! 5. export to PNG or SVG with explicit size and resolution ([`export`]).
//!
//! A [`session::Session`] remembers the last figure so it can be saved
//! without naming it again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tidyviz::prelude::*;
//!
//! let specimens = tidyviz::datasets::specimens()?;
//! let adults = specimens.filter(&col("age").gt(lit(1000)))?;
//!
//! let mut session = Session::default();
//! session.plot(
//!     Chart::new(adults, Aes::new().x("age").y("mass").colour("colour"))?
//!         .geom(Geom::point())?
//!         .overlay(Overlay::title("Mass by age")),
//! );
//! session.save("mass.png", &ExportOptions::new().size(15.0, 10.0).unit(Unit::Cm).dpi(300.0))?;
//! # Ok::<(), tidyviz::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `telemetry`: [`telemetry::init_default_tracing`] installs a
//!   `tracing-subscriber` formatter
//!
//! ## References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2014). "Tidy Data." Journal of Statistical Software.
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Data Modules
// ============================================================================

/// Tables, expressions and relational transforms.
pub mod table;

/// Bundled sample tables used by the walkthrough.
pub mod datasets;

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and palettes.
pub mod color;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Geometric primitives (points, rectangles).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

// ============================================================================
// Visualization Modules
// ============================================================================

/// Grammar of Graphics implementation.
pub mod grammar;

/// Multi-chart composition.
pub mod layout;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Rendering backends and rasterization.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

/// Figure export to files.
pub mod export;

// ============================================================================
// Execution Context
// ============================================================================

/// Configuration file support.
pub mod config;

/// Last-figure session.
pub mod session;

/// Optional tracing subscriber setup.
pub mod telemetry;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for tidyviz operations.
pub mod error;

pub use error::{Error, Result};
pub use table::Table;

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use tidyviz::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::{Palette, Rgba};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::export::{ExportOptions, Figure, Format, Unit};
    pub use crate::grammar::{
        Aes, Chart, Facet, Geom, LegendPosition, Overlay, PointShape, Position, Theme,
    };
    pub use crate::layout::Layout;
    pub use crate::session::Session;
    pub use crate::table::{
        col, lit, read_csv, when, AggFn, Aggregation, Column, Expr, Pipeline, SortKey, Table,
        Value,
    };
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
