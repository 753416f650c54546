//! Bundled sample tables used by the walkthrough.
//!
//! `specimens` is a small field survey (one row per specimen, with a few
//! missing measurements). `sites` describes survey sites; it lacks one site
//! present in `specimens` and has one site with no specimens, which makes it
//! useful for join examples.

use crate::error::Result;
use crate::table::{col, lit, when, Expr, Table};

const SPECIMENS_CSV: &str = include_str!("../data/specimens.csv");
const SITES_CSV: &str = include_str!("../data/sites.csv");

/// Survey specimens: `id, site, colour, age, length, wingspan, mass`.
///
/// # Errors
///
/// Only if the bundled CSV is corrupt.
pub fn specimens() -> Result<Table> {
    Table::from_csv_str(SPECIMENS_CSV)
}

/// Site attributes: `site, habitat, elevation, surveyed`.
///
/// # Errors
///
/// Only if the bundled CSV is corrupt.
pub fn sites() -> Result<Table> {
    Table::from_csv_str(SITES_CSV)
}

/// Species assignment from `colour` and `age`.
///
/// Blue specimens younger than 1200 are "reike" and older ones "naida".
/// Black specimens are "ozzyi" below 1000, "whido" from 1000 to 1700
/// inclusive and "strummeri" above. A blue specimen aged exactly 1200 matches
/// no branch and gets a missing species.
#[must_use]
pub fn species_rule() -> Expr {
    let blue = || col("colour").eq(lit("blue"));
    let black = || col("colour").eq(lit("black"));
    when(blue().and(col("age").lt(lit(1200))))
        .then(lit("reike"))
        .when(blue().and(col("age").gt(lit(1200))))
        .then(lit("naida"))
        .when(black().and(col("age").lt(lit(1000))))
        .then(lit("ozzyi"))
        .when(black().and(col("age").between(lit(1000), lit(1700))))
        .then(lit("whido"))
        .when(black().and(col("age").gt(lit(1700))))
        .then(lit("strummeri"))
        .into()
}
