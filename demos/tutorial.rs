#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Walkthrough: wrangle a field survey, chart it, compose and export.
//!
//! Run with: `cargo run --example tutorial [output-dir]`
//!
//! Set `RUST_LOG=debug` and build with `--features telemetry` to see every
//! pipeline step and export logged.

use std::path::PathBuf;

use tidyviz::datasets::{sites, species_rule, specimens};
use tidyviz::prelude::*;

fn main() -> Result<()> {
    let _ = tidyviz::telemetry::init_default_tracing();

    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("tutorial-output"), PathBuf::from);
    std::fs::create_dir_all(&out_dir)?;

    let config = Config::load_or_default("tidyviz.yaml");
    let mut session = Session::new(config);

    // ------------------------------------------------------------------
    // Lesson 1: reviewing data wrangling
    // ------------------------------------------------------------------
    println!("Lesson 1: Data wrangling");
    println!("------------------------");

    let raw = specimens()?;
    println!("specimens: {} rows x {} columns", raw.nrow(), raw.ncol());
    println!("{}", raw.head(5));

    let tidy = Pipeline::new()
        .filter(col("mass").is_null().not())
        .select_as(&[
            ("site", "site"),
            ("colour", "colour"),
            ("age", "age"),
            ("length", "length"),
            ("wing_span", "wingspan"),
            ("mass", "mass"),
        ])
        .derive("species", species_rule())
        .derive("mass_per_length", col("mass") / col("length"))
        .run(&raw)?;
    println!("with species:\n{}", tidy.head(5));

    let per_site = tidy.group_by(&["site", "species"])?.aggregate(&[
        Aggregation::count(),
        Aggregation::mean("mass").alias("mean_mass"),
        Aggregation::se("mass").alias("se_mass"),
    ])?;
    println!("mass by site and species:\n{per_site}");

    let measurements = Pipeline::new()
        .pivot_longer(&["length", "wing_span"], "measure", "value")
        .aggregate(
            &["site", "measure"],
            &[
                Aggregation::mean("value").alias("mean"),
                Aggregation::se("value").alias("se"),
            ],
        )
        .derive("lower", col("mean") - col("se"))
        .derive("upper", col("mean") + col("se"))
        .left_join(sites()?, &["site"])
        .arrange(&["site", "measure"])
        .run(&tidy)?;
    println!("measurement summary with site attributes:\n{measurements}");

    // ------------------------------------------------------------------
    // Lesson 2: scatter plot
    // ------------------------------------------------------------------
    println!("Lesson 2: Scatter plot");
    println!("----------------------");

    let scatter = Chart::new(tidy.clone(), Aes::new().x("age").y("mass").colour("colour"))?
        .geom(Geom::point())?
        .overlays([
            Overlay::Theme(Theme::minimal()),
            Overlay::title("Older specimens are heavier"),
            Overlay::xlab("Age (days)"),
            Overlay::ylab("Mass (g)"),
            Overlay::ColourPalette(Palette::Manual(vec![Rgba::BLACK, Rgba::BLUE])),
        ]);
    session.plot(scatter.clone());
    session.save(out_dir.join("scatter.png"), &ExportOptions::new())?;
    println!("  Saved: scatter.png");

    // ------------------------------------------------------------------
    // Lesson 3: box plot
    // ------------------------------------------------------------------
    println!("Lesson 3: Box plot");
    println!("------------------");

    let species_only = tidy.filter(&col("species").is_null().not())?;
    let boxplot = Chart::new(species_only, Aes::new().x("species").y("mass").fill("species"))?
        .geom(Geom::boxplot())?
        .overlays([
            Overlay::Theme(Theme::bw()),
            Overlay::Legend(LegendPosition::None),
            Overlay::FillPalette(Palette::Set2),
            Overlay::xlab("Species"),
            Overlay::ylab("Mass (g)"),
        ]);
    session.plot(boxplot.clone());
    session.save(out_dir.join("boxplot.svg"), &ExportOptions::new())?;
    println!("  Saved: boxplot.svg");

    // ------------------------------------------------------------------
    // Lesson 4: faceted columns with error bars
    // ------------------------------------------------------------------
    println!("Lesson 4: Faceted column chart");
    println!("------------------------------");

    let surveyed = measurements.filter(&col("habitat").is_null().not())?;
    let columns = Chart::new(surveyed, Aes::new().x("site").y("mean").fill("measure"))?
        .geom(Geom::col().position(Position::Dodge))?
        .geom(
            Geom::errorbar()
                .position(Position::Dodge)
                .aes(Aes::new().ymin("lower").ymax("upper")),
        )?
        .facet(Facet::wrap("habitat"))?
        .overlays([
            Overlay::title("Body measurements by site"),
            Overlay::subtitle("mean ± standard error"),
            Overlay::ylab("Length (mm)"),
            Overlay::Legend(LegendPosition::Bottom),
        ]);
    session.plot(columns.clone());
    session.save(out_dir.join("columns.svg"), &ExportOptions::new())?;
    println!("  Saved: columns.svg");

    // Bounds on the categorical axis are accepted and draw horizontal bars
    // that say nothing about the spread of the means.
    let pitfall = Chart::new(measurements.clone(), Aes::new().x("site").y("mean"))?
        .geom(Geom::col())?
        .geom(Geom::errorbar().aes(Aes::new().xmin("lower").xmax("upper")))?
        .overlay(Overlay::title("Error bars on the wrong axis"));
    session.save_figure(pitfall, out_dir.join("pitfall.svg"), &ExportOptions::new())?;
    println!("  Saved: pitfall.svg");

    // ------------------------------------------------------------------
    // Lesson 5: composing charts
    // ------------------------------------------------------------------
    println!("Lesson 5: Layouts");
    println!("-----------------");

    session.compose((scatter.clone() | boxplot.clone()) / columns.clone());
    session.save(out_dir.join("dashboard.svg"), &ExportOptions::new())?;
    println!("  Saved: dashboard.svg");

    let grid = (scatter.clone() + boxplot.clone() + columns.clone()).layout(None, Some(2));
    session.compose(grid);
    session.save(out_dir.join("grid.png"), &ExportOptions::new())?;
    println!("  Saved: grid.png");

    // ------------------------------------------------------------------
    // Lesson 6: exporting with physical size
    // ------------------------------------------------------------------
    println!("Lesson 6: Export");
    println!("----------------");

    session.plot(scatter);
    let print = ExportOptions::new().size(15.0, 10.0).unit(Unit::Cm).dpi(300.0);
    session.save(out_dir.join("scatter_print.png"), &print)?;
    session.save(out_dir.join("scatter_print.svg"), &print)?;
    println!("  Saved: scatter_print.png and scatter_print.svg (15 x 10 cm at 300 dpi)");

    println!("\nAll figures written to {}", out_dir.display());
    Ok(())
}
