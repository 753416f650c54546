//! End-to-end walkthrough: bundled data through wrangling, charts, layouts
//! and export.
//!
//! Run: cargo test --test walkthrough_test

#![allow(clippy::unwrap_used, clippy::expect_used)]

use tidyviz::datasets::{sites, species_rule, specimens};
use tidyviz::prelude::*;

fn tidy_specimens() -> Table {
    Pipeline::new()
        .select_as(&[
            ("site", "site"),
            ("colour", "colour"),
            ("age", "age"),
            ("length", "length"),
            ("wing_span", "wingspan"),
            ("mass", "mass"),
        ])
        .derive("species", species_rule())
        .run(&specimens().unwrap())
        .expect("wrangling the bundled specimens should succeed")
}

fn summary() -> Table {
    Pipeline::new()
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
        .left_join(sites().unwrap(), &["site"])
        .run(&tidy_specimens())
        .expect("summary pipeline should succeed")
}

fn scatter(title: &str) -> Chart {
    Chart::new(tidy_specimens(), Aes::new().x("age").y("mass").colour("colour"))
        .unwrap()
        .geom(Geom::point())
        .unwrap()
        .overlay(Overlay::title(title))
}

#[test]
fn walkthrough_species_rule_on_documented_rows() {
    let rows = Table::new(vec![
        Column::text("colour", &["blue", "blue", "black", "black", "black", "blue"]),
        Column::int("age", &[1000, 1500, 500, 1200, 1800, 1200]),
    ])
    .unwrap();
    let out = rows.derive("species", &species_rule()).unwrap();
    let species: Vec<String> = out
        .column("species")
        .unwrap()
        .values()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(species, ["reike", "naida", "ozzyi", "whido", "strummeri", "NA"]);
    assert!(out.value(5, "species").unwrap().is_null());
}

#[test]
fn walkthrough_summary_has_one_row_per_site_and_measure() {
    let tidy = tidy_specimens();
    let summary = summary();
    let sites_seen = tidy.column("site").unwrap().levels().len();
    assert_eq!(summary.nrow(), sites_seen * 2);
    for name in ["habitat", "elevation", "surveyed", "lower", "upper"] {
        assert!(summary.has_column(name), "missing {name}");
    }
    // the site absent from the site table keeps its rows with missing attributes
    let unmatched = summary.filter(&col("habitat").is_null()).unwrap();
    assert_eq!(unmatched.nrow(), 2);
}

#[test]
fn walkthrough_failing_step_names_the_step() {
    let err = Pipeline::new()
        .filter(col("age").gt(lit(0)))
        .select(&["weight"])
        .run(&specimens().unwrap())
        .unwrap_err();
    match err {
        Error::PipelineStep { index, step, source } => {
            assert_eq!(index, 1);
            assert_eq!(step, "select");
            assert!(matches!(*source, Error::Schema { ref column, .. } if column == "weight"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn walkthrough_unknown_mapped_column_is_schema_error() {
    let err = Chart::new(tidy_specimens(), Aes::new().x("age").y("weight")).unwrap_err();
    assert!(matches!(err, Error::Schema { ref column, .. } if column == "weight"));
}

#[test]
fn walkthrough_misplaced_error_bars_are_accepted_and_render() {
    let chart = Chart::new(summary(), Aes::new().x("site").y("mean"))
        .unwrap()
        .geom(Geom::col())
        .unwrap()
        .geom(Geom::errorbar().aes(Aes::new().xmin("lower").xmax("upper")))
        .expect("structurally valid mapping is accepted");
    let figure = Figure::from(chart);
    let dir = tempfile::tempdir().unwrap();
    Session::default()
        .save_figure(figure, dir.path().join("pitfall.svg"), &ExportOptions::new())
        .unwrap();
}

#[test]
fn walkthrough_faceted_columns_with_error_bars() {
    let surveyed = summary().filter(&col("habitat").is_null().not()).unwrap();
    let habitats = surveyed.column("habitat").unwrap().levels().len();
    let chart = Chart::new(surveyed, Aes::new().x("site").y("mean").fill("measure"))
        .unwrap()
        .geom(Geom::col().position(Position::Dodge))
        .unwrap()
        .geom(
            Geom::errorbar()
                .position(Position::Dodge)
                .aes(Aes::new().ymin("lower").ymax("upper")),
        )
        .unwrap()
        .facet(Facet::wrap("habitat"))
        .unwrap()
        .dimensions(900, 500);

    let svg = chart.to_svg().unwrap().render();
    for level in chart.data().column("habitat").unwrap().levels() {
        assert!(svg.contains(&format!(">{level}</text>")), "missing strip {level}");
    }
    assert!(svg.contains(">length</text>"));
    assert!(svg.contains(">wing_span</text>"));
    assert!(habitats >= 2);
}

#[test]
fn walkthrough_export_writes_last_chart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("last.svg");
    let mut session = Session::default();
    session.plot(scatter("Chart A"));
    session.plot(scatter("Chart B"));
    session.save(&path, &ExportOptions::new()).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("Chart B"));
    assert!(!svg.contains("Chart A"));
}

#[test]
fn walkthrough_export_before_any_chart_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nothing.png");
    let err = Session::default().save(&path, &ExportOptions::new()).unwrap_err();
    assert!(matches!(err, Error::ExportTarget { .. }));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn walkthrough_layout_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::default();
    session.compose((scatter("left") | scatter("right")) / scatter("bottom"));
    session
        .save(dir.path().join("layout.png"), &ExportOptions::new())
        .unwrap();

    let bytes = std::fs::read(dir.path().join("layout.png")).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");

    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().unwrap();
    assert_eq!((reader.info().width, reader.info().height), (1600, 1200));
}
