//! Property tests for overlays and layouts.
//!
//! Run: cargo test --test properties_test

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use tidyviz::geometry::Rect;
use tidyviz::grammar::Decorations;
use tidyviz::prelude::*;

fn chart(id: usize) -> Chart {
    let table = Table::new(vec![Column::float(format!("c{id}"), &[1.0, 2.0])]).unwrap();
    Chart::new(table, Aes::new().x(&format!("c{id}")))
        .unwrap()
        .dimensions(40, 30)
}

fn ids(layout: &Layout) -> Vec<String> {
    layout
        .leaves()
        .iter()
        .map(|c| c.data().column_names()[0].to_string())
        .collect()
}

fn overlay_strategy() -> impl Strategy<Value = Overlay> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Overlay::Title),
        "[a-z]{1,8}".prop_map(Overlay::XLabel),
        "[a-z]{1,8}".prop_map(Overlay::YLabel),
        (6.0f32..30.0).prop_map(Overlay::BaseSize),
        prop::sample::select(vec![
            LegendPosition::Right,
            LegendPosition::Bottom,
            LegendPosition::None
        ])
        .prop_map(Overlay::Legend),
        prop::sample::select(vec!["grey", "bw", "minimal", "void"])
            .prop_map(|name| Overlay::Theme(Theme::from_name(name).unwrap())),
        (0.0f64..10.0, 10.0f64..20.0).prop_map(|(a, b)| Overlay::YLimits(a, b)),
    ]
}

fn same_property_pair() -> impl Strategy<Value = (Overlay, Overlay)> {
    prop_oneof![
        ("[a-z]{1,8}", "[a-z]{1,8}").prop_map(|(a, b)| (Overlay::Title(a), Overlay::Title(b))),
        ("[a-z]{1,8}", "[a-z]{1,8}").prop_map(|(a, b)| (Overlay::XLabel(a), Overlay::XLabel(b))),
        (6.0f32..30.0, 6.0f32..30.0).prop_map(|(a, b)| (Overlay::BaseSize(a), Overlay::BaseSize(b))),
        (0.0f64..10.0, 10.0f64..20.0).prop_map(|(a, b)| (Overlay::YLimits(a, b), Overlay::YLimits(b, a + 1.0))),
        prop::sample::select(vec!["grey", "bw", "minimal", "void"]).prop_map(|name| (
            Overlay::Theme(Theme::default()),
            Overlay::Theme(Theme::from_name(name).unwrap()),
        )),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_later_overlay_wins((first, second) in same_property_pair()) {
        prop_assert_eq!(first.property(), second.property());
        let both = Decorations::resolve(&[first, second.clone()]);
        prop_assert_eq!(both, Decorations::resolve(&[second]));
    }

    #[test]
    fn prop_different_properties_commute(a in overlay_strategy(), b in overlay_strategy()) {
        prop_assume!(a.property() != b.property());
        prop_assert_eq!(
            Decorations::resolve(&[a.clone(), b.clone()]),
            Decorations::resolve(&[b, a])
        );
    }

    #[test]
    fn prop_grouping_keeps_leaf_sequence(n in 2usize..7, split in 1usize..6) {
        let split = split.min(n - 1);
        let flat = (1..n).fold(Layout::from(chart(0)), |acc, i| acc | chart(i));
        let left = (1..split).fold(Layout::from(chart(0)), |acc, i| acc | chart(i));
        let right = (split + 1..n).fold(Layout::from(chart(split)), |acc, i| acc | chart(i));
        let grouped = Layout::group(left) | Layout::group(right);
        prop_assert_eq!(ids(&flat), ids(&grouped));
        prop_assert_eq!(ids(&flat), ids(&flat.clone().layout(Some(1), None)));
    }

    #[test]
    fn prop_flow_places_leaves_row_major(n in 1usize..12, k in 1usize..5) {
        let flow = (1..n).fold(Layout::from(chart(0)), |acc, i| acc + chart(i));
        let layout = flow.layout(None, Some(k));
        let (cell_w, cell_h) = (10.0_f32, 10.0_f32);
        let (nrow, ncol) = layout.grid();
        prop_assert_eq!(ncol, k);
        let area = Rect::new(0.0, 0.0, cell_w * ncol as f32, cell_h * nrow as f32);
        for (i, (rect, _)) in layout.arrange(area).iter().enumerate() {
            prop_assert!((rect.x - (i % k) as f32 * cell_w).abs() < 1e-3);
            prop_assert!((rect.y - (i / k) as f32 * cell_h).abs() < 1e-3);
        }
    }
}
