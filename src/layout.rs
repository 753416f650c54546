//! Composition of several charts into one figure.
//!
//! `a | b` places charts side by side, `a / b` stacks them and `a + b` flows
//! them into a grid. Chains flatten on the left only: `a | b | c` is one row
//! of three, while `a | (b | c)` keeps `b | c` together in one cell.
//! [`Layout::group`] seals a subtree so it is never flattened into its
//! parent. Grouping changes nesting, never the set or order of leaves.

use std::ops::{Add, BitOr, Div};

use tracing::debug;

use crate::geometry::Rect;
use crate::grammar::{wrap_dimensions, Chart};

/// A tree of charts.
#[derive(Debug, Clone)]
pub enum Layout {
    /// A single chart.
    Leaf(Box<Chart>),
    /// Children in one row, equal widths.
    Beside(Vec<Layout>),
    /// Children in one column, equal heights.
    Stack(Vec<Layout>),
    /// Children flowed row-major into a grid.
    Group {
        /// Cells in order.
        children: Vec<Layout>,
        /// Fixed number of rows.
        nrow: Option<usize>,
        /// Fixed number of columns.
        ncol: Option<usize>,
        /// Whether the group refuses to absorb further operands.
        sealed: bool,
    },
}

impl From<Chart> for Layout {
    fn from(chart: Chart) -> Self {
        Layout::Leaf(Box::new(chart))
    }
}

impl Layout {
    /// Seal `layout` into a single cell that later operators treat as one
    /// unit.
    #[must_use]
    pub fn group(layout: impl Into<Layout>) -> Self {
        Layout::Group {
            children: vec![layout.into()],
            nrow: None,
            ncol: None,
            sealed: true,
        }
    }

    /// Flow the children of this node into a grid with fixed counts. A leaf
    /// becomes a one-cell grid; a row or column keeps its children.
    #[must_use]
    pub fn layout(self, nrow: Option<usize>, ncol: Option<usize>) -> Self {
        let (nrow, ncol) = (nrow.map(|n| n.max(1)), ncol.map(|n| n.max(1)));
        let (children, sealed) = match self {
            Layout::Group {
                children, sealed, ..
            } => (children, sealed),
            Layout::Beside(children) | Layout::Stack(children) => (children, false),
            leaf @ Layout::Leaf(_) => (vec![leaf], false),
        };
        Layout::Group {
            children,
            nrow,
            ncol,
            sealed,
        }
    }

    fn beside(self, right: Layout) -> Self {
        let out = match self {
            Layout::Beside(mut children) => {
                children.push(right);
                Layout::Beside(children)
            }
            left => Layout::Beside(vec![left, right]),
        };
        log_composed("beside", &out);
        out
    }

    fn stack(self, below: Layout) -> Self {
        let out = match self {
            Layout::Stack(mut children) => {
                children.push(below);
                Layout::Stack(children)
            }
            above => Layout::Stack(vec![above, below]),
        };
        log_composed("stack", &out);
        out
    }

    fn flow(self, next: Layout) -> Self {
        let out = match self {
            Layout::Group {
                mut children,
                nrow,
                ncol,
                sealed: false,
            } => {
                children.push(next);
                Layout::Group {
                    children,
                    nrow,
                    ncol,
                    sealed: false,
                }
            }
            first => Layout::Group {
                children: vec![first, next],
                nrow: None,
                ncol: None,
                sealed: false,
            },
        };
        log_composed("flow", &out);
        out
    }

    /// Direct children (empty for a leaf).
    #[must_use]
    pub fn children(&self) -> &[Layout] {
        match self {
            Layout::Leaf(_) => &[],
            Layout::Beside(children)
            | Layout::Stack(children)
            | Layout::Group { children, .. } => children,
        }
    }

    /// Charts in left-to-right, top-to-bottom order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Chart> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Chart>) {
        match self {
            Layout::Leaf(chart) => out.push(chart.as_ref()),
            _ => {
                for child in self.children() {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Grid `(nrow, ncol)` this node arranges its children in.
    #[must_use]
    pub fn grid(&self) -> (usize, usize) {
        let n = self.children().len();
        match self {
            Layout::Leaf(_) => (1, 1),
            Layout::Beside(_) => (1, n.max(1)),
            Layout::Stack(_) => (n.max(1), 1),
            Layout::Group { nrow, ncol, .. } => {
                let (r, c) = wrap_dimensions(n, *nrow, *ncol);
                // a fixed grid too small for every child grows extra rows
                (r.max(n.div_ceil(c)), c)
            }
        }
    }

    /// Pixel rectangle of every chart when the layout fills `area`, in
    /// [`Layout::leaves`] order.
    #[must_use]
    pub fn arrange(&self, area: Rect) -> Vec<(Rect, &Chart)> {
        let mut out = Vec::new();
        self.arrange_into(area, &mut out);
        out
    }

    fn arrange_into<'a>(&'a self, area: Rect, out: &mut Vec<(Rect, &'a Chart)>) {
        if let Layout::Leaf(chart) = self {
            out.push((area, chart.as_ref()));
            return;
        }
        let (nrow, ncol) = self.grid();
        for (i, child) in self.children().iter().enumerate() {
            let cell = area.grid_cell(i / ncol, i % ncol, nrow, ncol, 0.0);
            child.arrange_into(cell, out);
        }
    }

    /// Preferred pixel size from the charts' own sizes.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        if let Layout::Leaf(chart) = self {
            return (chart.width(), chart.height());
        }
        let (nrow, ncol) = self.grid();
        let sizes: Vec<(u32, u32)> = self.children().iter().map(Layout::pixel_size).collect();
        let cell_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
        let cell_h = sizes.iter().map(|s| s.1).max().unwrap_or(0);
        let span = |cell: u32, n: usize| cell.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX));
        (span(cell_w, ncol), span(cell_h, nrow))
    }
}

fn log_composed(op: &'static str, layout: &Layout) {
    debug!(op, cells = layout.children().len(), leaves = layout.leaves().len(), "layout composed");
}

macro_rules! compose_ops {
    ($($trait:ident :: $method:ident => $combine:ident;)*) => {
        $(
            impl<R: Into<Layout>> $trait<R> for Layout {
                type Output = Layout;

                fn $method(self, rhs: R) -> Layout {
                    self.$combine(rhs.into())
                }
            }

            impl<R: Into<Layout>> $trait<R> for Chart {
                type Output = Layout;

                fn $method(self, rhs: R) -> Layout {
                    Layout::from(self).$combine(rhs.into())
                }
            }
        )*
    };
}

compose_ops! {
    BitOr::bitor => beside;
    Div::div => stack;
    Add::add => flow;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Aes;
    use crate::table::{Column, Table};
    use batuta_common::display::WithDimensions;

    fn chart(name: &str) -> Chart {
        let table = Table::new(vec![Column::float(name, &[1.0, 2.0])]).unwrap();
        Chart::new(table, Aes::new().x(name)).unwrap().dimensions(100, 50)
    }

    fn names(layout: &Layout) -> Vec<String> {
        layout
            .leaves()
            .iter()
            .map(|c| c.data().column_names()[0].to_string())
            .collect()
    }

    #[test]
    fn test_left_flattening() {
        let row = chart("a") | chart("b") | chart("c");
        assert!(matches!(&row, Layout::Beside(children) if children.len() == 3));

        let nested = chart("a") | (chart("b") | chart("c"));
        assert!(matches!(&nested, Layout::Beside(children) if children.len() == 2));
        assert_eq!(names(&row), names(&nested));
    }

    #[test]
    fn test_group_seals_subtree() {
        let sealed = Layout::group(chart("a") | chart("b")) | chart("c");
        assert!(matches!(&sealed, Layout::Beside(children) if children.len() == 2));
        let flowed = Layout::group(chart("a") + chart("b")) + chart("c");
        assert_eq!(flowed.children().len(), 2);
        assert_eq!(names(&flowed), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mixed_operators() {
        let layout = (chart("a") | chart("b")) / chart("c");
        assert!(matches!(&layout, Layout::Stack(children) if children.len() == 2));
        assert_eq!(layout.pixel_size(), (200, 100));

        let rects = layout.arrange(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].0, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(rects[1].0, Rect::new(100.0, 0.0, 100.0, 50.0));
        assert_eq!(rects[2].0, Rect::new(0.0, 50.0, 200.0, 50.0));
    }

    #[test]
    fn test_flow_is_row_major() {
        let layout = (chart("a") + chart("b") + chart("c") + chart("d") + chart("e"))
            .layout(None, Some(2));
        assert_eq!(layout.grid(), (3, 2));
        let rects = layout.arrange(Rect::new(0.0, 0.0, 200.0, 300.0));
        for (i, (rect, _)) in rects.iter().enumerate() {
            assert_eq!(rect.x, (i % 2) as f32 * 100.0);
            assert_eq!(rect.y, (i / 2) as f32 * 100.0);
        }
    }

    #[test]
    fn test_default_flow_is_near_square() {
        let layout = chart("a") + chart("b") + chart("c");
        assert_eq!(layout.grid(), (2, 2));
        let too_small = layout.layout(Some(1), Some(1));
        assert_eq!(too_small.grid(), (3, 1));
    }

    #[test]
    fn test_layout_on_row_keeps_children() {
        let layout = (chart("a") | chart("b") | chart("c")).layout(Some(3), None);
        assert_eq!(layout.grid(), (3, 1));
        assert_eq!(names(&layout), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pixel_size_saturates() {
        let wide = chart("a").dimensions(u32::MAX, 50) | chart("b");
        assert_eq!(wide.pixel_size(), (u32::MAX, 50));
    }
}
