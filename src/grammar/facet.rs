//! Faceting for Grammar of Graphics.
//!
//! Creates small multiples by splitting the data on one column. Panels share
//! mapping, marks and scales, and are laid out row-major.

/// Faceting specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Facet {
    /// No faceting.
    #[default]
    None,
    /// Facet into wrapped panels.
    Wrap {
        /// Column to facet by.
        var: String,
        /// Fixed number of rows.
        nrow: Option<usize>,
        /// Fixed number of columns.
        ncol: Option<usize>,
    },
}

impl Facet {
    /// No faceting.
    #[must_use]
    pub fn none() -> Self {
        Facet::None
    }

    /// One panel per distinct value of `var`, in a near-square grid.
    #[must_use]
    pub fn wrap(var: &str) -> Self {
        Facet::Wrap {
            var: var.to_string(),
            nrow: None,
            ncol: None,
        }
    }

    /// Fix the number of rows.
    #[must_use]
    pub fn nrow(mut self, n: usize) -> Self {
        if let Facet::Wrap { nrow, .. } = &mut self {
            *nrow = Some(n.max(1));
        }
        self
    }

    /// Fix the number of columns.
    #[must_use]
    pub fn ncol(mut self, n: usize) -> Self {
        if let Facet::Wrap { ncol, .. } = &mut self {
            *ncol = Some(n.max(1));
        }
        self
    }

    /// The faceting column, if any.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Facet::None => None,
            Facet::Wrap { var, .. } => Some(var),
        }
    }

    /// Grid `(nrow, ncol)` for `n` panels.
    #[must_use]
    pub fn dimensions(&self, n: usize) -> (usize, usize) {
        match self {
            Facet::None => (1, 1),
            Facet::Wrap { nrow, ncol, .. } => wrap_dimensions(n, *nrow, *ncol),
        }
    }
}

/// Rows and columns for `n` cells: `ncol = ⌈√n⌉`, `nrow = ⌈n / ncol⌉`, with
/// either count overridable.
pub(crate) fn wrap_dimensions(n: usize, nrow: Option<usize>, ncol: Option<usize>) -> (usize, usize) {
    let n = n.max(1);
    match (nrow, ncol) {
        (Some(r), Some(c)) => (r, c),
        (Some(r), None) => (r, n.div_ceil(r)),
        (None, Some(c)) => (n.div_ceil(c), c),
        (None, None) => {
            let mut c = (n as f64).sqrt().ceil() as usize;
            // guard against float rounding for perfect squares
            while c > 1 && (c - 1) * (c - 1) >= n {
                c -= 1;
            }
            (n.div_ceil(c), c)
        }
    }
}
