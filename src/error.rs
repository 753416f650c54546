//! Error types for tidyviz operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Side of a join a key was looked up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    /// The left (preserved) table.
    Left,
    /// The right (lookup) table.
    Right,
}

impl std::fmt::Display for JoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinSide::Left => f.write_str("left"),
            JoinSide::Right => f.write_str("right"),
        }
    }
}

/// Errors that can occur in tidyviz operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A referenced column does not exist in the input table.
    #[error("Unknown column `{column}` (available: {})", available.join(", "))]
    Schema {
        /// The missing column name.
        column: String,
        /// Columns the table does have.
        available: Vec<String>,
    },

    /// A positional column reference is out of range.
    #[error("Column position {index} out of range for a table with {ncol} columns")]
    ColumnIndex {
        /// Requested zero-based position.
        index: usize,
        /// Number of columns in the table.
        ncol: usize,
    },

    /// Two columns would share one name.
    #[error("Duplicate column name `{0}`")]
    DuplicateColumn(String),

    /// Column lengths disagree.
    #[error("Column `{column}` has {found} rows, expected {expected}")]
    RaggedColumns {
        /// Offending column.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of the column.
        found: usize,
    },

    /// A value or column has the wrong type for the operation.
    #[error("Type mismatch in `{column}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Column (or expression) being evaluated.
        column: String,
        /// Expected type.
        expected: String,
        /// Actual type.
        found: String,
    },

    /// Join invoked without a valid shared key.
    #[error("Join key `{key}` is missing from the {side} table")]
    JoinKey {
        /// The key column.
        key: String,
        /// Which table lacks it.
        side: JoinSide,
    },

    /// Join invoked with an empty key set.
    #[error("Join requires at least one shared key column")]
    EmptyJoinKeys,

    /// A pivot cell would receive more than one value.
    #[error("Pivot cell `{key}` has more than one value")]
    DuplicateKey {
        /// Description of the ambiguous cell.
        key: String,
    },

    /// A pipeline step failed.
    #[error("Pipeline step {index} ({step}) failed: {source}")]
    PipelineStep {
        /// Zero-based step position.
        index: usize,
        /// Step name.
        step: &'static str,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },

    /// The export target cannot be written or resolved.
    #[error("Cannot export to {}: {reason}", path.display())]
    ExportTarget {
        /// Requested output path.
        path: PathBuf,
        /// Why the export was refused.
        reason: String,
    },

    /// Invalid dimensions for framebuffer, plot or export.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: f64,
        /// Height value.
        height: f64,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Scale domain error.
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration could not be parsed.
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// Line number (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),
}

impl Error {
    /// Build a [`Error::Schema`] for `column` given the table's column names.
    pub(crate) fn schema<S: AsRef<str>>(column: &str, available: &[S]) -> Self {
        Error::Schema {
            column: column.to_string(),
            available: available.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Build a [`Error::ExportTarget`].
    pub(crate) fn export_target(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ExportTarget {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
