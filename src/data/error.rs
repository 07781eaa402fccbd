//! Typed loading errors.

use thiserror::Error;

/// Errors surfaced while parsing an emissions table.
///
/// Numeric cells are validated explicitly; a cell that is present but not a
/// number fails the whole load instead of degrading to NaN.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column is absent from the file header / schema.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A cell could not be parsed as the expected numeric type.
    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    MalformedRow {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// The file extension is not one of the supported formats.
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}
