use thiserror::Error;

/// Result type alias for mesh loading and analysis.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported while loading or analysing a mesh.
///
/// Contract violations (such as a triangle referencing a point that does not exist) are **not**
/// represented here, they panic.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream could not be opened or read.
    #[error("unable to read input: {0}")]
    UnreadableInput(#[from] std::io::Error),

    /// The bytes are neither ASCII nor binary STL.
    #[error("unrecognised format: {0}")]
    UnrecognizedFormat(String),

    /// A record could not be parsed.
    ///
    /// `record` is the 1-based line number for ASCII files, and the 0-based facet index for
    /// binary files.
    #[error("malformed record {record}: {reason}")]
    MalformedRecord { record: usize, reason: String },

    /// A triangle has (near) zero area so its normal cannot be normalised.
    #[error("degenerate geometry: triangle {triangle} has no measurable normal")]
    DegenerateGeometry { triangle: usize },
}

impl Error {
    pub fn unrecognized(details: impl Into<String>) -> Self {
        Self::UnrecognizedFormat(details.into())
    }

    pub fn malformed(record: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record,
            reason: reason.into(),
        }
    }
}
