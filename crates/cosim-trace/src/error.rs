//! ISS trace parsing errors.

use thiserror::Error;

/// ISS trace parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssParseError {
    /// The line after an exec header isn't a valid special line.
    #[error("Bad 'special' line for ISS trace with header `{header}`: `{line}`.")]
    BadSpecialLine { header: String, line: String },
    /// The block ended right after an exec header.
    #[error("No 'special' line for ISS trace with header `{header}`.")]
    NoSpecialLine { header: String },
}

impl IssParseError {
    /// Header of the step that failed to parse.
    #[must_use]
    pub fn header(&self) -> &str {
        match self {
            Self::BadSpecialLine { header, .. } | Self::NoSpecialLine { header } => header,
        }
    }
}

/// Result of parsing an ISS trace.
pub type Result<T> = std::result::Result<T, IssParseError>;
