//! Conversion errors
//!
//!     Three kinds of failure exist while converting a report:
//!
//!         - Field mismatches: a grammar primitive did not find its token. These are the
//!           [ParseFailure](crate::report::span::ParseFailure) values and are always
//!           recoverable through `attempt` / `one_of`. They never leave a grammar parser
//!           except as the error arm of its result.
//!         - Structure violations: a section expected a record of a given shape and found
//!           something else. Fatal.
//!         - Unexpected end of input: a section ran out of blocks before it could close. Fatal.
//!
//!     Fatal errors abort the whole conversion. The converter buffers the full document,
//!     so an aborted conversion never exposes a partial one.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::report::sections::Section;

/// A 1-based position in the report source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{section}: unexpected content at {location}: {message}")]
    StructureViolation {
        section: Section,
        location: Location,
        message: String,
    },

    #[error("{section}: report ended at {location} before the section was complete")]
    UnexpectedEndOfInput { section: Section, location: Location },

    #[error("failed to read report: {0}")]
    Io(#[from] io::Error),

    #[error("conversion cancelled")]
    Cancelled,

    #[error("conversion deadline exceeded")]
    DeadlineExceeded,

    #[error("report exceeds the limit of {limit} lines")]
    TooLarge { limit: usize },

    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl ConvertError {
    /// Location of the failure in the report, if the error has one.
    pub fn location(&self) -> Option<Location> {
        match self {
            ConvertError::StructureViolation { location, .. }
            | ConvertError::UnexpectedEndOfInput { location, .. } => Some(*location),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_violation_message_carries_location() {
        let err = ConvertError::StructureViolation {
            section: Section::FactionStatus,
            location: Location::new(12, 5),
            message: "expected 'key: amount'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "faction status: unexpected content at 12:5: expected 'key: amount'"
        );
        assert_eq!(err.location(), Some(Location::new(12, 5)));
    }

    #[test]
    fn test_io_errors_have_no_location() {
        let err = ConvertError::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(err.location().is_none());
        assert!(err.to_string().contains("boom"));
    }
}
