//! Report loading utilities
//!
//! This module provides `ReportLoader` - a utility for loading report text from files,
//! readers or strings and running the conversion (or one of its stages) on it. It is used
//! by the CLI and by tests.
//!
//! # Example
//!
//! ```rust
//! use atlantis_parser::report::loader::ReportLoader;
//! use atlantis_parser::ConvertOptions;
//!
//! // From file
//! let loader = ReportLoader::from_path("turn.rep").unwrap();
//! let report = loader.convert(&ConvertOptions::default()).unwrap();
//!
//! // From string, stopping at the block stage
//! let blocks = ReportLoader::from_string("Unclaimed silver: 5.\n").blocks();
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::report::block::Block;
use crate::report::converting::{convert_str, ConvertOptions, Report};
use crate::report::error::ConvertError;
use crate::report::segmenting::segment_str;

/// Error that can occur when loading reports
#[derive(Debug, Error)]
pub enum LoaderError {
    /// IO error when reading the source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Conversion error
    #[error("{0}")]
    Convert(#[from] ConvertError),
}

/// Report loader with stage shortcuts
pub struct ReportLoader {
    source: String,
}

impl ReportLoader {
    /// Load from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let source = fs::read_to_string(path)?;
        Ok(ReportLoader { source })
    }

    /// Load from a string
    pub fn from_string<S: Into<String>>(source: S) -> Self {
        ReportLoader {
            source: source.into(),
        }
    }

    /// Load everything a reader yields
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoaderError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(ReportLoader { source })
    }

    /// Segment the source into logical blocks
    pub fn blocks(&self) -> Vec<Block> {
        segment_str(&self.source)
    }

    /// Convert the source into a report document
    pub fn convert(&self, options: &ConvertOptions) -> Result<Report, LoaderError> {
        Ok(convert_str(&self.source, options)?)
    }

    /// Get the raw source string
    pub fn source(&self) -> &str {
        &self.source
    }
}
