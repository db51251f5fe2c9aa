//! Testing utilities
//!
//!     Helpers shared by the unit tests of the sections and by the integration tests.
//!
//!     Section tests convert small report fragments with [convert_fragment] and compare the
//!     result against `serde_json::json!` values. Fragments only need the blocks the section
//!     under test reads: the dispatcher skips anything it does not recognize, exactly as it
//!     does in a full report.
//!
//!     Whole-report tests load the curated samples under `tests/fixtures` through
//!     [fixture] instead of writing reports inline.

use std::fs;
use std::path::PathBuf;

use crate::report::converting::{convert_str, ConvertOptions};
use crate::report::error::ConvertError;

/// The smallest report that produces output: a faction header and its date.
pub const MINIMAL_REPORT: &str = "Atlantis Report For:\nFaction (3)\nMay, Year 1\n";

/// Convert a report fragment with default options and return it as JSON.
pub fn convert_fragment(text: &str) -> Result<serde_json::Value, ConvertError> {
    convert_str(text, &ConvertOptions::default()).map(|report| report.to_value())
}

/// Path of a sample report under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Source of a sample report under `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()))
}
