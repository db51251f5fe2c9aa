//! # atlantis-parser
//!
//! Converts the free-text turn reports written by the Atlantis play-by-mail engine into a
//! structured document (objects, arrays and scalars) that storage and presentation layers
//! can consume without knowing anything about the report's prose layout.
//!
//! File Layout
//!
//!     src/report
//!       ├── block, segmenting   physical lines -> logical blocks
//!       ├── cursor              bounded look-back over the block stream
//!       ├── span                position parser, result type and combinators
//!       ├── node                serialization agnostic document tree
//!       ├── grammar             field level parsers (coords, items, units, ...)
//!       ├── sections            section recognizers and handlers
//!       └── converting, loader  entry points
//!
//! See [converting](report::converting) for the pipeline overview.

pub mod report;

pub use report::cancel::CancellationToken;
pub use report::converting::{
    convert_reader, convert_str, render_all, ConvertOptions, OutputFormat, Report,
};
pub use report::error::{ConvertError, Location};
pub use report::loader::{LoaderError, ReportLoader};
pub use report::node::Node;
