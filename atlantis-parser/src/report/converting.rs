//! Report Conversion
//!
//!     The conversion pipeline:
//!
//!         reader -> LineSource -> BlockSegmenter -> Cursor -> dispatch -> Node -> Report
//!
//!     1. [LineSource](crate::report::input::LineSource) reads physical lines, checking
//!        the cancellation token and the line limit on every read.
//!     2. [BlockSegmenter](crate::report::segmenting::BlockSegmenter) groups them into
//!        logical blocks while they are being read.
//!     3. [dispatch] walks the blocks with a bounded look-back
//!        [Cursor](crate::report::cursor::Cursor), offering each block to the pending
//!        sections in order. The first section that recognizes the block parses it and
//!        writes its output; unrecognized blocks are skipped.
//!     4. The finished document is returned as a [Report]. Nothing is handed out before
//!        the whole report has been converted, so a failed conversion never exposes a
//!        partial document.
//!
//!     All conversion state (cursor, pending sections, builders) is local to one call.
//!     Conversions of different reports can run on different threads at the same time.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::report::cancel::CancellationToken;
use crate::report::cursor::Cursor;
use crate::report::error::ConvertError;
use crate::report::input::LineSource;
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{BlockCursor, BlockSource, PendingSections};
use crate::report::segmenting::BlockSegmenter;

/// Default number of blocks the cursor keeps for stepping back.
pub const DEFAULT_HISTORY_SIZE: usize = 16;

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Cursor window size.
    pub history_size: usize,
    /// Abort with [ConvertError::TooLarge] past this many physical lines.
    pub max_lines: Option<usize>,
    pub cancellation: CancellationToken,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            max_lines: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl ConvertOptions {
    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }

    pub fn with_max_lines(mut self, max_lines: Option<usize>) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Serialization format of a converted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{other}' (expected json or yaml)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

/// A fully converted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    document: Node,
}

impl Report {
    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::from(self.document.clone())
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, ConvertError> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.document)?
        } else {
            serde_json::to_string(&self.document)?
        };
        Ok(json)
    }

    pub fn to_yaml(&self) -> Result<String, ConvertError> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    pub fn render(&self, format: OutputFormat, pretty: bool) -> Result<String, ConvertError> {
        match format {
            OutputFormat::Json => self.to_json(pretty),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }

    /// Render and write the document. The token is checked before anything is written.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        format: OutputFormat,
        pretty: bool,
        cancellation: &CancellationToken,
    ) -> Result<(), ConvertError> {
        let rendered = self.render(format, pretty)?;
        cancellation.check()?;
        writer.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Render several reports as one array document, in the given order.
pub fn render_all(
    reports: &[Report],
    format: OutputFormat,
    pretty: bool,
) -> Result<String, ConvertError> {
    let documents: Vec<&Node> = reports.iter().map(Report::document).collect();
    let rendered = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(&documents)?,
        OutputFormat::Json => serde_json::to_string(&documents)?,
        OutputFormat::Yaml => serde_yaml::to_string(&documents)?,
    };
    Ok(rendered)
}

/// Run the section dispatcher over a block cursor and return the document.
pub fn dispatch(cursor: &mut BlockCursor<'_>) -> Result<Node, ConvertError> {
    let mut pending = PendingSections::all();
    let mut output = ObjectBuilder::new();

    while cursor.advance()? {
        let mut matched = None;
        for section in pending.iter() {
            if section.handler().can_parse(cursor)? {
                matched = Some(section);
                break;
            }
        }

        match matched {
            Some(section) => {
                let line = cursor.current().map(|b| b.start_line()).unwrap_or_default();
                debug!(%section, line, "section recognized");
                section.handler().parse(cursor, &mut output)?;
                pending.consume(section);
            }
            None => {
                if let Some(block) = cursor.current() {
                    trace!(line = block.start_line(), "skipping unrecognized block");
                }
            }
        }
    }

    Ok(output.build())
}

/// Convert a report read from `reader`.
pub fn convert_reader<R: BufRead>(
    reader: R,
    options: &ConvertOptions,
) -> Result<Report, ConvertError> {
    let lines = LineSource::new(reader, options.cancellation.clone(), options.max_lines);
    let blocks: BlockSource<'_> = Box::new(BlockSegmenter::new(lines));
    let mut cursor = Cursor::new(blocks, options.history_size);
    let document = dispatch(&mut cursor)?;
    debug!(fields = document.keys().len(), "report converted");
    Ok(Report { document })
}

/// Convert a report held in memory.
pub fn convert_str(source: &str, options: &ConvertOptions) -> Result<Report, ConvertError> {
    convert_reader(source.as_bytes(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::MINIMAL_REPORT;
    use serde_json::json;

    #[test]
    fn test_minimal_report() {
        let report = convert_str(MINIMAL_REPORT, &ConvertOptions::default()).unwrap();
        assert_eq!(report.document().keys(), vec!["faction", "date"]);
        assert_eq!(report.to_value()["date"], json!({"month": "May", "year": 1}));
    }

    #[test]
    fn test_empty_report() {
        let report = convert_str("", &ConvertOptions::default()).unwrap();
        assert_eq!(report.to_json(false).unwrap(), "{}");
    }

    #[test]
    fn test_unknown_blocks_are_skipped() {
        let report = convert_str(
            "Some banner text\n\nUnclaimed silver: 3.\n\nTrailing notes\n",
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(report.to_value(), json!({"unclaimedSilver": 3}));
    }

    #[test]
    fn test_cancelled_conversion() {
        let token = CancellationToken::new();
        token.cancel();
        let options = ConvertOptions::default().with_cancellation(token);
        assert!(matches!(
            convert_str(MINIMAL_REPORT, &options),
            Err(ConvertError::Cancelled)
        ));
    }

    #[test]
    fn test_line_limit() {
        let options = ConvertOptions::default().with_max_lines(Some(2));
        assert!(matches!(
            convert_str(MINIMAL_REPORT, &options),
            Err(ConvertError::TooLarge { limit: 2 })
        ));
    }

    #[test]
    fn test_write_checks_cancellation() {
        let report = convert_str(MINIMAL_REPORT, &ConvertOptions::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let mut out = Vec::new();
        let result = report.write_to(&mut out, OutputFormat::Json, false, &token);
        assert!(matches!(result, Err(ConvertError::Cancelled)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_yaml_output() {
        let report = convert_str("Unclaimed silver: 7.\n", &ConvertOptions::default()).unwrap();
        assert_eq!(report.to_yaml().unwrap(), "unclaimedSilver: 7\n");
    }

    #[test]
    fn test_render_all_keeps_order() {
        let options = ConvertOptions::default();
        let reports = vec![
            convert_str("Unclaimed silver: 1.\n", &options).unwrap(),
            convert_str("Unclaimed silver: 2.\n", &options).unwrap(),
        ];
        assert_eq!(
            render_all(&reports, OutputFormat::Json, false).unwrap(),
            r#"[{"unclaimedSilver":1},{"unclaimedSilver":2}]"#
        );
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
