//! Logical report blocks
//!
//!     A block is one logical record of the report: a region header, a unit entry, a
//!     structure entry, a paragraph. It keeps the physical lines it was built from so that
//!     handlers can look at indentation, and a normalized `text` (each line trimmed, joined
//!     with single spaces) that the grammar parsers run over.

use crate::report::error::Location;

/// One logical multi-line record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    start_line: usize,
    lines: Vec<String>,
    text: String,
}

impl Block {
    /// Build a block from its physical lines. `start_line` is 1-based.
    pub fn new(start_line: usize, lines: Vec<String>) -> Self {
        let text = lines
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            start_line,
            lines,
            text,
        }
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Line number of the last physical line in the block.
    pub fn end_line(&self) -> usize {
        self.start_line + self.lines.len().saturating_sub(1)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the first physical line starts with a blank column.
    pub fn is_indented(&self) -> bool {
        self.lines
            .first()
            .map(|line| leading_blanks(line) > 0)
            .unwrap_or(false)
    }

    /// True when this block starts on the line right after `previous` ends, with no blank
    /// line in between.
    pub fn follows(&self, previous: &Block) -> bool {
        self.start_line == previous.end_line() + 1
    }

    /// Case-insensitive literal prefix test on the normalized text.
    pub fn starts_with(&self, prefix: &str) -> bool {
        let text = self.text.as_bytes();
        text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }

    /// Map a byte offset in `text` back to the physical line and column it came from.
    pub fn locate(&self, offset: usize) -> Location {
        let mut consumed = 0;
        for (index, line) in self.lines.iter().enumerate() {
            let trimmed = line.trim();
            let indent = line.len() - line.trim_start().len();
            if offset <= consumed + trimmed.len() || index + 1 == self.lines.len() {
                let within = offset.saturating_sub(consumed).min(trimmed.len());
                return Location::new(self.start_line + index, indent + within + 1);
            }
            // The joining space belongs to the end of this line.
            consumed += trimmed.len() + 1;
        }
        Location::new(self.start_line, 1)
    }

    /// Location of the first character of the block.
    pub fn location(&self) -> Location {
        self.locate(0)
    }
}

/// Number of leading space or tab columns.
pub fn leading_blanks(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: usize, lines: &[&str]) -> Block {
        Block::new(start, lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_text_is_trimmed_and_joined() {
        let b = block(3, &["- Unit (1), Faction (2), 80", "  swords [SWOR]."]);
        assert_eq!(b.text(), "- Unit (1), Faction (2), 80 swords [SWOR].");
        assert_eq!(b.start_line(), 3);
        assert_eq!(b.end_line(), 4);
    }

    #[test]
    fn test_locate_maps_offsets_to_physical_lines() {
        let b = block(10, &["forest (50,22) in Mapa, contains", "  Sembury [village]."]);
        assert_eq!(b.locate(0), Location::new(10, 1));
        assert_eq!(b.locate(7), Location::new(10, 8));
        // "Sembury" starts right after the joining space
        let offset = b.text().find("Sembury").unwrap();
        assert_eq!(b.locate(offset), Location::new(11, 3));
    }

    #[test]
    fn test_follows_requires_adjacent_lines() {
        let first = block(1, &["Faction Status:"]);
        let second = block(2, &["Mages: 1 (2)"]);
        let detached = block(4, &["Errors during turn:"]);
        assert!(second.follows(&first));
        assert!(!detached.follows(&second));
    }

    #[test]
    fn test_starts_with_ignores_case() {
        let b = block(1, &["ATLANTIS Report For:"]);
        assert!(b.starts_with("Atlantis Report For:"));
        assert!(!b.starts_with("Atlantis Report For: and more"));
    }

    #[test]
    fn test_indentation() {
        assert!(block(1, &["  - Unit (1)"]).is_indented());
        assert!(!block(1, &["- Unit (1)"]).is_indented());
        assert_eq!(leading_blanks("\t  x"), 3);
    }
}
