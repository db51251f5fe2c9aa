//! Block Segmenting
//!
//!     Groups physical report lines into logical blocks, one per unit, structure or
//!     paragraph. The engine wraps long records onto indented continuation lines, so
//!     indentation is what tells a continuation from a new record:
//!
//!         1. A blank line closes the open block.
//!         2. A line starting with the structure marker `+` closes the open block and opens a
//!            structure sub-block. Inside it a blank line closes everything; a line with
//!            exactly two blank columns followed by a unit marker (`-` or `*`) starts a unit
//!            block nested in the structure; a line with four or more blank columns continues
//!            the current nested unit; anything else continues the structure's own line.
//!         3. A line starting with a blank column continues the open block.
//!         4. Any other line closes the open block and opens a new one.
//!
//!     The segmenter is an iterator adapter, so blocks are produced while lines are still
//!     being read. Read errors from the line source pass straight through.

use std::collections::VecDeque;

use crate::report::block::{leading_blanks, Block};

/// Marker that opens a structure entry.
pub const STRUCTURE_MARKER: char = '+';

/// Markers that open a unit entry (own and foreign units).
pub const UNIT_MARKERS: [char; 2] = ['*', '-'];

struct BlockBuilder {
    start_line: usize,
    lines: Vec<String>,
}

impl BlockBuilder {
    fn new(start_line: usize, line: String) -> Self {
        Self {
            start_line,
            lines: vec![line],
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn finish(self) -> Block {
        Block::new(self.start_line, self.lines)
    }
}

/// A structure sub-block: the structure line and the unit blocks nested in it.
struct StructureBuilder {
    structure: BlockBuilder,
    units: Vec<BlockBuilder>,
}

impl StructureBuilder {
    fn finish(self, ready: &mut VecDeque<Block>) {
        ready.push_back(self.structure.finish());
        ready.extend(self.units.into_iter().map(BlockBuilder::finish));
    }
}

/// Iterator adapter turning physical lines into [Block]s.
pub struct BlockSegmenter<I> {
    lines: I,
    line_number: usize,
    open: Option<BlockBuilder>,
    structure: Option<StructureBuilder>,
    ready: VecDeque<Block>,
    exhausted: bool,
}

impl<I, E> BlockSegmenter<I>
where
    I: Iterator<Item = Result<String, E>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_number: 0,
            open: None,
            structure: None,
            ready: VecDeque::new(),
            exhausted: false,
        }
    }

    fn flush(&mut self) {
        if let Some(block) = self.open.take() {
            self.ready.push_back(block.finish());
        }
        if let Some(structure) = self.structure.take() {
            structure.finish(&mut self.ready);
        }
    }

    fn feed(&mut self, line: String) {
        let number = self.line_number;

        if line.trim().is_empty() {
            self.flush();
            return;
        }

        if let Some(structure) = self.structure.as_mut() {
            let indent = leading_blanks(&line);
            let starts_unit = indent == 2
                && line[indent..]
                    .chars()
                    .next()
                    .map(|c| UNIT_MARKERS.contains(&c))
                    .unwrap_or(false);

            if starts_unit {
                structure.units.push(BlockBuilder::new(number, line));
            } else if indent >= 4 && !structure.units.is_empty() {
                if let Some(unit) = structure.units.last_mut() {
                    unit.push(line);
                }
            } else {
                structure.structure.push(line);
            }
            return;
        }

        if line.starts_with(STRUCTURE_MARKER) {
            self.flush();
            self.structure = Some(StructureBuilder {
                structure: BlockBuilder::new(number, line),
                units: Vec::new(),
            });
            return;
        }

        if leading_blanks(&line) > 0 {
            if let Some(open) = self.open.as_mut() {
                open.push(line);
                return;
            }
        }

        self.flush();
        self.open = Some(BlockBuilder::new(number, line));
    }
}

impl<I, E> Iterator for BlockSegmenter<I>
where
    I: Iterator<Item = Result<String, E>>,
{
    type Item = Result<Block, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(block) = self.ready.pop_front() {
                return Some(Ok(block));
            }
            if self.exhausted {
                return None;
            }
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.line_number += 1;
                    self.feed(line);
                }
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.exhausted = true;
                    self.flush();
                }
            }
        }
    }
}

/// Segment an in-memory report. Convenience for tests and small inputs.
pub fn segment_str(source: &str) -> Vec<Block> {
    BlockSegmenter::new(source.lines().map(|l| Ok::<_, std::convert::Infallible>(l.to_string())))
        .filter_map(Result::ok)
        .collect()
}
