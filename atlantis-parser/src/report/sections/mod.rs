//! Report Sections
//!
//!     A report is a sequence of sections, each introduced by a fixed literal header
//!     (`Faction Status:`, `Errors during turn:`, ...) or, for regions, by the dashed line
//!     under a region header. Each section kind has a [SectionHandler]: `can_parse` looks at
//!     the block under the cursor (and may peek one block ahead), `parse` consumes as many
//!     blocks as the section needs and writes the result under the section's key.
//!
//!     Sections other than regions occur at most once. [PendingSections] tracks which ones
//!     can still match; a matched section is removed so it cannot trigger again. Regions
//!     repeat and stay pending for the whole conversion.
//!
//!     Handlers that read a list of records stop at the first block that is not part of the
//!     section and step the cursor back onto the last block they consumed, so the dispatcher
//!     sees the foreign block next.

mod attitudes;
mod header;
mod messages;
mod orders;
mod regions;
mod reports;
mod silver;
mod status;

use std::fmt;

use crate::report::block::Block;
use crate::report::cursor::Cursor;
use crate::report::error::{ConvertError, Location};
use crate::report::node::ObjectBuilder;
use crate::report::span::ParseFailure;

/// Source of blocks handed to the section handlers.
pub type BlockSource<'a> = Box<dyn Iterator<Item = Result<Block, ConvertError>> + 'a>;

/// Cursor over the block stream of one conversion.
pub type BlockCursor<'a> = Cursor<Block, ConvertError, BlockSource<'a>>;

/// The kinds of report sections, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    FactionHeader,
    Engine,
    FactionStatus,
    Errors,
    Events,
    SkillReports,
    ItemReports,
    Attitudes,
    UnclaimedSilver,
    Regions,
    OrdersTemplate,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Section::FactionHeader,
        Section::Engine,
        Section::FactionStatus,
        Section::Errors,
        Section::Events,
        Section::SkillReports,
        Section::ItemReports,
        Section::Attitudes,
        Section::UnclaimedSilver,
        Section::Regions,
        Section::OrdersTemplate,
    ];

    /// Sections that may match any number of times.
    pub fn repeats(self) -> bool {
        matches!(self, Section::Regions)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// The handler for this section.
    pub fn handler(self) -> &'static dyn SectionHandler {
        match self {
            Section::FactionHeader => &header::FactionHeaderSection,
            Section::Engine => &header::EngineSection,
            Section::FactionStatus => &status::FactionStatusSection,
            Section::Errors => &messages::ERRORS,
            Section::Events => &messages::EVENTS,
            Section::SkillReports => &reports::SkillReportsSection,
            Section::ItemReports => &reports::ItemReportsSection,
            Section::Attitudes => &attitudes::AttitudesSection,
            Section::UnclaimedSilver => &silver::UnclaimedSilverSection,
            Section::Regions => &regions::RegionsSection,
            Section::OrdersTemplate => &orders::OrdersTemplateSection,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::FactionHeader => "faction header",
            Section::Engine => "engine",
            Section::FactionStatus => "faction status",
            Section::Errors => "errors",
            Section::Events => "events",
            Section::SkillReports => "skill reports",
            Section::ItemReports => "item reports",
            Section::Attitudes => "attitudes",
            Section::UnclaimedSilver => "unclaimed silver",
            Section::Regions => "regions",
            Section::OrdersTemplate => "orders template",
        };
        f.write_str(name)
    }
}

/// The sections that can still match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSections(u16);

impl PendingSections {
    pub fn all() -> Self {
        Self(Section::ALL.iter().fold(0, |bits, s| bits | s.bit()))
    }

    pub fn contains(&self, section: Section) -> bool {
        self.0 & section.bit() != 0
    }

    /// Mark a section as consumed. Repeating sections stay pending.
    pub fn consume(&mut self, section: Section) {
        if !section.repeats() {
            self.0 &= !section.bit();
        }
    }

    /// Pending sections in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        Section::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl Default for PendingSections {
    fn default() -> Self {
        Self::all()
    }
}

/// Recognizes and parses one section kind.
pub trait SectionHandler: Sync {
    fn section(&self) -> Section;

    /// Whether the block under the cursor starts this section. May peek, never consumes.
    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError>;

    /// Consume the section starting at the block under the cursor and write its output.
    /// On return the cursor is on the last block that belongs to the section.
    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError>;
}

/// True when the block under the cursor starts with `prefix` (ignoring case).
pub(crate) fn current_starts_with(cursor: &BlockCursor<'_>, prefix: &str) -> bool {
    cursor
        .current()
        .map(|block| block.starts_with(prefix))
        .unwrap_or(false)
}

/// The block under the cursor.
pub(crate) fn current(cursor: &BlockCursor<'_>, section: Section) -> Result<Block, ConvertError> {
    cursor
        .current()
        .cloned()
        .ok_or(ConvertError::UnexpectedEndOfInput {
            section,
            location: Location::new(1, 1),
        })
}

/// Move to the next block, if there is one.
pub(crate) fn next(cursor: &mut BlockCursor<'_>) -> Result<Option<Block>, ConvertError> {
    if cursor.advance()? {
        Ok(cursor.current().cloned())
    } else {
        Ok(None)
    }
}

/// Move to the next block; running out of input is an error.
pub(crate) fn expect_next(
    cursor: &mut BlockCursor<'_>,
    section: Section,
    after: &Block,
) -> Result<Block, ConvertError> {
    next(cursor)?.ok_or(ConvertError::UnexpectedEndOfInput {
        section,
        location: Location::new(after.end_line() + 1, 1),
    })
}

/// Move to the next block only if it directly follows `previous` (no blank line between).
/// Otherwise the cursor stays where it was.
pub(crate) fn next_adjacent(
    cursor: &mut BlockCursor<'_>,
    previous: &Block,
) -> Result<Option<Block>, ConvertError> {
    match next(cursor)? {
        Some(block) if block.follows(previous) => Ok(Some(block)),
        Some(_) => {
            cursor.back();
            Ok(None)
        }
        None => Ok(None),
    }
}

/// A structure violation at the position a grammar failure points to.
pub(crate) fn violation(section: Section, block: &Block, failure: ParseFailure) -> ConvertError {
    ConvertError::StructureViolation {
        section,
        location: block.locate(failure.offset),
        message: failure.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_sections_shrink() {
        let mut pending = PendingSections::all();
        assert_eq!(pending.iter().count(), Section::ALL.len());
        pending.consume(Section::FactionStatus);
        assert!(!pending.contains(Section::FactionStatus));
        assert_eq!(pending.iter().count(), Section::ALL.len() - 1);
    }

    #[test]
    fn test_regions_stay_pending() {
        let mut pending = PendingSections::all();
        pending.consume(Section::Regions);
        assert!(pending.contains(Section::Regions));
    }

    #[test]
    fn test_dispatch_order() {
        let order: Vec<_> = PendingSections::all().iter().collect();
        assert_eq!(order.first(), Some(&Section::FactionHeader));
        assert_eq!(order.last(), Some(&Section::OrdersTemplate));
    }

    #[test]
    fn test_handlers_match_their_section() {
        for section in Section::ALL {
            assert_eq!(section.handler().section(), section);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Section::FactionStatus.to_string(), "faction status");
        assert_eq!(Section::OrdersTemplate.to_string(), "orders template");
    }
}
