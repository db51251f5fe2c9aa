//! Skill and item reports
//!
//!     Skill reports:
//!
//!     combat [COMB] 1: This skill gives the unit a bonus in hand to hand
//!       combat.
//!
//!     Item reports:
//!
//!     leader [LEAD], weight 10, walking capacity 5. This race may study
//!       all skills to level 5.
//!
//! Entries are separated by blank lines; the section ends at the first block that does not
//! look like an entry.

use tracing::debug;

use crate::report::block::Block;
use crate::report::error::ConvertError;
use crate::report::grammar::{Grammar, GRAMMAR};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{
    current, current_starts_with, next, BlockCursor, Section, SectionHandler,
};
use crate::report::span::{PResult, SpanParser};

const SKILL_REPORTS: &str = "Skill reports:";
const ITEM_REPORTS: &str = "Item reports:";

pub struct SkillReportsSection;

pub struct ItemReportsSection;

fn skill_report(input: SpanParser<'_>) -> PResult<'_, Node> {
    let (skill, p) = GRAMMAR.skill.parse(input)?;
    if skill.get("level").is_none() {
        return Err(p.failure("expected skill level"));
    }
    let (description, p) = p.match_literal(":")?.take_rest();
    let node = ObjectBuilder::new()
        .field("skill", skill)
        .field("description", description)
        .build();
    Ok((node, p))
}

fn item_report(input: SpanParser<'_>) -> PResult<'_, Node> {
    let ((name, code), p) = GRAMMAR.item.name_code(input)?;
    if name.contains(',') {
        return Err(input.failure("expected item name"));
    }
    let (description, p) = p.match_literal(",")?.take_rest();
    let item = ObjectBuilder::new()
        .field("name", name)
        .field("code", code)
        .build();
    let node = ObjectBuilder::new()
        .field("item", item)
        .field("description", description)
        .build();
    Ok((node, p))
}

/// Collect entries while `entry` accepts the next block.
fn collect_entries(
    cursor: &mut BlockCursor<'_>,
    entry: fn(SpanParser<'_>) -> PResult<'_, Node>,
) -> Result<Vec<Node>, ConvertError> {
    let mut entries = Vec::new();
    while let Some(block) = next(cursor)? {
        match parse_block(&block, entry) {
            Some(node) => entries.push(node),
            None => {
                cursor.back();
                break;
            }
        }
    }
    Ok(entries)
}

fn parse_block(block: &Block, entry: fn(SpanParser<'_>) -> PResult<'_, Node>) -> Option<Node> {
    entry(SpanParser::new(block.text())).ok().map(|(node, _)| node)
}

impl SectionHandler for SkillReportsSection {
    fn section(&self) -> Section {
        Section::SkillReports
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        Ok(current_starts_with(cursor, SKILL_REPORTS))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let header = current(cursor, self.section())?;
        let entries = collect_entries(cursor, skill_report)?;
        debug!(line = header.start_line(), entries = entries.len(), "parsed skill reports");
        output.insert("skillReports", entries);
        Ok(())
    }
}

impl SectionHandler for ItemReportsSection {
    fn section(&self) -> Section {
        Section::ItemReports
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        Ok(current_starts_with(cursor, ITEM_REPORTS))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let header = current(cursor, self.section())?;
        let entries = collect_entries(cursor, item_report)?;
        debug!(line = header.start_line(), entries = entries.len(), "parsed item reports");
        output.insert("itemReports", entries);
        Ok(())
    }
}
