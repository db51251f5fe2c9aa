//! Faction header and engine version
//!
//!     Atlantis Report For:
//!     Faction (3) (War 1, Trade 2, Magic 2)
//!     May, Year 1
//!
//!     Atlantis Engine Version: 5.2.0 (beta)
//!     Standard Atlantis, Version: 5.2.0 (beta)

use tracing::debug;

use crate::report::error::ConvertError;
use crate::report::grammar::{Grammar, GRAMMAR};
use crate::report::node::ObjectBuilder;
use crate::report::sections::{
    current, current_starts_with, expect_next, next_adjacent, violation, BlockCursor, Section,
    SectionHandler,
};
use crate::report::span::{ParseFailure, SpanParser};

const REPORT_FOR: &str = "Atlantis Report For:";
const ENGINE_VERSION: &str = "Atlantis Engine Version:";
const RULESET_VERSION: &str = ", Version:";

pub struct FactionHeaderSection;

impl SectionHandler for FactionHeaderSection {
    fn section(&self) -> Section {
        Section::FactionHeader
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        Ok(current_starts_with(cursor, REPORT_FOR))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let section = self.section();
        let header = current(cursor, section)?;

        // The faction may share the header line.
        let inline = header.text()[REPORT_FOR.len()..].trim_start();
        let faction_block = if inline.is_empty() {
            Some(expect_next(cursor, section, &header)?)
        } else {
            None
        };
        let (faction_block, faction_offset) = match &faction_block {
            Some(block) => (block, 0),
            None => (&header, header.text().len() - inline.len()),
        };
        let faction_input = SpanParser::new(faction_block.text());
        let faction_input = faction_input.split_at(faction_offset).1;
        let (faction, _) = GRAMMAR
            .faction
            .parse_all(faction_input)
            .map_err(|f| violation(section, faction_block, f.context("faction")))?;

        let date_block = expect_next(cursor, section, faction_block)?;
        let (date, _) = GRAMMAR
            .date
            .parse_all(SpanParser::new(date_block.text()))
            .map_err(|f| violation(section, &date_block, f.context("date")))?;

        debug!(line = header.start_line(), "parsed faction header");
        output.insert("faction", faction);
        output.insert("date", date);
        Ok(())
    }
}

pub struct EngineSection;

fn ruleset(input: SpanParser<'_>) -> Result<ObjectBuilder, ParseFailure> {
    let (name, rest) = input.before(RULESET_VERSION)?;
    let name = name.rest().trim();
    if name.is_empty() {
        return Err(input.failure("expected ruleset name"));
    }
    let (version, _) = rest.match_literal(RULESET_VERSION)?.take_rest();
    Ok(ObjectBuilder::new()
        .field("name", name)
        .field("version", version))
}

impl SectionHandler for EngineSection {
    fn section(&self) -> Section {
        Section::Engine
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        Ok(current_starts_with(cursor, ENGINE_VERSION))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let header = current(cursor, self.section())?;
        let version = header.text()[ENGINE_VERSION.len()..].trim();
        let mut engine = ObjectBuilder::new().field("version", version);

        if let Some(block) = next_adjacent(cursor, &header)? {
            match ruleset(SpanParser::new(block.text())) {
                Ok(ruleset) => engine.insert("ruleset", ruleset.build()),
                Err(_) => {
                    cursor.back();
                }
            }
        }

        debug!(line = header.start_line(), version, "parsed engine version");
        output.insert("engine", engine.build());
        Ok(())
    }
}
