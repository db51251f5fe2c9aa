//! Faction status
//!
//!     Faction Status:
//!     Tax Regions: 1 (10)
//!     Mages: 0 (2)
//!
//! Every line up to the next blank line must be `key: amount [(max)]`.

use tracing::debug;

use crate::report::error::ConvertError;
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{
    current, current_starts_with, next_adjacent, violation, BlockCursor, Section, SectionHandler,
};
use crate::report::span::{PResult, SpanParser};

const HEADER: &str = "Faction Status:";

pub struct FactionStatusSection;

fn status_line(input: SpanParser<'_>) -> PResult<'_, Node> {
    let (key, p) = input.before(":")?;
    let key = key.rest().trim();
    if key.is_empty() {
        return Err(input.failure("expected status key"));
    }
    let (amount, p) = p.match_literal(":")?.skip_whitespace().integer()?;
    let (max, p) = match p.skip_whitespace().between("(", ")") {
        Ok((inner, rest)) => {
            let (max, inner) = inner.skip_whitespace().integer()?;
            inner.expect_end()?;
            (Some(max), rest)
        }
        Err(_) => (None, p),
    };
    let p = p.expect_end()?;
    let node = ObjectBuilder::new()
        .field("key", key)
        .field("amount", amount)
        .maybe("max", max)
        .build();
    Ok((node, p))
}

impl SectionHandler for FactionStatusSection {
    fn section(&self) -> Section {
        Section::FactionStatus
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        Ok(current_starts_with(cursor, HEADER))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let section = self.section();
        let mut previous = current(cursor, section)?;
        let mut entries = Vec::new();

        while let Some(block) = next_adjacent(cursor, &previous)? {
            let (entry, _) = status_line(SpanParser::new(block.text()))
                .map_err(|f| violation(section, &block, f.context("expected 'key: amount'")))?;
            entries.push(entry);
            previous = block;
        }

        debug!(entries = entries.len(), "parsed faction status");
        output.insert("factionStatus", entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::error::Location;
    use crate::report::testing::convert_fragment;
    use serde_json::json;

    #[test]
    fn test_status_lines() {
        let value = convert_fragment(
            "Faction Status:\nTax Regions: 1 (10)\nMages: 0 (2)\nQuartermasters: 3\n\nUnclaimed silver: 10.\n",
        )
        .unwrap();
        assert_eq!(
            value["factionStatus"],
            json!([
                {"key": "Tax Regions", "amount": 1, "max": 10},
                {"key": "Mages", "amount": 0, "max": 2},
                {"key": "Quartermasters", "amount": 3}
            ])
        );
        assert_eq!(value["unclaimedSilver"], json!(10));
    }

    #[test]
    fn test_malformed_line_is_a_violation() {
        let err = convert_fragment("Faction Status:\nMages: 0 (2)\nMages: lots\n").unwrap_err();
        assert!(matches!(err, ConvertError::StructureViolation { section: Section::FactionStatus, .. }));
        assert_eq!(err.location(), Some(Location::new(3, 8)));
    }

    #[test]
    fn test_empty_status() {
        let value = convert_fragment("Faction Status:\n").unwrap();
        assert_eq!(value, json!({"factionStatus": []}));
    }
}
