//! Declared attitudes
//!
//!     Declared Attitudes (default Neutral):
//!     Hostile : none.
//!     Friendly : Merchants (4), Guild (9).

use tracing::debug;

use crate::report::error::ConvertError;
use crate::report::grammar::{Grammar, GRAMMAR};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{
    current, current_starts_with, next_adjacent, violation, BlockCursor, Section, SectionHandler,
};
use crate::report::span::combinators::list;
use crate::report::span::{PResult, SpanParser};

const HEADER: &str = "Declared Attitudes";

pub struct AttitudesSection;

fn default_attitude(input: SpanParser<'_>) -> PResult<'_, String> {
    let p = input.after("(")?.skip_whitespace().match_literal("default")?;
    let (name, p) = p.before(")")?;
    let name = name.rest().trim();
    if name.is_empty() {
        return Err(p.failure("expected default attitude"));
    }
    Ok((name.to_lowercase(), p))
}

fn attitude_line(input: SpanParser<'_>) -> PResult<'_, (String, Vec<Node>)> {
    let (name, p) = input.before(":")?;
    let name = name.rest().trim();
    if name.is_empty() {
        return Err(input.failure("expected attitude"));
    }
    let p = p.match_literal(":")?.strip_suffix(".");
    let (factions, p) = list(p, ",", |f| GRAMMAR.name.parse(f))?;
    Ok(((name.to_lowercase(), factions), p))
}

impl SectionHandler for AttitudesSection {
    fn section(&self) -> Section {
        Section::Attitudes
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
        let header = current(cursor, section)?;
        let (default, _) = default_attitude(SpanParser::new(header.text()))
            .map_err(|f| violation(section, &header, f))?;
        let mut attitudes = ObjectBuilder::new().field("default", default);

        let mut previous = header;
        while let Some(block) = next_adjacent(cursor, &previous)? {
            let ((name, factions), _) = attitude_line(SpanParser::new(block.text()))
                .map_err(|f| violation(section, &block, f))?;
            attitudes.insert(&name, factions);
            previous = block;
        }

        debug!(line = previous.start_line(), "parsed declared attitudes");
        output.insert("attitudes", attitudes.build());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::report::testing::convert_fragment;
    use serde_json::json;

    #[test]
    fn test_attitudes() {
        let value = convert_fragment(
            "Declared Attitudes (default Neutral):\nHostile : none.\nFriendly : Merchants (4), Guild (9).\n",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "attitudes": {
                    "default": "neutral",
                    "hostile": [],
                    "friendly": [
                        {"name": "Merchants", "number": 4},
                        {"name": "Guild", "number": 9}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_missing_default_is_a_violation() {
        let err = convert_fragment("Declared Attitudes:\nHostile : none.\n").unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(1));
    }

    #[test]
    fn test_malformed_attitude_line() {
        let err = convert_fragment("Declared Attitudes (default Neutral):\nAlly : everyone.\n")
            .unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }
}
