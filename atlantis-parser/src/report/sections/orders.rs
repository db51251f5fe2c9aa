//! Orders template
//!
//!     Orders Template (Long Format):
//!
//!     #atlantis 3 "password"
//!
//!     unit 1234
//!     ;Scout (1234), Faction (3), 10 leaders [LEAD].
//!     work
//!
//!     #end
//!
//! Lines starting with `;` are template comments. The section must be closed by `#end`.

use tracing::{debug, trace};

use crate::report::block::Block;
use crate::report::error::{ConvertError, Location};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{
    current, current_starts_with, expect_next, violation, BlockCursor, Section, SectionHandler,
};
use crate::report::span::{PResult, SpanParser};

const HEADER: &str = "Orders Template (Long Format):";
const START: &str = "#atlantis";
const END: &str = "#end";
const UNIT: &str = "unit";
const COMMENT: char = ';';

pub struct OrdersTemplateSection;

struct UnitOrders {
    unit: i64,
    orders: Vec<String>,
}

impl UnitOrders {
    fn build(self) -> Node {
        ObjectBuilder::new()
            .field("unit", self.unit)
            .field("orders", self.orders.join("\n"))
            .build()
    }
}

/// `#atlantis <faction> ["password"]`
fn start_line(input: SpanParser<'_>) -> PResult<'_, (i64, Option<&str>)> {
    let p = input.match_literal(START)?.match_literal(" ")?.skip_whitespace();
    let (faction, p) = p.integer()?;
    let (password, p) = match p.skip_whitespace().between("\"", "\"") {
        Ok((inner, rest)) => (Some(inner.rest()), rest),
        Err(_) => (None, p),
    };
    Ok(((faction, password), p.expect_end()?))
}

/// `unit <number>`
fn unit_line(input: SpanParser<'_>) -> PResult<'_, i64> {
    let (number, p) = input
        .match_literal(UNIT)?
        .match_literal(" ")?
        .skip_whitespace()
        .integer()?;
    Ok((number, p.expect_end()?))
}

impl SectionHandler for OrdersTemplateSection {
    fn section(&self) -> Section {
        Section::OrdersTemplate
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

        let start = expect_next(cursor, section, &header)?;
        let ((faction, password), _) = start_line(SpanParser::new(start.text()))
            .map_err(|f| violation(section, &start, f.context("expected '#atlantis <faction>'")))?;
        let mut template = ObjectBuilder::new()
            .field("faction", faction)
            .maybe("password", password);

        let mut units: Vec<UnitOrders> = Vec::new();
        let mut last: Block = start;
        'blocks: loop {
            let block = expect_next(cursor, section, &last)?;
            for (index, line) in block.lines().iter().enumerate() {
                let line = line.trim();
                if line.eq_ignore_ascii_case(END) {
                    break 'blocks;
                }
                if line.is_empty() || line.starts_with(COMMENT) {
                    continue;
                }
                if let Ok((unit, _)) = unit_line(SpanParser::new(line)) {
                    units.push(UnitOrders {
                        unit,
                        orders: Vec::new(),
                    });
                    continue;
                }
                match units.last_mut() {
                    Some(open) => open.orders.push(line.to_string()),
                    None => trace!(
                        line = %Location::new(block.start_line() + index, 1),
                        "order outside of a unit"
                    ),
                }
            }
            last = block;
        }

        debug!(units = units.len(), faction, "parsed orders template");
        template.insert(
            "units",
            units.into_iter().map(UnitOrders::build).collect::<Vec<_>>(),
        );
        output.insert("ordersTemplate", template.build());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::convert_fragment;
    use serde_json::json;

    #[test]
    fn test_orders_template() {
        let value = convert_fragment(
            "Orders Template (Long Format):\n\n#atlantis 3 \"secret\"\n\nunit 1234\n\
             ;Scout (1234), Faction (3), 10 leaders [LEAD].\nwork\n\nunit 1235\nstudy COMB\n\
             @tax\n\n#end\n",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "ordersTemplate": {
                    "faction": 3,
                    "password": "secret",
                    "units": [
                        {"unit": 1234, "orders": "work"},
                        {"unit": 1235, "orders": "study COMB\n@tax"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_without_password() {
        let value = convert_fragment("Orders Template (Long Format):\n#atlantis 7\n#end\n").unwrap();
        assert_eq!(value, json!({"ordersTemplate": {"faction": 7, "units": []}}));
    }

    #[test]
    fn test_missing_end_is_end_of_input() {
        let err = convert_fragment("Orders Template (Long Format):\n\n#atlantis 3\n\nunit 1\nwork\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnexpectedEndOfInput {
                section: Section::OrdersTemplate,
                location: Location { line: 7, column: 1 }
            }
        ));
    }

    #[test]
    fn test_short_format_is_not_recognized() {
        let value = convert_fragment(
            "Orders Template (Short Format):\n\n#atlantis 3\n\nunit 1\nwork\n\n#end\n",
        )
        .unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_start_line() {
        let ((faction, password), _) = start_line(SpanParser::new("#atlantis 12 \"pw\"")).unwrap();
        assert_eq!((faction, password), (12, Some("pw")));
        assert!(start_line(SpanParser::new("#atlantis")).is_err());
    }
}
