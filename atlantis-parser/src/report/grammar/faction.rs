//! Faction header line and turn date
//!
//!     Faction (3) (War 1, Trade 2, Magic 2)
//!     May, Year 1

use crate::report::grammar::{non_empty, Grammar, NameGrammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::combinators::{attempt, optional};
use crate::report::span::{PResult, SpanParser};

/// `Name (number) [(Tag n, Tag n, ...)]` into `{name, number, type: [{key, amount?}]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactionGrammar;

/// `Month, Year n` into `{month, year}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateGrammar;

/// One type tag: `War 1` or a bare `Normal`.
fn type_tag(segment: SpanParser<'_>) -> Node {
    let with_amount = attempt(segment, |p| {
        let (key, p) = p.before_backwards(" ")?;
        let key = non_empty(key, "faction type")?;
        let (amount, p) = p.skip_whitespace().integer()?;
        Ok(((key, amount), p.expect_end()?))
    });
    match with_amount {
        Ok(((key, amount), _)) => ObjectBuilder::new()
            .field("key", key)
            .field("amount", amount)
            .build(),
        Err(_) => ObjectBuilder::new().field("key", segment.rest()).build(),
    }
}

fn type_tags(input: SpanParser<'_>) -> PResult<'_, Vec<Node>> {
    let (inner, rest) = input.skip_whitespace().between("(", ")")?;
    let tags = inner
        .split(",")
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .map(type_tag)
        .collect();
    Ok((tags, rest))
}

impl Grammar for FactionGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let ((name, number), p) = NameGrammar.name_number(input)?;
        let (tags, p) = optional(p, type_tags);
        let node = ObjectBuilder::new()
            .field("name", name)
            .field("number", number)
            .field("type", tags.unwrap_or_default())
            .build();
        Ok((node, p))
    }
}

impl Grammar for DateGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let p = input.strip_suffix(".");
        let (month, p) = p.before(",")?;
        let month = non_empty(month, "month")?;
        let (year, p) = p
            .match_literal(",")?
            .skip_whitespace()
            .match_literal("Year")?
            .skip_whitespace()
            .integer()?;
        let node = ObjectBuilder::new()
            .field("month", month)
            .field("year", year)
            .build();
        Ok((node, p))
    }
}
