//! `Name (number)` pairs: units, factions

use crate::report::grammar::{non_empty, Grammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::{PResult, SpanParser};

/// Parses `Name (number)` into `{name, number}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameGrammar;

impl NameGrammar {
    /// The raw name and number.
    pub fn name_number<'a>(&self, input: SpanParser<'a>) -> PResult<'a, (&'a str, i64)> {
        let input = input.skip_whitespace();
        let (name, rest) = input.before("(")?;
        let name = non_empty(name, "name")?;
        let (number, rest) = rest.match_literal("(")?.skip_whitespace().integer()?;
        let rest = rest.skip_whitespace().match_literal(")")?;
        Ok(((name, number), rest))
    }
}

impl Grammar for NameGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let ((name, number), rest) = self.name_number(input)?;
        let node = ObjectBuilder::new()
            .field("name", name)
            .field("number", number)
            .build();
        Ok((node, rest))
    }
}
