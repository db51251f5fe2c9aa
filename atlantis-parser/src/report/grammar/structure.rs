//! Structure entries: `+ Name [number] : type[, flag...][; description].`
//!
//! The nested `units` array is filled in by the regions section, not here.

use crate::report::grammar::{non_empty, Grammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::{PResult, SpanParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct StructureGrammar;

impl StructureGrammar {
    /// The structure's own fields, without `units`.
    pub fn builder<'a>(&self, input: SpanParser<'a>) -> PResult<'a, ObjectBuilder> {
        let p = input.skip_whitespace().match_literal("+")?;
        let (name, p) = p.before("[")?;
        let name = non_empty(name, "structure name")?;
        let (number, p) = p.match_literal("[")?.skip_whitespace().integer()?;
        let p = p
            .skip_whitespace()
            .match_literal("]")?
            .skip_whitespace()
            .match_literal(":")?;

        let body = p.strip_suffix(".");
        let (main, description) = match body.before(";") {
            Ok((main, rest)) => (main, Some(rest.match_literal(";")?.take_rest().0)),
            Err(_) => (body, None),
        };

        let mut segments = main.split(",").into_iter();
        let kind = match segments.next() {
            Some(segment) => non_empty(segment, "structure type")?,
            None => return Err(main.failure("expected structure type")),
        };
        let flags: Vec<Node> = segments
            .filter(|segment| !segment.is_empty())
            .map(|segment| Node::str(segment.rest()))
            .collect();

        let builder = ObjectBuilder::new()
            .field("name", name)
            .field("number", number)
            .field("type", kind)
            .field("flags", flags)
            .maybe("description", description.filter(|d| !d.is_empty()));
        Ok((builder, body.take_rest().1))
    }
}

impl Grammar for StructureGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let (builder, rest) = self.builder(input)?;
        Ok((builder.field("units", Vec::<Node>::new()).build(), rest))
    }
}
