//! Coordinates: `(x,y)`, `(x,y,z)` or `(x,y,z <label>)`
//!
//!     `z` and `label` are emitted only when the report carries them. The surface level is
//!     not defaulted here.

use crate::report::grammar::{non_empty, Grammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::combinators::optional;
use crate::report::span::{PResult, SpanParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordsGrammar;

fn component(input: SpanParser<'_>) -> PResult<'_, i64> {
    input
        .skip_whitespace()
        .match_literal(",")?
        .skip_whitespace()
        .integer()
}

fn label(input: SpanParser<'_>) -> PResult<'_, &str> {
    let (inner, rest) = input.skip_whitespace().between("<", ">")?;
    Ok((non_empty(inner, "level label")?, rest))
}

impl Grammar for CoordsGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let p = input.skip_whitespace().match_literal("(")?.skip_whitespace();
        let (x, p) = p.integer()?;
        let (y, p) = component(p)?;
        let (z, p) = optional(p, component);
        let (label, p) = match z {
            Some(_) => optional(p, label),
            None => (None, p),
        };
        let p = p.skip_whitespace().match_literal(")")?;

        let node = ObjectBuilder::new()
            .field("x", x)
            .field("y", y)
            .maybe("z", z)
            .maybe("label", label)
            .build();
        Ok((node, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::grammar::parse_text;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[rstest]
    #[case("(50,22)", json!({"x": 50, "y": 22}))]
    #[case("(0,4,2)", json!({"x": 0, "y": 4, "z": 2}))]
    #[case("(3, 7, 1 <underworld>)", json!({"x": 3, "y": 7, "z": 1, "label": "underworld"}))]
    fn test_coordinates(#[case] text: &str, #[case] expected: Value) {
        assert_eq!(Value::from(parse_text(&CoordsGrammar, text).unwrap()), expected);
    }

    #[rstest]
    #[case("50,22")]
    #[case("(50)")]
    #[case("(50,22")]
    #[case("(50,22 <nexus>)")]
    fn test_malformed_coordinates(#[case] text: &str) {
        assert!(parse_text(&CoordsGrammar, text).is_err());
    }
}
