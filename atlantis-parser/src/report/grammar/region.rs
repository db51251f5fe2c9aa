//! Region headers
//!
//!     terrain (coords) in province[, contains name [size]][, amount peasants (race)][, $tax].
//!
//!     Settlement, population and tax are each optional on their own; a missing settlement
//!     does not stop the population from being read.

use crate::report::grammar::{non_empty, CoordsGrammar, Grammar};
use crate::report::node::{Fields, Node, ObjectBuilder};
use crate::report::span::combinators::{optional, preceded};
use crate::report::span::{PResult, SpanParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct RegionHeaderGrammar;

fn settlement(input: SpanParser<'_>) -> PResult<'_, Node> {
    let p = input.skip_whitespace().match_literal("contains ")?;
    let (name, p) = p.before("[")?;
    let name = non_empty(name, "settlement name")?;
    let (size, p) = p.between("[", "]")?;
    let size = non_empty(size, "settlement size")?;
    let node = ObjectBuilder::new()
        .field("name", name)
        .field("size", size)
        .build();
    Ok((node, p))
}

fn population(input: SpanParser<'_>) -> PResult<'_, Node> {
    let (amount, p) = input.skip_whitespace().integer()?;
    let (_, p) = p.before("(")?;
    let (race, p) = p.between("(", ")")?;
    let race = non_empty(race, "race")?;
    let node = ObjectBuilder::new()
        .field("amount", amount)
        .field("race", race)
        .build();
    Ok((node, p))
}

fn tax(input: SpanParser<'_>) -> PResult<'_, i64> {
    input.skip_whitespace().match_literal("$")?.integer()
}

impl RegionHeaderGrammar {
    /// The header as sibling fields, to be spliced into the region object.
    pub fn fields<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Fields> {
        let p = input.strip_suffix(".");
        let (terrain, p) = p.before("(")?;
        let terrain = non_empty(terrain, "terrain")?;
        let (coords, p) = CoordsGrammar.parse(p)?;
        let p = p.skip_whitespace().match_literal("in ")?;
        let (province, p) = match p.before(",") {
            Ok(split) => split,
            Err(_) => {
                let rest = p.take_rest().1;
                (p, rest)
            }
        };
        let province = non_empty(province, "province")?;

        let (settlement, p) = optional(p, |p| preceded(p, ",", settlement));
        let (population, p) = optional(p, |p| preceded(p, ",", population));
        let (tax, p) = optional(p, |p| preceded(p, ",", tax));
        let p = p.expect_end()?;

        let fields = ObjectBuilder::new()
            .field("terrain", terrain)
            .field("coords", coords)
            .field("province", province)
            .maybe("settlement", settlement)
            .maybe("population", population)
            .maybe("tax", tax)
            .into_fields();
        Ok((fields, p))
    }
}

impl Grammar for RegionHeaderGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let (fields, rest) = self.fields(input)?;
        Ok((Node::Object(fields), rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::grammar::parse_text;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[test]
    fn test_full_header() {
        let text = "forest (50,22) in Mapa, contains Sembury [village], 5866 peasants (high elves), $2698.";
        assert_eq!(
            Value::from(parse_text(&RegionHeaderGrammar, text).unwrap()),
            json!({
                "terrain": "forest",
                "coords": {"x": 50, "y": 22},
                "province": "Mapa",
                "settlement": {"name": "Sembury", "size": "village"},
                "population": {"amount": 5866, "race": "high elves"},
                "tax": 2698
            })
        );
    }

    #[rstest]
    #[case(
        "ocean (50,20) in Atlantis Ocean.",
        json!({"terrain": "ocean", "coords": {"x": 50, "y": 20}, "province": "Atlantis Ocean"})
    )]
    #[case(
        "plain (2,4) in Thornton, 1024 peasants (humans), $512.",
        json!({"terrain": "plain", "coords": {"x": 2, "y": 4}, "province": "Thornton",
               "population": {"amount": 1024, "race": "humans"}, "tax": 512})
    )]
    #[case(
        "tunnels (3,5,2 <underworld>) in Deepholm, contains Grot [town].",
        json!({"terrain": "tunnels", "coords": {"x": 3, "y": 5, "z": 2, "label": "underworld"},
               "province": "Deepholm", "settlement": {"name": "Grot", "size": "town"}})
    )]
    fn test_optional_parts(#[case] text: &str, #[case] expected: Value) {
        assert_eq!(Value::from(parse_text(&RegionHeaderGrammar, text).unwrap()), expected);
    }

    #[test]
    fn test_fields_splice_without_nesting() {
        let (fields, _) = RegionHeaderGrammar
            .fields(SpanParser::new("desert (1,1) in Sands."))
            .unwrap();
        let names: Vec<_> = fields.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["terrain", "coords", "province"]);
    }

    #[test]
    fn test_trailing_garbage_fails() {
        assert!(parse_text(&RegionHeaderGrammar, "forest (1,1) in Mapa, something odd.").is_err());
    }
}
