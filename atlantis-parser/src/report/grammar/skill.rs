//! Skills: `name [CODE] [level [(days)]]`

use crate::report::grammar::{code, non_empty, Grammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::combinators::optional;
use crate::report::span::{PResult, SpanParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillGrammar;

fn level(input: SpanParser<'_>) -> PResult<'_, i64> {
    input.match_literal(" ")?.skip_whitespace().integer()
}

fn days(input: SpanParser<'_>) -> PResult<'_, i64> {
    let (days, rest) = input
        .skip_whitespace()
        .match_literal("(")?
        .skip_whitespace()
        .integer()?;
    Ok((days, rest.skip_whitespace().match_literal(")")?))
}

impl Grammar for SkillGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let (name, p) = input.skip_whitespace().before("[")?;
        let name = non_empty(name, "skill name")?;
        let (code, p) = code(p)?;
        let (level, p) = optional(p, level);
        // Days are only printed next to a level.
        let (days, p) = match level {
            Some(_) => optional(p, days),
            None => (None, p),
        };

        let node = ObjectBuilder::new()
            .field("name", name)
            .field("code", code)
            .maybe("level", level)
            .maybe("days", days)
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
    #[case("combat [COMB] 1 (31)", json!({"name": "combat", "code": "COMB", "level": 1, "days": 31}))]
    #[case("force [FORC]", json!({"name": "force", "code": "FORC"}))]
    #[case("pattern [PATT] 2", json!({"name": "pattern", "code": "PATT", "level": 2}))]
    #[case("weaponsmith [WEAP] 0 (15)", json!({"name": "weaponsmith", "code": "WEAP", "level": 0, "days": 15}))]
    fn test_skills(#[case] text: &str, #[case] expected: Value) {
        assert_eq!(Value::from(parse_text(&SkillGrammar, text).unwrap()), expected);
    }

    #[test]
    fn test_days_without_level_are_not_parsed() {
        assert!(parse_text(&SkillGrammar, "combat [COMB] (31)").is_err());
    }

    #[test]
    fn test_level_stops_before_report_colon() {
        let (node, rest) = SkillGrammar
            .parse(SpanParser::new("combat [COMB] 1: A skill."))
            .unwrap();
        assert_eq!(node.get("level").and_then(Node::as_i64), Some(1));
        assert_eq!(rest.rest(), ": A skill.");
    }
}
