//! Unit entries
//!
//!     * Name (n)[, on guard][, Faction (n)][, flag...][, item...][; description][. Clause: ...]
//!
//!     `*` marks a unit of the reporting faction, `-` any other unit. Other units must show
//!     their faction; own units may omit it.
//!
//!     The comma separated part after the faction holds flags first and items last. The
//!     first segment that parses as an item ends the flags; from there on every segment must
//!     be an item.
//!
//!     The entry ends in `. Label: value` clauses. The first known label marks where the
//!     clauses start, so a description containing full stops is left intact. Weight,
//!     capacity, studyable skills and known skills are emitted; the other clauses are
//!     recognised and dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::report::grammar::{Grammar, ItemGrammar, NameGrammar, SkillGrammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::combinators::{attempt, list, one_of};
use crate::report::span::{PResult, ParseFailure, SpanParser};

/// Marker of a unit owned by the reporting faction.
pub const OWN_MARKER: &str = "*";
/// Marker of any other unit.
pub const OTHER_MARKER: &str = "-";

const ON_GUARD: &str = "on guard";

/// Labels of the trailing clauses of a unit entry.
const CLAUSE_LABELS: [&str; 10] = [
    "Weight",
    "Capacity",
    "Can Study",
    "Skills",
    "Upkeep",
    "Combat spell",
    "Ready item",
    "Ready weapon",
    "Ready armor",
    "Visited",
];

static CLAUSE_START: Lazy<Regex> = Lazy::new(|| {
    let labels = CLAUSE_LABELS.join("|");
    Regex::new(&format!(r"(?i)\.\s+(?:{labels}):")).expect("clause regex is valid")
});

/// Parses unit entries. Holds its sub-grammars.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitGrammar {
    name: NameGrammar,
    item: ItemGrammar,
    skill: SkillGrammar,
}

fn weight(input: SpanParser<'_>) -> PResult<'_, (&'static str, Node)> {
    let (weight, p) = input.match_literal("Weight:")?.skip_whitespace().integer()?;
    Ok((("weight", Node::Int(weight)), p))
}

fn capacity(input: SpanParser<'_>) -> PResult<'_, (&'static str, Node)> {
    let p = input.match_literal("Capacity:")?.skip_whitespace();
    let mut builder = ObjectBuilder::new();
    let mut p = p;
    for (index, mode) in ["flying", "riding", "walking", "swimming"].iter().enumerate() {
        if index > 0 {
            p = p.match_literal("/")?;
        }
        let (amount, rest) = p.integer()?;
        builder.insert(mode, amount);
        p = rest;
    }
    Ok((("capacity", builder.build()), p))
}

impl UnitGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    fn skill_list<'a>(
        &self,
        input: SpanParser<'a>,
        label: &str,
        key: &'static str,
    ) -> PResult<'a, (&'static str, Node)> {
        let p = input.match_literal(label)?;
        let (skills, p) = list(p, ",", |s| self.skill.parse(s))?;
        Ok(((key, Node::Array(skills)), p))
    }

    fn clause<'a>(&self, input: SpanParser<'a>) -> PResult<'a, (&'static str, Node)> {
        one_of(
            input,
            &[
                &weight,
                &capacity,
                &|p: SpanParser<'a>| self.skill_list(p, "Can Study:", "canStudy"),
                &|p: SpanParser<'a>| self.skill_list(p, "Skills:", "skills"),
            ],
        )
    }

    /// The head of the entry: marker, name, guard status, faction, flags and items.
    fn head(&self, input: SpanParser<'_>, unit: &mut ObjectBuilder) -> Result<(), ParseFailure> {
        let p = input.skip_whitespace();
        let (own, p) = match p.match_literal(OWN_MARKER) {
            Ok(p) => (true, p),
            Err(_) => (false, p.match_literal(OTHER_MARKER)?),
        };

        let main = p.strip_suffix(".");
        let (main, description) = match main.before(";") {
            Ok((head, rest)) => (head, Some(rest.match_literal(";")?.take_rest().0)),
            Err(_) => (main, None),
        };

        let segments = main.split(",");
        let mut segments = segments.into_iter().peekable();

        let first = segments
            .next()
            .ok_or_else(|| main.failure("expected unit name"))?;
        let ((name, number), rest) = self.name.name_number(first)?;
        rest.expect_end()?;
        unit.insert("own", own);
        unit.insert("name", name);
        unit.insert("number", number);

        let on_guard = segments
            .next_if(|s| s.rest().eq_ignore_ascii_case(ON_GUARD))
            .is_some();
        unit.insert("onGuard", on_guard);

        let faction = match segments.peek() {
            Some(segment) => self.name.parse_all(*segment).ok().map(|(node, _)| node),
            None => None,
        };
        match faction {
            Some(faction) => {
                segments.next();
                unit.insert("faction", faction);
            }
            None if !own => {
                let at = segments.peek().copied().unwrap_or(main);
                return Err(at.failure("expected faction of a foreign unit"));
            }
            None => {}
        }

        if let Some(description) = description.filter(|d| !d.is_empty()) {
            unit.insert("description", description);
        }

        let mut flags = Vec::new();
        let mut items = Vec::new();
        for segment in segments.filter(|s| !s.is_empty()) {
            match attempt(segment, |s| self.item.parse_all(s)) {
                Ok((item, _)) => items.push(item),
                Err((failure, _)) if !items.is_empty() => return Err(failure.context("item")),
                Err(_) => flags.push(Node::str(segment.rest())),
            }
        }
        unit.insert("flags", flags);
        unit.insert("items", items);
        Ok(())
    }

    /// Parse the unit into a builder so callers can attach more fields.
    pub fn builder<'a>(&self, input: SpanParser<'a>) -> PResult<'a, ObjectBuilder> {
        let input = input.trimmed();
        let text = input.rest();
        let (main, clauses) = match CLAUSE_START.find(text) {
            Some(found) => input.split_at(input.position() + found.start()),
            None => input.split_at(input.position() + text.len()),
        };

        let mut unit = ObjectBuilder::new();
        self.head(main, &mut unit)?;

        // Skip the full stop that ends the head.
        let clauses = clauses.match_literal(".").unwrap_or(clauses);
        for clause in clauses.split(". ") {
            let clause = clause.strip_suffix(".");
            if clause.is_empty() {
                continue;
            }
            let parsed = self
                .clause(clause)
                .and_then(|(field, rest)| Ok((field, rest.expect_end()?)));
            match parsed {
                Ok(((key, value), _)) => unit.insert(key, value),
                Err(_) => trace!(clause = clause.rest(), "ignoring unit clause"),
            }
        }
        Ok((unit, input.take_rest().1))
    }
}

impl Grammar for UnitGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let (unit, rest) = self.builder(input)?;
        Ok((unit.build(), rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::grammar::parse_text;
    use serde_json::{json, Value};

    fn unit(text: &str) -> Value {
        Value::from(parse_text(&UnitGrammar::new(), text).unwrap())
    }

    #[test]
    fn test_own_unit_with_clauses() {
        let value = unit(
            "* Scout (1234), Faction (3), avoiding, behind, 10 leaders [LEAD], 1000 silver [SILV]. \
             Weight: 100. Capacity: 0/0/150/0. Skills: combat [COMB] 1 (30), tactics [TACT] 2 (90). \
             Can Study: force [FORC].",
        );
        assert_eq!(
            value,
            json!({
                "own": true,
                "name": "Scout",
                "number": 1234,
                "onGuard": false,
                "faction": {"name": "Faction", "number": 3},
                "flags": ["avoiding", "behind"],
                "items": [
                    {"amount": 10, "name": "leaders", "code": "LEAD"},
                    {"amount": 1000, "name": "silver", "code": "SILV"}
                ],
                "weight": 100,
                "capacity": {"flying": 0, "riding": 0, "walking": 150, "swimming": 0},
                "skills": [
                    {"name": "combat", "code": "COMB", "level": 1, "days": 30},
                    {"name": "tactics", "code": "TACT", "level": 2, "days": 90}
                ],
                "canStudy": [{"name": "force", "code": "FORC"}]
            })
        );
    }

    #[test]
    fn test_guarding_foreign_unit_with_description() {
        let value = unit(
            "- City Guard (22), on guard, The Guardsmen (1), 80 leaders [LEAD], 80 swords [SWOR]; \
             Keepers of the peace.",
        );
        assert_eq!(value["own"], json!(false));
        assert_eq!(value["onGuard"], json!(true));
        assert_eq!(value["faction"], json!({"name": "The Guardsmen", "number": 1}));
        assert_eq!(value["description"], json!("Keepers of the peace"));
        assert_eq!(value["flags"], json!([]));
        assert_eq!(value["items"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_own_unit_may_omit_faction() {
        let value = unit("* Hermit (5), 1 leader [LEAD].");
        assert!(value.get("faction").is_none());
        assert_eq!(value["items"][0]["code"], json!("LEAD"));
    }

    #[test]
    fn test_foreign_unit_requires_faction() {
        assert!(parse_text(&UnitGrammar::new(), "- Stranger (9), 1 leader [LEAD].").is_err());
    }

    #[test]
    fn test_flags_after_items_fail() {
        let err = parse_text(
            &UnitGrammar::new(),
            "* Scout (1), Faction (3), 1 leader [LEAD], avoiding.",
        )
        .unwrap_err();
        assert!(err.message.starts_with("item:"));
    }

    #[test]
    fn test_unknown_clauses_are_dropped() {
        let value = unit(
            "* Scout (1), Faction (3), 1 leader [LEAD]. Upkeep: $20. Skills: none. Weight: 10.",
        );
        assert!(value.get("upkeep").is_none());
        assert_eq!(value["skills"], json!([]));
        assert_eq!(value["weight"], json!(10));
    }

    #[test]
    fn test_description_full_stops_do_not_start_clauses() {
        let value = unit("* Scout (1), Faction (3), 1 leader [LEAD]; Tired. Hungry. Weight: 10.");
        assert_eq!(value["description"], json!("Tired. Hungry"));
        assert_eq!(value["weight"], json!(10));
    }

    #[test]
    fn test_missing_marker() {
        assert!(parse_text(&UnitGrammar::new(), "Scout (1), Faction (3).").is_err());
    }
}
