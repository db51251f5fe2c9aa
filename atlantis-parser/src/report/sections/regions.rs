//! Regions
//!
//!     forest (50,22) in Mapa, contains Sembury [village], 5866 peasants
//!       (high elves), $2698.
//!     ------------------------------------------------------------
//!       The weather was clear last month; it will be clear next month.
//!       Wages: $13.3 (Max: $541).
//!
//!     Exits:
//!       North : ocean (50,20) in Atlantis Ocean.
//!
//!     There is a Gate here (Gate 3 of 50).
//!
//!     * Scout (1234), Faction (3), 10 leaders [LEAD].
//!     + Shaft [1] : Shaft, contains an inner location.
//!       - Miner (33), Diggers (4), 2 leaders [LEAD].
//!
//!     A region starts at a header block followed by a dashed separator. The lines under the
//!     separator (and any later indented paragraph) are the region's `props`; the `Exits:`
//!     block is kept as `exits`. Unit blocks go to the region's `units`, except indented unit
//!     blocks right under a structure, which go to that structure's `units`.
//!
//!     The region ends at the first block that is none of the above. If that block is itself
//!     followed by a separator it is the next region's header and parsing continues with it;
//!     otherwise the cursor steps back and the dispatcher takes over.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::report::block::Block;
use crate::report::error::ConvertError;
use crate::report::grammar::{Grammar, GRAMMAR};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{
    current, expect_next, next, violation, BlockCursor, Section, SectionHandler,
};
use crate::report::segmenting::{STRUCTURE_MARKER, UNIT_MARKERS};
use crate::report::span::SpanParser;

const EXITS: &str = "Exits:";

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-{5,}\s*$").expect("separator regex is valid"));

static GATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^There is a Gate here \(Gate (\d+) of (\d+)\)\.?$").expect("gate regex is valid")
});

pub struct RegionsSection;

/// True when the block is the dashed line under a region header.
fn is_separator(block: &Block) -> bool {
    block
        .lines()
        .first()
        .map(|line| SEPARATOR.is_match(line))
        .unwrap_or(false)
}

fn is_unit(block: &Block) -> bool {
    block
        .text()
        .chars()
        .next()
        .map(|c| UNIT_MARKERS.contains(&c))
        .unwrap_or(false)
        && !is_separator(block)
}

fn is_structure(block: &Block) -> bool {
    block.text().starts_with(STRUCTURE_MARKER)
}

/// Trimmed, non-empty lines.
fn verbatim<'a>(lines: impl Iterator<Item = &'a String>) -> Vec<String> {
    lines
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn gate(block: &Block) -> Option<Node> {
    let captures = GATE.captures(block.text())?;
    let number = captures.get(1)?.as_str().parse::<i64>().ok()?;
    let total = captures.get(2)?.as_str().parse::<i64>().ok()?;
    Some(
        ObjectBuilder::new()
            .field("number", number)
            .field("total", total)
            .build(),
    )
}

/// How a region's interior ended.
enum RegionEnd {
    /// The cursor is on the header of another region.
    NextRegion,
    /// The cursor is on the region's last block.
    Done,
}

impl RegionsSection {
    fn parse_unit(&self, block: &Block) -> Result<Node, ConvertError> {
        GRAMMAR
            .unit
            .parse_all(SpanParser::new(block.text()))
            .map(|(unit, _)| unit)
            .map_err(|f| violation(Section::Regions, block, f))
    }

    fn parse_region(&self, cursor: &mut BlockCursor<'_>) -> Result<(Node, RegionEnd), ConvertError> {
        let section = Section::Regions;
        let header = current(cursor, section)?;
        let (fields, _) = GRAMMAR
            .region_header
            .fields(SpanParser::new(header.text()))
            .map_err(|f| violation(section, &header, f))?;

        let separator = expect_next(cursor, section, &header)?;
        let mut props = verbatim(separator.lines().iter().skip(1));
        let mut exits = Vec::new();
        let mut gate_node = None;
        let mut units = Vec::new();
        let mut structures: Vec<ObjectBuilder> = Vec::new();
        let mut end = RegionEnd::Done;

        while let Some(block) = next(cursor)? {
            if block.starts_with(EXITS) {
                exits = verbatim(block.lines().iter().skip(1));
            } else if let Some(node) = gate(&block) {
                gate_node = Some(node);
            } else if is_unit(&block) {
                let unit = self.parse_unit(&block)?;
                match structures.last_mut() {
                    Some(structure) if block.is_indented() => {
                        structure.array_mut("units").push(unit)
                    }
                    _ => units.push(unit),
                }
            } else if is_structure(&block) {
                let (structure, _) = GRAMMAR
                    .structure
                    .builder(SpanParser::new(block.text()))
                    .map_err(|f| violation(section, &block, f))?;
                structures.push(structure.field("units", Vec::<Node>::new()));
            } else if block.is_indented() {
                trace!(line = block.start_line(), "region info");
                props.extend(verbatim(block.lines().iter()));
            } else {
                if cursor.peek()?.map(is_separator).unwrap_or(false) {
                    end = RegionEnd::NextRegion;
                } else {
                    cursor.back();
                }
                break;
            }
        }

        debug!(
            line = header.start_line(),
            units = units.len(),
            structures = structures.len(),
            "parsed region"
        );
        let region = ObjectBuilder::new()
            .splice(fields)
            .field("props", props.join("\n"))
            .field("exits", exits.join("\n"))
            .maybe("gate", gate_node)
            .field("units", units)
            .field(
                "structures",
                structures
                    .into_iter()
                    .map(ObjectBuilder::build)
                    .collect::<Vec<_>>(),
            )
            .build();
        Ok((region, end))
    }
}

impl SectionHandler for RegionsSection {
    fn section(&self) -> Section {
        Section::Regions
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        match cursor.current() {
            Some(block) if !is_separator(block) => {}
            _ => return Ok(false),
        }
        Ok(cursor.peek()?.map(is_separator).unwrap_or(false))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let mut parsed = Vec::new();
        loop {
            let (region, end) = self.parse_region(cursor)?;
            parsed.push(region);
            if let RegionEnd::Done = end {
                break;
            }
        }
        debug!(regions = parsed.len(), "parsed regions");
        output.array_mut("regions").extend(parsed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::report::testing::convert_fragment;
    use serde_json::json;

    const REGION: &str = "\
forest (50,22) in Mapa, contains Sembury [village], 5866 peasants
  (high elves), $2698.
------------------------------------------------------------
  The weather was clear last month; it will be clear next month.
  Wages: $13.3 (Max: $541).

Exits:
  North : ocean (50,20) in Atlantis Ocean.
  South : plain (50,24) in Mapa.

There is a Gate here (Gate 3 of 50).

* Scout (1234), Faction (3), avoiding, 10 leaders [LEAD]. Weight: 100.
- City Guard (22), on guard, The Guardsmen (1), 80 leaders [LEAD], 80
  swords [SWOR].

+ Shaft [1] : Shaft, contains an inner location.
  - Miner (33), Diggers (4), 2 leaders [LEAD].

- Trader (40), Merchants (5), 1 leader [LEAD].
";

    #[test]
    fn test_region_shape() {
        let value = convert_fragment(REGION).unwrap();
        let regions = value["regions"].as_array().unwrap();
        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert_eq!(region["terrain"], json!("forest"));
        assert_eq!(region["coords"], json!({"x": 50, "y": 22}));
        assert_eq!(region["tax"], json!(2698));
        assert_eq!(
            region["props"],
            json!("The weather was clear last month; it will be clear next month.\nWages: $13.3 (Max: $541).")
        );
        assert_eq!(
            region["exits"],
            json!("North : ocean (50,20) in Atlantis Ocean.\nSouth : plain (50,24) in Mapa.")
        );
        assert_eq!(region["gate"], json!({"number": 3, "total": 50}));

        let names: Vec<_> = region["units"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Scout", "City Guard", "Trader"]);

        let structures = region["structures"].as_array().unwrap();
        assert_eq!(structures.len(), 1);
        assert_eq!(structures[0]["name"], json!("Shaft"));
        assert_eq!(structures[0]["units"][0]["name"], json!("Miner"));
        assert_eq!(structures[0]["units"][0]["faction"]["number"], json!(4));
    }

    #[test]
    fn test_consecutive_regions() {
        let source = "\
plain (1,1) in Thornton.
------------------------------------------------------------
  Wages: $10.

ocean (1,3) in Atlantis Ocean.
------------------------------------------------------------
  Wages: $0.

Orders Template (Long Format):

#atlantis 3

#end
";
        let value = convert_fragment(source).unwrap();
        let regions = value["regions"].as_array().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1]["terrain"], json!("ocean"));
        assert_eq!(regions[1]["units"], json!([]));
        assert_eq!(value["ordersTemplate"]["faction"], json!(3));
    }

    #[test]
    fn test_bad_unit_is_a_violation_with_its_line() {
        let source = "\
plain (1,1) in Thornton.
------------------------------------------------------------

- Stranger (9), 1 leader [LEAD].
";
        let err = convert_fragment(source).unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(4));
        assert!(err.to_string().starts_with("regions:"));
    }

    #[test]
    fn test_text_above_a_separator_must_be_a_region_header() {
        let err = convert_fragment("Some note\n-----\n").unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(1));
    }
}
