//! Field Level Grammar
//!
//!     One parser per fixed-format record of the report: coordinates, items, skills,
//!     `Name (number)` pairs, region headers, unit and structure entries, the faction header
//!     and the turn date. Each implements [Grammar] over a [SpanParser] and produces a
//!     [Node]; parsers that yield several sibling fields (the region header) additionally
//!     expose them as [Fields](crate::report::node::Fields) so callers can splice them into the object they are building.
//!
//!     Grammar parsers are stateless apart from compiled regular expressions. They are built
//!     once and shared through [GRAMMAR]; concurrent conversions read them without locking.
//!
//!     Failures are [ParseFailure]s. Section handlers decide whether a failure is
//!     recoverable (try the next alternative) or a structure violation.

mod coords;
mod faction;
mod item;
mod name;
mod region;
mod skill;
mod structure;
mod unit;

pub use coords::CoordsGrammar;
pub use faction::{DateGrammar, FactionGrammar};
pub use item::{code, ItemGrammar, UNLIMITED_AMOUNT};
pub use name::NameGrammar;
pub use region::RegionHeaderGrammar;
pub use skill::SkillGrammar;
pub use structure::StructureGrammar;
pub use unit::UnitGrammar;

use once_cell::sync::Lazy;

use crate::report::node::Node;
use crate::report::span::{PResult, ParseFailure, SpanParser};

/// A field level parser producing a [Node].
pub trait Grammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node>;

    /// Parse and require that nothing but whitespace is left.
    fn parse_all<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let (node, rest) = self.parse(input)?;
        Ok((node, rest.expect_end()?))
    }
}

/// All record grammars of the report format.
pub struct ReportGrammar {
    pub name: NameGrammar,
    pub coords: CoordsGrammar,
    pub item: ItemGrammar,
    pub skill: SkillGrammar,
    pub region_header: RegionHeaderGrammar,
    pub unit: UnitGrammar,
    pub structure: StructureGrammar,
    pub faction: FactionGrammar,
    pub date: DateGrammar,
}

impl ReportGrammar {
    pub fn new() -> Self {
        Self {
            name: NameGrammar,
            coords: CoordsGrammar,
            item: ItemGrammar,
            skill: SkillGrammar,
            region_header: RegionHeaderGrammar,
            unit: UnitGrammar::new(),
            structure: StructureGrammar,
            faction: FactionGrammar,
            date: DateGrammar,
        }
    }
}

impl Default for ReportGrammar {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared grammar instance.
pub static GRAMMAR: Lazy<ReportGrammar> = Lazy::new(ReportGrammar::new);

/// Parse the whole of `text` with `grammar`.
pub fn parse_text<G: Grammar + ?Sized>(grammar: &G, text: &str) -> Result<Node, ParseFailure> {
    grammar
        .parse_all(SpanParser::new(text))
        .map(|(node, _)| node)
}

/// Trimmed text of a sub-parser, failing when it is empty.
pub(crate) fn non_empty<'a>(part: SpanParser<'a>, what: &str) -> Result<&'a str, ParseFailure> {
    let text = part.rest().trim();
    if text.is_empty() {
        Err(part.failure(format!("expected {what}")))
    } else {
        Ok(text)
    }
}
