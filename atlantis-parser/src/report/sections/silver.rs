//! `Unclaimed silver: 5000.`

use tracing::debug;

use crate::report::error::ConvertError;
use crate::report::node::ObjectBuilder;
use crate::report::sections::{
    current, current_starts_with, violation, BlockCursor, Section, SectionHandler,
};
use crate::report::span::SpanParser;

const HEADER: &str = "Unclaimed silver:";

pub struct UnclaimedSilverSection;

impl SectionHandler for UnclaimedSilverSection {
    fn section(&self) -> Section {
        Section::UnclaimedSilver
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
        let block = current(cursor, section)?;
        let amount = SpanParser::new(block.text())
            .match_literal(HEADER)
            .map(|p| p.strip_suffix("."))
            .and_then(|p| p.integer())
            .and_then(|(amount, rest)| rest.expect_end().map(|_| amount))
            .map_err(|f| violation(section, &block, f))?;
        debug!(amount, "parsed unclaimed silver");
        output.insert("unclaimedSilver", amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::report::testing::convert_fragment;
    use serde_json::json;

    #[test]
    fn test_unclaimed_silver() {
        let value = convert_fragment("Unclaimed silver: 5000.\n").unwrap();
        assert_eq!(value, json!({"unclaimedSilver": 5000}));
    }

    #[test]
    fn test_non_numeric_amount() {
        let err = convert_fragment("Unclaimed silver: plenty.\n").unwrap_err();
        assert_eq!(err.location().map(|l| (l.line, l.column)), Some((1, 19)));
    }
}
