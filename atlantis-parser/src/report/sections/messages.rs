//! Errors and events during the turn
//!
//! Both sections are a header followed by one message per block, up to the next blank line.
//! Messages are kept as text.

use tracing::debug;

use crate::report::error::ConvertError;
use crate::report::node::{Node, ObjectBuilder};
use crate::report::sections::{
    current, current_starts_with, next_adjacent, BlockCursor, Section, SectionHandler,
};

/// A header followed by free text messages.
pub struct MessagesSection {
    section: Section,
    header: &'static str,
    key: &'static str,
}

pub static ERRORS: MessagesSection = MessagesSection {
    section: Section::Errors,
    header: "Errors during turn:",
    key: "errors",
};

pub static EVENTS: MessagesSection = MessagesSection {
    section: Section::Events,
    header: "Events during turn:",
    key: "events",
};

impl SectionHandler for MessagesSection {
    fn section(&self) -> Section {
        self.section
    }

    fn can_parse(&self, cursor: &mut BlockCursor<'_>) -> Result<bool, ConvertError> {
        Ok(current_starts_with(cursor, self.header))
    }

    fn parse(
        &self,
        cursor: &mut BlockCursor<'_>,
        output: &mut ObjectBuilder,
    ) -> Result<(), ConvertError> {
        let mut previous = current(cursor, self.section)?;
        let mut messages = Vec::new();
        while let Some(block) = next_adjacent(cursor, &previous)? {
            messages.push(Node::str(block.text()));
            previous = block;
        }
        debug!(section = %self.section, messages = messages.len(), "parsed messages");
        output.insert(self.key, messages);
        Ok(())
    }
}
