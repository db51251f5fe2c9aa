//! Parser result and failure types

use thiserror::Error;

use crate::report::span::SpanParser;

/// A field level mismatch: the expected token was not found at `offset`.
///
/// `offset` is a byte offset into the text the parser was created over. Section handlers
/// translate it into a line and column with [Block::locate](crate::report::block::Block::locate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseFailure {
    pub message: String,
    pub offset: usize,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// Prefix the message with the name of the field being parsed.
    pub fn context(mut self, field: &str) -> Self {
        self.message = format!("{field}: {}", self.message);
        self
    }
}

/// Result of a parser operation: the value and the advanced parser, or a failure.
pub type PResult<'a, T> = Result<(T, SpanParser<'a>), ParseFailure>;
