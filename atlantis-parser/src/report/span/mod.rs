//! Span Parsing
//!
//!     Field level parsing runs over one block's text with a [SpanParser]: an immutable
//!     slice of text plus a position. The parser is a `Copy` value; every primitive returns
//!     a new parser instead of mutating the old one, so backtracking is simply keeping the
//!     old value around. There is no bookmark stack to unwind.
//!
//!     Primitives return [PResult], which on success carries the parsed value together with
//!     the advanced parser, and on failure a [ParseFailure] with a message and the offset
//!     where the expected token was missing.
//!
//!     Higher level behavior (optional fields, alternatives, separated lists) is built in
//!     [combinators] on top of those two facts.
//!
//!     Searches (`before`, `after`, `between`, literal matches) are ASCII case-insensitive.
//!     Whitespace is never skipped implicitly: callers ask for `skip_whitespace` where the
//!     report format allows it.

pub mod combinators;
mod failure;
mod parser;

pub use failure::{PResult, ParseFailure};
pub use parser::SpanParser;
