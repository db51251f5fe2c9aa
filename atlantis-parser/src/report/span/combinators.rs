//! Parser combinators
//!
//!     All speculative parsing goes through [attempt]: it runs a parser and, on failure,
//!     hands back the untouched input parser so the caller continues from where it was.
//!     Because [SpanParser] is a value, "rolling back" is just reusing the copy taken before
//!     the attempt. [optional], [one_of] and [list] are built on it.

use crate::report::span::{PResult, ParseFailure, SpanParser};

/// The literal that stands for an empty list in the report format.
pub const NONE_LITERAL: &str = "none";

/// Run `parser`; on failure return the failure together with the unchanged input.
pub fn attempt<'a, T>(
    input: SpanParser<'a>,
    parser: impl FnOnce(SpanParser<'a>) -> PResult<'a, T>,
) -> Result<(T, SpanParser<'a>), (ParseFailure, SpanParser<'a>)> {
    parser(input).map_err(|failure| (failure, input))
}

/// Run `parser`; a failure yields `None` and leaves the input where it was.
pub fn optional<'a, T>(
    input: SpanParser<'a>,
    parser: impl FnOnce(SpanParser<'a>) -> PResult<'a, T>,
) -> (Option<T>, SpanParser<'a>) {
    match attempt(input, parser) {
        Ok((value, next)) => (Some(value), next),
        Err((_, unchanged)) => (None, unchanged),
    }
}

/// Try each parser in order and return the first success. The order is the precedence.
///
/// When every alternative fails, the failure that got furthest into the text is reported.
pub fn one_of<'a, T>(
    input: SpanParser<'a>,
    parsers: &[&dyn Fn(SpanParser<'a>) -> PResult<'a, T>],
) -> PResult<'a, T> {
    let mut furthest: Option<ParseFailure> = None;
    for parser in parsers {
        match attempt(input, parser) {
            Ok(success) => return Ok(success),
            Err((failure, _)) => {
                if furthest
                    .as_ref()
                    .map(|best| failure.offset > best.offset)
                    .unwrap_or(true)
                {
                    furthest = Some(failure);
                }
            }
        }
    }
    Err(furthest.unwrap_or_else(|| input.failure("no alternatives")))
}

/// Match `literal`, then run `parser`.
pub fn preceded<'a, T>(
    input: SpanParser<'a>,
    literal: &str,
    parser: impl FnOnce(SpanParser<'a>) -> PResult<'a, T>,
) -> PResult<'a, T> {
    parser(input.match_literal(literal)?)
}

/// Parse the rest of the input as a `separator` delimited list of `item`s.
///
/// Each segment must be consumed completely by `item`. The literal `none` is the empty
/// list.
pub fn list<'a, T>(
    input: SpanParser<'a>,
    separator: &str,
    item: impl Fn(SpanParser<'a>) -> PResult<'a, T>,
) -> PResult<'a, Vec<T>> {
    let trimmed = input.trimmed();
    if trimmed.rest().eq_ignore_ascii_case(NONE_LITERAL) {
        return Ok((Vec::new(), trimmed.take_rest().1));
    }
    let mut items = Vec::new();
    let mut last = trimmed;
    for segment in trimmed.split(separator) {
        let (value, rest) = item(segment)?;
        last = rest.expect_end()?;
        items.push(value);
    }
    Ok((items, last.take_rest().1))
}
