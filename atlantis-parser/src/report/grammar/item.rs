//! Items: `[amount] name [CODE] [at $price]`
//!
//!     The amount defaults to 1 when missing. Markets with an endless supply print
//!     `unlimited`, which becomes [UNLIMITED_AMOUNT]. The price is emitted only when the
//!     `at $` suffix is present.

use crate::report::grammar::{non_empty, Grammar};
use crate::report::node::{Node, ObjectBuilder};
use crate::report::span::combinators::{one_of, optional};
use crate::report::span::{PResult, SpanParser};

/// Amount recorded for `unlimited` supplies.
pub const UNLIMITED_AMOUNT: i64 = -1;

const UNLIMITED: &str = "unlimited";

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemGrammar;

/// An item or skill code: `[` upper case letters and digits `]`.
pub fn code(input: SpanParser<'_>) -> PResult<'_, &str> {
    let (inner, rest) = input.skip_whitespace().between("[", "]")?;
    let text = inner.rest();
    if text.is_empty()
        || !text
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return Err(inner.failure(format!("'{text}' is not an item code")));
    }
    Ok((text, rest))
}

fn unlimited(input: SpanParser<'_>) -> PResult<'_, i64> {
    let rest = input.match_literal(UNLIMITED)?.match_literal(" ")?;
    Ok((UNLIMITED_AMOUNT, rest))
}

fn count(input: SpanParser<'_>) -> PResult<'_, i64> {
    let (amount, rest) = input.integer()?;
    Ok((amount, rest.match_literal(" ")?))
}

fn price(input: SpanParser<'_>) -> PResult<'_, i64> {
    input
        .skip_whitespace()
        .match_literal("at")?
        .skip_whitespace()
        .match_literal("$")?
        .integer()
}

impl ItemGrammar {
    /// Name and code only, as used by item reports and skill lists.
    pub fn name_code<'a>(&self, input: SpanParser<'a>) -> PResult<'a, (&'a str, &'a str)> {
        let (name, rest) = input.skip_whitespace().before("[")?;
        let name = non_empty(name, "item name")?;
        let (code, rest) = code(rest)?;
        Ok(((name, code), rest))
    }
}

impl Grammar for ItemGrammar {
    fn parse<'a>(&self, input: SpanParser<'a>) -> PResult<'a, Node> {
        let p = input.skip_whitespace();
        let (amount, p) = optional(p, |p| one_of(p, &[&unlimited, &count]));
        let ((name, code), p) = self.name_code(p)?;
        let (price, p) = optional(p, price);

        let node = ObjectBuilder::new()
            .field("amount", amount.unwrap_or(1))
            .field("name", name)
            .field("code", code)
            .maybe("price", price)
            .build();
        Ok((node, p))
    }
}
