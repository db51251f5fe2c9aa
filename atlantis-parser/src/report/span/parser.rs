//! The span parser value type

use std::fmt;

use crate::report::span::{PResult, ParseFailure};

/// Position based parser over a span of text.
///
/// The unread span is `[pos, end)` of `source`. Offsets reported in failures are absolute
/// offsets into `source`, so sub-parsers created by `before` or `between` still report
/// positions relative to the whole block.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SpanParser<'a> {
    source: &'a str,
    end: usize,
    pos: usize,
}

impl<'a> SpanParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            end: source.len(),
            pos: 0,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread part of the span.
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// Build a failure at the current position.
    pub fn failure(&self, message: impl Into<String>) -> ParseFailure {
        ParseFailure::new(message, self.pos)
    }

    fn at(self, pos: usize) -> Self {
        Self { pos, ..self }
    }

    fn narrowed(self, from: usize, to: usize) -> Self {
        Self {
            source: self.source,
            end: to,
            pos: from,
        }
    }

    /// Absolute offset of the first case-insensitive occurrence of `needle` in the unread
    /// text.
    pub fn find(&self, needle: &str) -> Option<usize> {
        find_ignore_case(self.rest(), needle).map(|i| self.pos + i)
    }

    /// Absolute offset of the last case-insensitive occurrence of `needle` in the unread
    /// text.
    pub fn rfind(&self, needle: &str) -> Option<usize> {
        rfind_ignore_case(self.rest(), needle).map(|i| self.pos + i)
    }

    /// Split at the first occurrence of `needle`: the value is a parser over the text before
    /// it, the returned parser is positioned on the needle.
    pub fn before(self, needle: &str) -> PResult<'a, SpanParser<'a>> {
        match self.find(needle) {
            Some(found) => Ok((self.narrowed(self.pos, found), self.at(found))),
            None => Err(self.failure(format!("expected '{needle}'"))),
        }
    }

    /// Move past the first occurrence of `needle`.
    pub fn after(self, needle: &str) -> Result<SpanParser<'a>, ParseFailure> {
        match self.find(needle) {
            Some(found) => Ok(self.at(found + needle.len())),
            None => Err(self.failure(format!("expected '{needle}'"))),
        }
    }

    /// Like [before](Self::before), searching from the end of the span.
    pub fn before_backwards(self, needle: &str) -> PResult<'a, SpanParser<'a>> {
        match self.rfind(needle) {
            Some(found) => Ok((self.narrowed(self.pos, found), self.at(found))),
            None => Err(self.failure(format!("expected '{needle}'"))),
        }
    }

    /// Like [after](Self::after), searching from the end of the span.
    pub fn after_backwards(self, needle: &str) -> Result<SpanParser<'a>, ParseFailure> {
        match self.rfind(needle) {
            Some(found) => Ok(self.at(found + needle.len())),
            None => Err(self.failure(format!("expected '{needle}'"))),
        }
    }

    /// Split the unread text at the absolute offset `at` (clamped to the span). The second
    /// parser starts at `at` and keeps the original end.
    pub fn split_at(self, at: usize) -> (SpanParser<'a>, SpanParser<'a>) {
        let at = at.clamp(self.pos, self.end);
        (self.narrowed(self.pos, at), self.narrowed(at, self.end))
    }

    /// Expect `left` at the current position and return a parser over the text up to the
    /// next `right`. The returned parser is positioned after `right`.
    pub fn between(self, left: &str, right: &str) -> PResult<'a, SpanParser<'a>> {
        let open = self.match_literal(left)?;
        let (inner, close) = open.before(right)?;
        Ok((inner, close.at(close.pos + right.len())))
    }

    /// Expect `literal` (case-insensitive) at the current position.
    pub fn match_literal(self, literal: &str) -> Result<SpanParser<'a>, ParseFailure> {
        let rest = self.rest().as_bytes();
        if rest.len() >= literal.len()
            && rest[..literal.len()].eq_ignore_ascii_case(literal.as_bytes())
        {
            Ok(self.at(self.pos + literal.len()))
        } else {
            Err(self.failure(format!("expected '{literal}'")))
        }
    }

    /// Skip spaces and tabs. Never fails.
    pub fn skip_whitespace(self) -> SpanParser<'a> {
        let skipped = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        self.at(self.pos + skipped)
    }

    /// An optionally signed decimal integer. Leading whitespace is not accepted.
    pub fn integer(self) -> PResult<'a, i64> {
        let bytes = self.rest().as_bytes();
        let sign = match bytes.first() {
            Some(b'+') | Some(b'-') => 1,
            _ => 0,
        };
        let digits = bytes[sign..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            return Err(self.failure("expected integer"));
        }
        let text = &self.rest()[..sign + digits];
        text.parse::<i64>()
            .map(|value| (value, self.at(self.pos + text.len())))
            .map_err(|_| self.failure(format!("integer '{text}' out of range")))
    }

    /// A run of letters, digits, apostrophes, hyphens or underscores.
    pub fn word(self) -> PResult<'a, &'a str> {
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '\'' | '-' | '_')))
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.rest().len());
        if len == 0 {
            return Err(self.failure("expected word"));
        }
        Ok((&self.rest()[..len], self.at(self.pos + len)))
    }

    /// Consume everything that is left, returning it trimmed.
    pub fn take_rest(self) -> (&'a str, SpanParser<'a>) {
        (self.rest().trim(), self.at(self.end))
    }

    /// Succeed only if nothing but whitespace is left.
    pub fn expect_end(self) -> Result<SpanParser<'a>, ParseFailure> {
        let skipped = self.skip_whitespace();
        if skipped.is_empty() {
            Ok(skipped)
        } else {
            Err(skipped.failure(format!("unexpected '{}'", skipped.rest())))
        }
    }

    /// Narrow the unread text to exclude surrounding whitespace.
    pub fn trimmed(self) -> SpanParser<'a> {
        let rest = self.rest();
        let from = self.pos + (rest.len() - rest.trim_start().len());
        let to = self.pos + rest.trim_end().len();
        self.narrowed(from, to.max(from))
    }

    /// Drop a trailing `suffix` (and whitespace before it) from the unread text, if present.
    pub fn strip_suffix(self, suffix: &str) -> SpanParser<'a> {
        let trimmed = self.trimmed();
        let rest = trimmed.rest().as_bytes();
        if rest.len() >= suffix.len()
            && rest[rest.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
        {
            trimmed.narrowed(trimmed.pos, trimmed.end - suffix.len()).trimmed()
        } else {
            trimmed
        }
    }

    /// Split the unread text on every occurrence of `separator`. Segments are trimmed.
    pub fn split(self, separator: &str) -> Vec<SpanParser<'a>> {
        let mut segments = Vec::new();
        let mut cursor = self;
        while let Some(found) = cursor.find(separator) {
            segments.push(cursor.narrowed(cursor.pos, found).trimmed());
            cursor = cursor.at(found + separator.len());
        }
        segments.push(cursor.narrowed(cursor.pos, cursor.end).trimmed());
        segments
    }
}

impl fmt::Debug for SpanParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanParser")
            .field("pos", &self.pos)
            .field("rest", &self.rest())
            .finish()
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let (hay, pat) = (haystack.as_bytes(), needle.as_bytes());
    if pat.is_empty() {
        return Some(0);
    }
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

fn rfind_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let (hay, pat) = (haystack.as_bytes(), needle.as_bytes());
    if pat.is_empty() {
        return Some(hay.len());
    }
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len())
        .rev()
        .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}
