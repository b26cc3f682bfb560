//! Source cursor over the unconsumed suffix of a schema text
//!
//! Every matcher receives a `Source` positioned at the first character of a
//! candidate construct and returns a new `Source` past the consumed prefix.
//! Matchers trim trailing whitespace before returning, so each matcher may
//! assume its input has no leading whitespace.
//!
//! Guarantees:
//! - `Source` is `Copy`: backtracking is just keeping the old value
//! - Positions are derived from the byte offset, so every error can report
//!   line:column without tracking state during the scan
//! - Container nesting is bounded by [`MAX_NESTING_DEPTH`]

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Deepest container nesting accepted before parsing fails
pub const MAX_NESTING_DEPTH: usize = 100;

/// Position in source text for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Remaining input of a parse, together with the full text it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source<'a> {
    full: &'a str,
    offset: usize,
    depth: usize,
}

impl<'a> Source<'a> {
    /// Create a cursor at the start of `text`, skipping leading whitespace
    pub fn new(text: &'a str) -> Self {
        Source {
            full: text,
            offset: 0,
            depth: 0,
        }
        .trim()
    }

    // ── Character helpers ──────────────────────────────────

    /// Unconsumed input
    pub fn rest(&self) -> &'a str {
        &self.full[self.offset..]
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.full.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_ahead(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consume `bytes` bytes; callers only pass lengths of matched prefixes.
    pub fn advance(self, bytes: usize) -> Self {
        Source {
            offset: (self.offset + bytes).min(self.full.len()),
            ..self
        }
    }

    /// Text consumed between `start` and this cursor
    pub fn since(&self, start: &Source<'a>) -> &'a str {
        &self.full[start.offset.min(self.offset)..self.offset]
    }

    /// Skip whitespace. Comments are nodes, so they are not skipped here.
    pub fn trim(self) -> Self {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.advance(rest.len() - trimmed.len())
    }

    /// Consume the longest prefix whose characters satisfy `pred`
    pub fn take_while(self, pred: impl Fn(char) -> bool) -> (&'a str, Self) {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        (&rest[..end], self.advance(end))
    }

    // ── Token helpers ──────────────────────────────────────

    /// Match a keyword at a word boundary; returns the trimmed remainder.
    pub fn keyword(self, word: &str) -> Option<Self> {
        if !self.starts_with(word) {
            return None;
        }
        let after = self.advance(word.len());
        match after.peek() {
            Some(c) if is_ident_char(c) => None,
            _ => Some(after.trim()),
        }
    }

    /// Match a single punctuation character; returns the trimmed remainder.
    pub fn punct(self, c: char) -> Option<Self> {
        if self.peek() == Some(c) {
            Some(self.advance(c.len_utf8()).trim())
        } else {
            None
        }
    }

    /// Require a punctuation character inside a committed construct
    pub fn expect_punct(self, c: char, what: &str) -> Result<Self> {
        match self.punct(c) {
            Some(next) => Ok(next),
            None => Err(self.missing(&format!("`{}` {}", c, what))),
        }
    }

    /// Require a keyword inside a committed construct
    pub fn expect_keyword(self, word: &str, what: &str) -> Result<Self> {
        match self.keyword(word) {
            Some(next) => Ok(next),
            None => Err(self.missing(&format!("`{}` {}", word, what))),
        }
    }

    // ── Nesting ────────────────────────────────────────────

    /// Current container depth; zero at file scope
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Step into a container body
    pub fn enter(self) -> Result<Self> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span: self.span(),
            });
        }
        Ok(Source {
            depth: self.depth + 1,
            ..self
        })
    }

    /// Step back out of a container body
    pub fn leave(self) -> Self {
        Source {
            depth: self.depth.saturating_sub(1),
            ..self
        }
    }

    // ── Error reporting ────────────────────────────────────

    /// Current position as line:column
    pub fn span(&self) -> Span {
        let consumed = &self.full[..self.offset];
        let line = consumed.matches('\n').count() + 1;
        let line_start = consumed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = consumed[line_start..].chars().count() + 1;
        Span {
            line,
            column,
            offset: self.offset,
        }
    }

    /// Short excerpt of the upcoming input for error messages
    pub fn snippet(&self) -> String {
        let line = self.rest().lines().next().unwrap_or("");
        line.chars().take(32).collect()
    }

    /// Build the error for a missing required token at this position
    pub fn missing(&self, expected: &str) -> ParseError {
        if self.is_empty() {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: self.span(),
            }
        } else {
            ParseError::MissingToken {
                expected: expected.to_string(),
                found: self.snippet(),
                span: self.span(),
            }
        }
    }
}

/// Characters allowed after the first character of an identifier
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Characters allowed as the first character of an identifier
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_skips_leading_whitespace() {
        let src = Source::new("  \n\t message");
        assert_eq!(src.rest(), "message");
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        assert!(Source::new("message Foo").keyword("message").is_some());
        assert!(Source::new("message{").keyword("message").is_some());
        assert!(Source::new("messages").keyword("message").is_none());
        assert!(Source::new("message_type").keyword("message").is_none());
    }

    #[test]
    fn test_keyword_trims_trailing_whitespace() {
        let src = Source::new("map  <int32").keyword("map").unwrap();
        assert_eq!(src.rest(), "<int32");
    }

    #[test]
    fn test_punct_and_expect_punct() {
        let src = Source::new("; next");
        assert_eq!(src.punct(';').unwrap().rest(), "next");
        assert!(src.punct('{').is_none());

        let err = src.expect_punct('{', "opening message body").unwrap_err();
        assert!(matches!(err, ParseError::MissingToken { .. }));
    }

    #[test]
    fn test_missing_at_end_is_unexpected_eof() {
        let src = Source::new("");
        let err = src.expect_punct(';', "ending statement").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_span_tracking() {
        let text = "syntax = \"proto3\";\n\nmessage Foo {\n  int32 a = 1;\n}";
        let src = Source::new(text);
        assert_eq!(src.span(), Span { line: 1, column: 1, offset: 0 });

        let at_field = src.advance(text.find("int32").unwrap());
        assert_eq!(at_field.span(), Span { line: 4, column: 3, offset: 36 });
    }

    #[test]
    fn test_enter_and_leave_track_depth() {
        let src = Source::new("message A {}");
        let inner = src.enter().unwrap().enter().unwrap();
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.advance(3).depth(), 2);
        assert_eq!(inner.leave().depth(), 1);
        assert_eq!(src.leave().depth(), 0);
    }

    #[test]
    fn test_enter_fails_past_limit() {
        let mut src = Source::new("message A {}");
        for _ in 0..MAX_NESTING_DEPTH {
            src = src.enter().unwrap();
        }
        let err = src.enter().unwrap_err();
        assert_eq!(
            err,
            ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span: Span { line: 1, column: 1, offset: 0 },
            }
        );
    }

    #[test]
    fn test_take_while() {
        let (digits, rest) = Source::new("1234 to").take_while(|c| c.is_ascii_digit());
        assert_eq!(digits, "1234");
        assert_eq!(rest.rest(), " to");
    }

    #[test]
    fn test_snippet_stops_at_line_end() {
        let src = Source::new("bogus thing;\nmessage Foo {}");
        assert_eq!(src.snippet(), "bogus thing;");
    }
}
