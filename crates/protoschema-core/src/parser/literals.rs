//! Leaf matchers: integers, floats, booleans, strings, identifiers, constants
//!
//! Each matcher returns `Ok(None)` when the first characters rule the
//! literal out, and an error once the prefix is recognized but malformed
//! (`0x` with no digits, `12abc`, a string with no closing quote).

use super::source::{is_ident_char, is_ident_start, Source};
use super::Matched;
use crate::error::{ParseError, Result};
use crate::parser::ast::{Constant, Identifier, Quote, StringLiteral};

/// Require a match inside a committed construct
pub(crate) fn expect<'a, T>(matched: Matched<'a, T>, at: Source<'a>, what: &str) -> Result<(T, Source<'a>)> {
    matched?.ok_or_else(|| at.missing(what))
}

// ── Numbers ────────────────────────────────────────────────

fn split_sign(src: Source<'_>) -> (bool, Source<'_>) {
    match src.peek() {
        Some('-') => (true, src.advance(1)),
        Some('+') => (false, src.advance(1)),
        _ => (false, src),
    }
}

/// Signed integer: decimal, `0x` hexadecimal or leading-zero octal
pub fn match_int(src: Source<'_>) -> Matched<'_, i64> {
    let (negative, body) = split_sign(src);
    if !body.peek().is_some_and(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    let (radix, digits_at) = if body.starts_with("0x") || body.starts_with("0X") {
        (16, body.advance(2))
    } else if body.starts_with("0") && body.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
        (8, body.advance(1))
    } else {
        (10, body)
    };
    let (digits, end) = digits_at.take_while(is_ident_char);

    let invalid = || ParseError::InvalidNumber {
        found: end.since(&src).to_string(),
        span: src.span(),
    };
    let magnitude = i128::from_str_radix(digits, radix).map_err(|_| invalid())?;
    let value = if negative { -magnitude } else { magnitude };
    let value = i64::try_from(value).map_err(|_| invalid())?;

    Ok(Some((value, end.trim())))
}

/// Float with a fractional part and/or exponent: `1.5`, `.5`, `5.`, `1e10`
///
/// Plain integers are not floats; the caller falls through to [`match_int`].
pub fn match_float(src: Source<'_>) -> Matched<'_, f64> {
    let (_, body) = split_sign(src);
    let (whole, after_whole) = body.take_while(|c| c.is_ascii_digit());

    let (fraction, after_fraction) = if after_whole.peek() == Some('.') {
        let (digits, rest) = after_whole.advance(1).take_while(|c| c.is_ascii_digit());
        (Some(digits), rest)
    } else {
        (None, after_whole)
    };
    if whole.is_empty() && fraction.map_or(true, str::is_empty) {
        return Ok(None);
    }

    let invalid = |end: Source<'_>| ParseError::InvalidNumber {
        found: end.since(&src).to_string(),
        span: src.span(),
    };

    let mut end = after_fraction;
    let has_exponent = matches!(end.peek(), Some('e' | 'E'));
    if has_exponent {
        let (_, exponent) = split_sign(end.advance(1));
        let (digits, rest) = exponent.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(invalid(rest));
        }
        end = rest;
    }
    if fraction.is_none() && !has_exponent {
        return Ok(None);
    }
    if end.peek().is_some_and(is_ident_char) {
        let (_, junk_end) = end.take_while(is_ident_char);
        return Err(invalid(junk_end));
    }

    let value: f64 = end.since(&src).parse().map_err(|_| invalid(end))?;
    if !value.is_finite() {
        return Err(invalid(end));
    }
    Ok(Some((value, end.trim())))
}

pub fn match_bool(src: Source<'_>) -> Matched<'_, bool> {
    if let Some(rest) = src.keyword("true") {
        return Ok(Some((true, rest)));
    }
    if let Some(rest) = src.keyword("false") {
        return Ok(Some((false, rest)));
    }
    Ok(None)
}

// ── Strings ────────────────────────────────────────────────

/// Single- or double-quoted string; the closing quote must be unescaped
/// and on the same line.
pub fn match_string(src: Source<'_>) -> Matched<'_, StringLiteral> {
    let quote = match src.peek() {
        Some('"') => Quote::Double,
        Some('\'') => Quote::Single,
        _ => return Ok(None),
    };
    let close = quote.as_char();
    let body = src.advance(1).rest();

    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\n' => break,
            c if c == close => {
                let literal = StringLiteral {
                    value: body[..i].to_string(),
                    quote,
                };
                return Ok(Some((literal, src.advance(i + 2).trim())));
            }
            _ => {}
        }
    }
    Err(ParseError::UnterminatedString { span: src.span() })
}

// ── Identifiers ────────────────────────────────────────────

/// End of a bare identifier, untrimmed
fn scan_bare(src: Source<'_>) -> Option<Source<'_>> {
    if !src.peek().is_some_and(is_ident_start) {
        return None;
    }
    Some(src.take_while(is_ident_char).1)
}

/// End of a dotted identifier, untrimmed. A dangling `.` is an error.
fn scan_full(src: Source<'_>) -> Result<Option<Source<'_>>> {
    let Some(mut end) = scan_bare(src) else {
        return Ok(None);
    };
    while end.peek() == Some('.') {
        match scan_bare(end.advance(1)) {
            Some(next) => end = next,
            None => {
                return Err(ParseError::InvalidIdentifier {
                    found: end.advance(1).since(&src).to_string(),
                    span: src.span(),
                })
            }
        }
    }
    Ok(Some(end))
}

/// End of a type reference (optional leading `.`), untrimmed
fn scan_type(src: Source<'_>) -> Result<Option<Source<'_>>> {
    if src.peek() == Some('.') {
        let after = src.advance(1);
        if !after.peek().is_some_and(is_ident_start) {
            return Ok(None);
        }
        return scan_full(after);
    }
    scan_full(src)
}

impl Identifier {
    /// Bare identifier: a letter or `_`, then letters, digits or `_`
    pub fn parse(src: Source<'_>) -> Matched<'_, Identifier> {
        Ok(scan_bare(src).map(|end| (Identifier::new(end.since(&src)), end.trim())))
    }

    /// Dotted identifier such as a package name
    pub fn parse_full(src: Source<'_>) -> Matched<'_, Identifier> {
        Ok(scan_full(src)?.map(|end| (Identifier::new(end.since(&src)), end.trim())))
    }

    /// Enum or message reference, optionally fully qualified with a leading `.`
    pub fn parse_type(src: Source<'_>) -> Matched<'_, Identifier> {
        Ok(scan_type(src)?.map(|end| (Identifier::new(end.since(&src)), end.trim())))
    }

    /// Option name: dotted segments, each a bare identifier or a
    /// parenthesized extension name, e.g. `(foo.bar).baz` or `.a.b`
    pub fn parse_option_name(src: Source<'_>) -> Matched<'_, Identifier> {
        let mut end = if src.peek() == Some('.') {
            src.advance(1)
        } else {
            src
        };
        let mut first = true;
        loop {
            if end.peek() == Some('(') {
                let inner = end.advance(1);
                let Some(close) = scan_type(inner)? else {
                    return Err(ParseError::InvalidIdentifier {
                        found: inner.snippet(),
                        span: inner.span(),
                    });
                };
                if close.peek() != Some(')') {
                    return Err(close.missing("`)` closing extension option name"));
                }
                end = close.advance(1);
            } else if let Some(next) = scan_bare(end) {
                end = next;
            } else if first {
                return Ok(None);
            } else {
                return Err(ParseError::InvalidIdentifier {
                    found: end.since(&src).to_string(),
                    span: src.span(),
                });
            }
            first = false;

            if end.peek() == Some('.') {
                end = end.advance(1);
            } else {
                break;
            }
        }
        Ok(Some((Identifier::new(end.since(&src)), end.trim())))
    }
}

// ── Constants ──────────────────────────────────────────────

/// `inf` or `nan` with an explicit sign. An unsigned one is a plain
/// identifier; `+` is dropped so `+inf` and `inf` compare equal.
fn match_signed_special(src: Source<'_>) -> Option<(Identifier, Source<'_>)> {
    let (negative, body) = split_sign(src);
    if body == src {
        return None;
    }
    ["inf", "nan"].iter().find_map(|word| {
        let rest = body.keyword(word)?;
        let text = if negative {
            format!("-{}", word)
        } else {
            word.to_string()
        };
        Some((Identifier::new(text), rest))
    })
}

/// Option value: string, bool, float, int or identifier, tried in that order
pub fn match_constant(src: Source<'_>) -> Matched<'_, Constant> {
    if let Some((value, rest)) = match_string(src)? {
        return Ok(Some((Constant::Str(value), rest)));
    }
    if let Some((value, rest)) = match_bool(src)? {
        return Ok(Some((Constant::Bool(value), rest)));
    }
    if let Some((value, rest)) = match_float(src)? {
        return Ok(Some((Constant::Float(value), rest)));
    }
    if let Some((value, rest)) = match_int(src)? {
        return Ok(Some((Constant::Int(value), rest)));
    }
    if let Some((value, rest)) = match_signed_special(src) {
        return Ok(Some((Constant::Ident(value), rest)));
    }
    if let Some((value, rest)) = Identifier::parse_type(src)? {
        return Ok(Some((Constant::Ident(value), rest)));
    }
    Ok(None)
}
