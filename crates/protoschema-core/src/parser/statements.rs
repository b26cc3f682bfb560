//! Statement matchers: everything that is not a brace-delimited container
//!
//! A matcher commits once it has seen its leading keyword (or, for fields
//! and enum values, enough tokens to rule out every sibling). Before that
//! point it returns `Ok(None)`; after it, any deviation is an error.

use tracing::trace;

use super::literals::{expect, match_constant, match_int, match_string};
use super::source::Source;
use super::Matched;
use crate::error::{ParseError, Result};
use crate::parser::ast::*;

// ── Ranges and reserved ────────────────────────────────────

/// `N`, `N to M` or `N to max`
pub fn match_range(src: Source<'_>) -> Matched<'_, Range> {
    let Some((min, rest)) = match_int(src)? else {
        return Ok(None);
    };
    let Some(after_to) = rest.keyword("to") else {
        return Ok(Some((Range::single(min), rest)));
    };
    if let Some(after_max) = after_to.keyword("max") {
        let range = Range::new(min, Some(RangeMax::Max)).map_err(|e| e.with_span(src.span()))?;
        return Ok(Some((range, after_max)));
    }
    let (max, rest) = expect(match_int(after_to), after_to, "integer or `max` after `to`")?;
    let range = Range::new(min, Some(RangeMax::Value(max))).map_err(|e| e.with_span(src.span()))?;
    Ok(Some((range, rest)))
}

/// Comma-separated, non-empty list of ranges
fn expect_range_list<'a>(src: Source<'a>, what: &str) -> Result<(Vec<Range>, Source<'a>)> {
    let mut ranges = Vec::new();
    let mut cur = src;
    loop {
        let (range, rest) = expect(match_range(cur), cur, what)?;
        ranges.push(range);
        match rest.punct(',') {
            Some(next) => cur = next,
            None => return Ok((ranges, rest)),
        }
    }
}

/// `reserved 1, 2, 5 to max;` or `reserved "a", 'b';`
///
/// The first entry decides which form applies to the whole statement.
pub fn match_reserved(src: Source<'_>) -> Matched<'_, Reserved> {
    let Some(body) = src.keyword("reserved") else {
        return Ok(None);
    };
    let mixed = |at: Source<'_>| ParseError::InvalidReserved {
        reason: "cannot mix field numbers and field names".to_string(),
        span: Some(at.span()),
    };

    let (reserved, rest) = if matches!(body.peek(), Some('"' | '\'')) {
        let mut fields = Vec::new();
        let mut cur = body;
        loop {
            if match_int(cur)?.is_some() {
                return Err(mixed(cur));
            }
            let (name, rest) = expect(match_string(cur), cur, "quoted field name")?;
            fields.push(name);
            match rest.punct(',') {
                Some(next) => cur = next,
                None => break (Reserved::from_fields(fields), rest),
            }
        }
    } else if match_int(body)?.is_some() {
        let mut ranges = Vec::new();
        let mut cur = body;
        loop {
            if match_string(cur)?.is_some() {
                return Err(mixed(cur));
            }
            let (range, rest) = expect(match_range(cur), cur, "field number or range")?;
            ranges.push(range);
            match rest.punct(',') {
                Some(next) => cur = next,
                None => break (Reserved::from_ranges(ranges), rest),
            }
        }
    } else {
        return Err(ParseError::InvalidReserved {
            reason: "expected field numbers, ranges or quoted field names".to_string(),
            span: Some(body.span()),
        });
    };

    let reserved = reserved.map_err(|e| e.with_span(src.span()))?;
    let rest = rest.expect_punct(';', "ending reserved statement")?;
    Ok(Some((reserved, rest)))
}

/// `extensions 100 to 199, 500 to max;`
pub fn match_extensions(src: Source<'_>) -> Matched<'_, Extensions> {
    let Some(body) = src.keyword("extensions") else {
        return Ok(None);
    };
    let (ranges, rest) = expect_range_list(body, "extension range")?;
    let rest = rest.expect_punct(';', "ending extensions statement")?;
    Ok(Some((Extensions { ranges }, rest)))
}

// ── Options ────────────────────────────────────────────────

fn expect_assignment<'a>(src: Source<'a>) -> Result<(ProtoOption, Source<'a>)> {
    let (name, rest) = expect(Identifier::parse_option_name(src), src, "option name")?;
    let rest = rest.expect_punct('=', "after option name")?;
    let (value, rest) = expect(match_constant(rest), rest, "option value")?;
    Ok((ProtoOption { name, value }, rest))
}

/// `option name = constant;`
pub fn match_option(src: Source<'_>) -> Matched<'_, ProtoOption> {
    let Some(body) = src.keyword("option") else {
        return Ok(None);
    };
    let (option, rest) = expect_assignment(body)?;
    let rest = rest.expect_punct(';', "ending option statement")?;
    Ok(Some((option, rest)))
}

/// Optional bracketed list `[ a = 1, (b).c = "d" ]` after a field or enum value
pub fn match_option_list(src: Source<'_>) -> Result<(Vec<ProtoOption>, Source<'_>)> {
    let Some(mut cur) = src.punct('[') else {
        return Ok((Vec::new(), src));
    };
    let mut options = Vec::new();
    loop {
        let (option, rest) = expect_assignment(cur)?;
        options.push(option);
        if let Some(next) = rest.punct(',') {
            cur = next;
            continue;
        }
        let rest = rest.expect_punct(']', "closing option list")?;
        return Ok((options, rest));
    }
}

// ── Comments ───────────────────────────────────────────────

/// `// text` to end of line, or `/* text */`
pub fn match_comment(src: Source<'_>) -> Matched<'_, Comment> {
    if src.starts_with("//") {
        let (line, rest) = src.advance(2).take_while(|c| c != '\n');
        let text = line.strip_suffix('\r').unwrap_or(line);
        return Ok(Some((Comment::single_line(text), rest.trim())));
    }
    if src.starts_with("/*") {
        let body = src.advance(2);
        let Some(end) = body.rest().find("*/") else {
            return Err(ParseError::UnterminatedComment { span: src.span() });
        };
        let text = &body.rest()[..end];
        return Ok(Some((Comment::multi_line(text), body.advance(end + 2).trim())));
    }
    Ok(None)
}

// ── File-level statements ──────────────────────────────────

/// `syntax = "proto3";`
pub fn match_syntax(src: Source<'_>) -> Matched<'_, Syntax> {
    let Some(body) = src.keyword("syntax") else {
        return Ok(None);
    };
    let rest = body.expect_punct('=', "after `syntax`")?;
    let (value, after) = expect(match_string(rest), rest, "syntax string")?;
    if value.value != "proto3" {
        return Err(ParseError::InvalidSyntax {
            found: value.value,
            span: rest.span(),
        });
    }
    let after = after.expect_punct(';', "ending syntax statement")?;
    Ok(Some((Syntax { value }, after)))
}

/// `package foo.bar;`
pub fn match_package(src: Source<'_>) -> Matched<'_, Package> {
    let Some(body) = src.keyword("package") else {
        return Ok(None);
    };
    let (name, rest) = expect(Identifier::parse_full(body), body, "package name")?;
    let rest = rest.expect_punct(';', "ending package statement")?;
    Ok(Some((Package { name }, rest)))
}

/// `import [public|weak] "path";`
pub fn match_import(src: Source<'_>) -> Matched<'_, Import> {
    let Some(body) = src.keyword("import") else {
        return Ok(None);
    };
    let (modifier, body) = if let Some(rest) = body.keyword("public") {
        (Some(ImportModifier::Public), rest)
    } else if let Some(rest) = body.keyword("weak") {
        (Some(ImportModifier::Weak), rest)
    } else {
        (None, body)
    };
    let (path, rest) = expect(match_string(body), body, "import path")?;
    let rest = rest.expect_punct(';', "ending import statement")?;
    Ok(Some((Import { path, modifier }, rest)))
}

// ── Fields ─────────────────────────────────────────────────

/// Scalar keyword or enum/message reference
pub fn match_field_type(src: Source<'_>) -> Matched<'_, FieldType> {
    let Some((ident, rest)) = Identifier::parse_type(src)? else {
        return Ok(None);
    };
    let field_type = FieldType::scalar(ident.as_str()).unwrap_or(FieldType::EnumOrMessage(ident));
    Ok(Some((field_type, rest)))
}

/// `[repeated|optional] type name = N [options];`
///
/// Without a label the matcher commits only once it has seen `type name =`.
pub fn match_field(src: Source<'_>) -> Matched<'_, MessageField> {
    let (label, body) = if let Some(rest) = src.keyword("repeated") {
        (FieldLabel::Repeated, rest)
    } else if let Some(rest) = src.keyword("optional") {
        (FieldLabel::Optional, rest)
    } else {
        (FieldLabel::Implicit, src)
    };
    let committed = label != FieldLabel::Implicit;

    let Some((field_type, rest)) = match_field_type(body)? else {
        return if committed {
            Err(body.missing("field type"))
        } else {
            Ok(None)
        };
    };
    let Some((name, rest)) = Identifier::parse(rest)? else {
        return if committed {
            Err(rest.missing("field name"))
        } else {
            Ok(None)
        };
    };
    let Some(rest) = rest.punct('=') else {
        return if committed {
            Err(rest.missing("`=` after field name"))
        } else {
            Ok(None)
        };
    };

    let (number, rest) = expect(match_int(rest), rest, "field number")?;
    let (options, rest) = match_option_list(rest)?;
    let rest = rest.expect_punct(';', "ending field declaration")?;
    Ok(Some((
        MessageField {
            label,
            field_type,
            name,
            number,
            options,
        },
        rest,
    )))
}

/// `map<key, value> name = N [options];`
pub fn match_map(src: Source<'_>) -> Matched<'_, Map> {
    let Some(body) = src.keyword("map") else {
        return Ok(None);
    };
    // A message type named `map` is a plain field.
    let Some(rest) = body.punct('<') else {
        return Ok(None);
    };

    let (key, after_key) = expect(Identifier::parse(rest), rest, "map key type")?;
    let key_type = MapKeyType::from_keyword(key.as_str())
        .ok_or_else(|| rest.missing("integral, bool or string map key type"))?;
    let rest = after_key.expect_punct(',', "between map key and value types")?;
    let (value_type, rest) = expect(match_field_type(rest), rest, "map value type")?;
    let rest = rest.expect_punct('>', "closing map type")?;
    let (name, rest) = expect(Identifier::parse(rest), rest, "map field name")?;
    let rest = rest.expect_punct('=', "after map field name")?;
    let (number, rest) = expect(match_int(rest), rest, "map field number")?;
    let (options, rest) = match_option_list(rest)?;
    let rest = rest.expect_punct(';', "ending map field")?;

    Ok(Some((
        Map {
            key_type,
            value_type,
            name,
            number,
            options,
        },
        rest,
    )))
}

/// `NAME = N [options];` inside an enum
pub fn match_enum_value(src: Source<'_>) -> Matched<'_, EnumValue> {
    let Some((name, rest)) = Identifier::parse(src)? else {
        return Ok(None);
    };
    let Some(rest) = rest.punct('=') else {
        return Ok(None);
    };
    let (number, rest) = expect(match_int(rest), rest, "enum value number")?;
    let (options, rest) = match_option_list(rest)?;
    let rest = rest.expect_punct(';', "ending enum value")?;
    Ok(Some((
        EnumValue {
            name,
            number,
            options,
        },
        rest,
    )))
}

// ── Services ───────────────────────────────────────────────

/// Parenthesized request/response clause contents
///
/// `stream` is the streaming keyword only when another type name follows it;
/// otherwise it is itself the type name.
fn expect_rpc_type<'a>(src: Source<'a>, what: &str) -> Result<(RpcType, Source<'a>)> {
    if src.keyword("stream").is_some() && src.peek_ahead(6).is_some_and(char::is_whitespace) {
        let after = src.advance(6).trim();
        if let Some((type_name, rest)) = Identifier::parse_type(after)? {
            return Ok((
                RpcType {
                    stream: true,
                    type_name,
                },
                rest,
            ));
        }
    }
    let (type_name, rest) = expect(Identifier::parse_type(src), src, what)?;
    Ok((
        RpcType {
            stream: false,
            type_name,
        },
        rest,
    ))
}

/// `rpc Name (Req) returns (Resp);` or with a `{ option ...; }` block.
/// Comments inside the block are skipped.
pub fn match_rpc(src: Source<'_>) -> Matched<'_, Rpc> {
    let Some(body) = src.keyword("rpc") else {
        return Ok(None);
    };
    let (name, rest) = expect(Identifier::parse(body), body, "rpc name")?;

    let rest = rest.expect_punct('(', "opening rpc request")?;
    let (request, rest) = expect_rpc_type(rest, "rpc request type")?;
    let rest = rest.expect_punct(')', "closing rpc request")?;
    let rest = rest.expect_keyword("returns", "after rpc request")?;
    let rest = rest.expect_punct('(', "opening rpc response")?;
    let (response, rest) = expect_rpc_type(rest, "rpc response type")?;
    let rest = rest.expect_punct(')', "closing rpc response")?;

    let mut options = Vec::new();
    let rest = if let Some(mut cur) = rest.punct('{') {
        loop {
            if let Some(next) = cur.punct(';') {
                cur = next;
            } else if let Some(next) = cur.punct('}') {
                break next;
            } else if let Some((comment, next)) = match_comment(cur)? {
                trace!(rpc = %name, text = %comment.text, "dropping comment inside rpc options");
                cur = next;
            } else if let Some((option, next)) = match_option(cur)? {
                options.push(option);
                cur = next;
            } else if cur.is_empty() {
                return Err(cur.missing("`}` closing rpc options"));
            } else {
                return Err(ParseError::UnrecognizedConstruct {
                    context: format!("rpc {}", name),
                    found: cur.snippet(),
                    span: cur.span(),
                });
            }
        }
    } else {
        rest.expect_punct(';', "ending rpc declaration")?
    };

    Ok(Some((
        Rpc {
            name,
            request,
            response,
            options,
        },
        rest,
    )))
}
