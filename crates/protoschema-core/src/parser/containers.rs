//! Brace-delimited containers and the file aggregate
//!
//! Every container is parsed by the same loop ([`parse_body`]): match a
//! header, then repeatedly skip empty statements or parse one permitted
//! child until the terminator. Only the header grammar and the final
//! construction differ per container.

use tracing::trace;

use super::literals::expect;
use super::source::Source;
use super::{match_node, Matched};
use crate::error::{ParseError, Result};
use crate::parser::ast::*;

/// What ends a container body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// A closing `}`
    Brace,
    /// End of input (file scope)
    End,
}

/// Run the container loop over `src`, handing each parsed child and the
/// cursor it started at to `accept`. Returns the source after the
/// terminator.
///
/// Line and column are only computed when an error is built; doing it per
/// child would rescan the consumed prefix every time.
pub fn parse_body<'a>(
    src: Source<'a>,
    context: &str,
    permitted: &[NodeKind],
    terminator: Terminator,
    mut accept: impl FnMut(Node, Source<'a>) -> Result<()>,
) -> Result<Source<'a>> {
    let mut cur = src;
    loop {
        if let Some(next) = cur.punct(';') {
            cur = next;
            continue;
        }
        match terminator {
            Terminator::Brace => {
                if let Some(next) = cur.punct('}') {
                    return Ok(next);
                }
                if cur.is_empty() {
                    return Err(cur.missing(&format!("`}}` closing {}", context)));
                }
            }
            Terminator::End => {
                if cur.is_empty() {
                    return Ok(cur);
                }
            }
        }

        match match_node(cur, permitted)? {
            Some((node, next)) => {
                accept(node, cur)?;
                cur = next;
            }
            None => {
                return Err(ParseError::UnrecognizedConstruct {
                    context: context.to_string(),
                    found: cur.snippet(),
                    span: cur.span(),
                })
            }
        }
    }
}

/// A brace-delimited construct built from a header and a child list
pub trait Container: Sized {
    type Header;

    const KIND: NodeKind;

    /// Match `keyword Name {`; `Ok(None)` if the keyword is absent or is
    /// really the type of a field (`message msg = 1;`)
    fn match_header(src: Source<'_>) -> Matched<'_, Self::Header>;

    /// Label used in error messages, e.g. `message Foo`
    fn describe(header: &Self::Header) -> String;

    fn construct(header: Self::Header, nodes: Vec<Node>) -> Self;
}

/// Parse a complete container: header, body and closing brace
///
/// # Errors
/// `NestingTooDeep` once containers nest past the depth limit.
pub fn match_container<C: Container>(src: Source<'_>) -> Matched<'_, C> {
    let Some((header, body)) = C::match_header(src)? else {
        return Ok(None);
    };
    let body = body.enter()?;
    let context = C::describe(&header);
    let mut nodes = Vec::new();
    let rest = parse_body(
        body,
        &context,
        C::KIND.permitted_children(),
        Terminator::Brace,
        |node, _| {
            nodes.push(node);
            Ok(())
        },
    )?
    .leave();
    trace!(container = %context, children = nodes.len(), depth = body.depth(), "parsed container");
    Ok(Some((C::construct(header, nodes), rest)))
}

/// `keyword Name {` where `Name` is matched by `name`
fn named_header<'a>(
    src: Source<'a>,
    keyword: &str,
    name: fn(Source<'a>) -> Matched<'a, Identifier>,
) -> Matched<'a, Identifier> {
    let Some(body) = src.keyword(keyword) else {
        return Ok(None);
    };
    let (ident, rest) = expect(name(body), body, &format!("{} name", keyword))?;
    if rest.peek() == Some('=') {
        return Ok(None);
    }
    let rest = rest.expect_punct('{', &format!("opening {} body", keyword))?;
    Ok(Some((ident, rest)))
}

impl Container for Enum {
    type Header = Identifier;
    const KIND: NodeKind = NodeKind::Enum;

    fn match_header(src: Source<'_>) -> Matched<'_, Identifier> {
        named_header(src, "enum", Identifier::parse)
    }

    fn describe(header: &Identifier) -> String {
        format!("enum {}", header)
    }

    fn construct(name: Identifier, nodes: Vec<Node>) -> Self {
        Enum { name, nodes }
    }
}

impl Container for OneOf {
    type Header = Identifier;
    const KIND: NodeKind = NodeKind::OneOf;

    fn match_header(src: Source<'_>) -> Matched<'_, Identifier> {
        named_header(src, "oneof", Identifier::parse)
    }

    fn describe(header: &Identifier) -> String {
        format!("oneof {}", header)
    }

    fn construct(name: Identifier, nodes: Vec<Node>) -> Self {
        OneOf { name, nodes }
    }
}

impl Container for Message {
    type Header = Identifier;
    const KIND: NodeKind = NodeKind::Message;

    fn match_header(src: Source<'_>) -> Matched<'_, Identifier> {
        named_header(src, "message", Identifier::parse)
    }

    fn describe(header: &Identifier) -> String {
        format!("message {}", header)
    }

    fn construct(name: Identifier, nodes: Vec<Node>) -> Self {
        Message { name, nodes }
    }
}

impl Container for Extend {
    type Header = Identifier;
    const KIND: NodeKind = NodeKind::Extend;

    fn match_header(src: Source<'_>) -> Matched<'_, Identifier> {
        named_header(src, "extend", Identifier::parse_type)
    }

    fn describe(header: &Identifier) -> String {
        format!("extend {}", header)
    }

    fn construct(target: Identifier, nodes: Vec<Node>) -> Self {
        Extend { target, nodes }
    }
}

impl Container for Service {
    type Header = Identifier;
    const KIND: NodeKind = NodeKind::Service;

    fn match_header(src: Source<'_>) -> Matched<'_, Identifier> {
        named_header(src, "service", Identifier::parse)
    }

    fn describe(header: &Identifier) -> String {
        format!("service {}", header)
    }

    fn construct(name: Identifier, nodes: Vec<Node>) -> Self {
        Service { name, nodes }
    }
}

// ── File aggregate ─────────────────────────────────────────

/// Sorts top-level statements into the parts of a [`File`]
#[derive(Debug, Default)]
pub struct FileBuilder {
    syntax: Option<Syntax>,
    package: Option<Package>,
    imports: Vec<Import>,
    options: Vec<ProtoOption>,
    nodes: Vec<Node>,
}

impl FileBuilder {
    pub fn accept(&mut self, node: Node, at: Source<'_>) -> Result<()> {
        match node {
            Node::Syntax(syntax) => {
                if self.syntax.is_some() {
                    return Err(ParseError::DuplicateDeclaration {
                        what: "syntax".to_string(),
                        span: at.span(),
                    });
                }
                self.syntax = Some(syntax);
            }
            Node::Package(package) => {
                if self.package.is_some() {
                    return Err(ParseError::DuplicateDeclaration {
                        what: "package".to_string(),
                        span: at.span(),
                    });
                }
                self.package = Some(package);
            }
            Node::Import(import) => self.imports.push(import),
            Node::Option(option) => self.options.push(option),
            other => self.nodes.push(other),
        }
        Ok(())
    }

    pub fn finish(self) -> Result<File> {
        let syntax = self.syntax.ok_or(ParseError::MissingSyntax)?;
        Ok(File {
            syntax,
            package: self.package,
            imports: self.imports,
            options: self.options,
            nodes: self.nodes,
        })
    }
}

/// Parse a whole file: the container loop at file scope, terminated by end
/// of input
pub fn parse_file(src: Source<'_>) -> Result<File> {
    let mut builder = FileBuilder::default();
    parse_body(
        src,
        NodeKind::File.as_str(),
        NodeKind::File.permitted_children(),
        Terminator::End,
        |node, at| builder.accept(node, at),
    )?;
    builder.finish()
}
