//! Parser for proto3 schema text
//!
//! Recursive descent over a [`Source`] cursor. Every matcher has the shape
//!
//! ```text
//! match(source) -> Ok(Some((node, rest)))   matched, `rest` is trimmed
//!               -> Ok(None)                 not this construct, try a sibling
//!               -> Err(ParseError)          committed, but malformed
//! ```
//!
//! Containers share one loop ([`containers::parse_body`]) and differ only in
//! their header grammar and their list of permitted children.

pub mod ast;
pub mod containers;
pub mod literals;
pub mod source;
pub mod statements;

use tracing::debug;

use crate::error::Result;
use ast::{Enum, Extend, File, Message, Node, NodeKind, OneOf, Service};
use containers::match_container;
use source::Source;

/// Outcome of a matcher: `None` means "not this construct"
pub type Matched<'a, T> = Result<Option<(T, Source<'a>)>>;

/// Parse proto3 schema text into a [`File`]
///
/// # Guarantees
/// - Deterministic: same input always produces the same tree
/// - Never panics on malformed input; a malformed file yields no `File`
///
/// # Errors
/// Returns the first `ParseError`, with line:column, for grammar violations.
///
/// # Example
/// ```
/// let file = protoschema_core::parse("syntax = \"proto3\";\nmessage Foo {}").unwrap();
/// assert_eq!(file.nodes.len(), 1);
/// ```
pub fn parse(input: &str) -> Result<File> {
    debug!(bytes = input.len(), "parsing schema");
    let file = containers::parse_file(Source::new(input))?;
    debug!(
        imports = file.imports.len(),
        options = file.options.len(),
        declarations = file.nodes.len(),
        "parsed schema"
    );
    Ok(file)
}

fn lift<'a, T>(matched: Matched<'a, T>, wrap: fn(T) -> Node) -> Matched<'a, Node> {
    Ok(matched?.map(|(value, rest)| (wrap(value), rest)))
}

/// Try a single node kind at the current position
fn match_kind(kind: NodeKind, src: Source<'_>) -> Matched<'_, Node> {
    match kind {
        NodeKind::Comment => lift(statements::match_comment(src), Node::Comment),
        NodeKind::Syntax => lift(statements::match_syntax(src), Node::Syntax),
        NodeKind::Package => lift(statements::match_package(src), Node::Package),
        NodeKind::Import => lift(statements::match_import(src), Node::Import),
        NodeKind::Option => lift(statements::match_option(src), Node::Option),
        NodeKind::Reserved => lift(statements::match_reserved(src), Node::Reserved),
        NodeKind::Extensions => lift(statements::match_extensions(src), Node::Extensions),
        NodeKind::Field => lift(statements::match_field(src), Node::Field),
        NodeKind::Map => lift(statements::match_map(src), Node::Map),
        NodeKind::EnumValue => lift(statements::match_enum_value(src), Node::EnumValue),
        NodeKind::Rpc => lift(statements::match_rpc(src), Node::Rpc),
        NodeKind::Enum => lift(match_container::<Enum>(src), Node::Enum),
        NodeKind::OneOf => lift(match_container::<OneOf>(src), Node::OneOf),
        NodeKind::Message => lift(match_container::<Message>(src), Node::Message),
        NodeKind::Extend => lift(match_container::<Extend>(src), Node::Extend),
        NodeKind::Service => lift(match_container::<Service>(src), Node::Service),
        NodeKind::File => Ok(None),
    }
}

/// Try each permitted kind in priority order; the first match wins
pub fn match_node<'a>(src: Source<'a>, permitted: &[NodeKind]) -> Matched<'a, Node> {
    for kind in permitted {
        if let Some(matched) = match_kind(*kind, src)? {
            return Ok(Some(matched));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use ast::*;

    const EVERYTHING: &str = r#"
syntax = "proto3";

package foo.bar.baz;

import public "foo.proto";
import weak 'bar/baz.proto';
import "bat.proto";

option java_package = "my.test.package";
option (fully.qualified).option = .314159265e1;

// Testing top-level single-line comment

extend SomeExtendableMessage {
    string some_extendable_field = 1;
    // yay
}

enum MyAwesomeEnum {
    option allow_alias = true;
    MAE_UNSPECIFIED = 0;
    MAE_STARTED = 1;
    MAE_RUNNING = 2;
}

message MyAwesomeMessage {
    option (bar).baz = 1.2;
    enum MyNestedEnum {
        MNE_UNDEFINED = 0;
        MNE_NEGATIVE = -1;
        MNE_POSITIVE = 2;
    }
    message MyNestedMessage {
    }
    reserved 1 to 3;
    reserved "yay";
    // testing nested comment
    repeated string field_one = 1;
    MyNestedMessage field_two = 2 [ bar.baz = true ];
    extensions 8 to max;
    oneof foo {
        string name = 4;
        option java_package = "com.example.foo";
        SubMessage sub_message = 9 [ (bar.baz).bat = "bat", baz.bat = -100 ];
    }
    map <sfixed64, NestedMessage> my_map = 10;
}
service MyGreatService {
    option (foo.bar).baz = "bat";
    rpc OneRPC (OneRPCRequest) returns (OneRPCResponse);
    rpc TwoRPC (TwoRPCRequest) returns (stream TwoRPCResponse);
    rpc ThreeRPC (ThreeRPCRequest) returns (ThreeRPCResponse) { option java_package = "com.example.foo"; option (foo.bar).baz = false; }
}
"#;

    #[test]
    fn test_parse_everything() {
        let file = parse(EVERYTHING).unwrap();

        assert_eq!(file.syntax, Syntax::default());
        assert_eq!(file.package.as_ref().unwrap().name.as_str(), "foo.bar.baz");
        assert_eq!(
            file.imports,
            vec![
                Import {
                    path: StringLiteral::new("foo.proto"),
                    modifier: Some(ImportModifier::Public)
                },
                Import {
                    path: StringLiteral::new("bar/baz.proto"),
                    modifier: Some(ImportModifier::Weak)
                },
                Import::new("bat.proto"),
            ]
        );
        assert_eq!(
            file.options,
            vec![
                ProtoOption::new("java_package", StringLiteral::new("my.test.package")),
                ProtoOption::new("(fully.qualified).option", 3.14159265),
            ]
        );

        let kinds: Vec<NodeKind> = file.nodes.iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Comment,
                NodeKind::Extend,
                NodeKind::Enum,
                NodeKind::Message,
                NodeKind::Service
            ]
        );
    }

    #[test]
    fn test_parse_everything_message_body() {
        let file = parse(EVERYTHING).unwrap();
        let message = file.messages().next().unwrap();
        assert_eq!(message.name.as_str(), "MyAwesomeMessage");

        let kinds: Vec<NodeKind> = message.nodes.iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Option,
                NodeKind::Enum,
                NodeKind::Message,
                NodeKind::Reserved,
                NodeKind::Reserved,
                NodeKind::Comment,
                NodeKind::Field,
                NodeKind::Field,
                NodeKind::Extensions,
                NodeKind::OneOf,
                NodeKind::Map,
            ]
        );

        let Node::OneOf(oneof) = &message.nodes[9] else {
            unreachable!()
        };
        assert_eq!(
            oneof.nodes[2],
            Node::Field(
                MessageField::new(FieldType::enum_or_message("SubMessage"), "sub_message", 9)
                    .with_options(vec![
                        ProtoOption::new("(bar.baz).bat", StringLiteral::new("bat")),
                        ProtoOption::new("baz.bat", -100i64),
                    ])
            )
        );
    }

    #[test]
    fn test_parse_everything_service() {
        let file = parse(EVERYTHING).unwrap();
        let Some(Node::Service(service)) = file.nodes.last() else {
            panic!("expected a trailing service");
        };
        let rpcs: Vec<&Rpc> = service
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Rpc(rpc) => Some(rpc),
                _ => None,
            })
            .collect();
        assert_eq!(rpcs.len(), 3);
        assert_eq!(rpcs[1].response, RpcType::streaming("TwoRPCResponse"));
        assert_eq!(rpcs[2].options.len(), 2);
    }

    #[test]
    fn test_parse_empty_file_needs_syntax() {
        assert_eq!(parse("").unwrap_err(), ParseError::MissingSyntax);
        assert_eq!(parse("// only a comment\n").unwrap_err(), ParseError::MissingSyntax);
    }

    #[test]
    fn test_parse_typos_are_errors() {
        assert!(parse("syntax = \"proto3\";\n\npackage foo.bar.baz\n").is_err());
        assert!(parse("syntax = \"proto3\";\nimport weak \"ba\n").is_err());
        assert!(parse("syntax = \"proto3\";\nmessage Foo { int32 a = 1 }").is_err());
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse("syntax = \"proto3\";\nmessage Foo {\n  bogus;\n}").unwrap_err();
        let span = err.span().unwrap();
        assert_eq!((span.line, span.column), (3, 3));
    }

    #[test]
    fn test_parse_deep_nesting_fails_cleanly() {
        let unclosed = format!("syntax = \"proto3\";\n{}", "message a {".repeat(100_000));
        assert!(matches!(
            parse(&unclosed).unwrap_err(),
            ParseError::NestingTooDeep { limit: source::MAX_NESTING_DEPTH, .. }
        ));

        let depth = 3000;
        let closed = format!(
            "syntax = \"proto3\";\n{}{}",
            "message a {".repeat(depth),
            "}".repeat(depth)
        );
        assert!(matches!(
            parse(&closed).unwrap_err(),
            ParseError::NestingTooDeep { .. }
        ));
    }

    #[test]
    fn test_parse_many_declarations() {
        let count = 20_000;
        let mut text = String::from("syntax = \"proto3\";\n");
        for i in 0..count {
            text.push_str(&format!("message M{} {{ int32 a = 1; }}\n", i));
        }
        text.push_str("bogus;\n");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.span().map(|s| s.line), Some(count + 2));

        text.truncate(text.len() - "bogus;\n".len());
        assert_eq!(parse(&text).unwrap().nodes.len(), count);
    }

    #[test]
    fn test_parse_keyword_typed_field() {
        let file = parse("syntax = \"proto3\";\nmessage M { message msg = 1; enum kind = 2; }").unwrap();
        let message = file.messages().next().unwrap();
        assert_eq!(message.nodes.len(), 2);
        assert!(message.nodes.iter().all(|node| node.kind() == NodeKind::Field));
    }

    #[test]
    fn test_parse_determinism_100_iterations() {
        let first = parse(EVERYTHING).unwrap();
        for i in 0..100 {
            let again = parse(EVERYTHING).unwrap();
            assert_eq!(first, again, "Determinism failure at iteration {}", i);
        }
    }
}
