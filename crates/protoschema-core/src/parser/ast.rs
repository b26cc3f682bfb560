//! AST types for proto3 schema files
//!
//! The tree is a closed set of node types wrapped by [`Node`]. Containers
//! (file, message, enum, oneof, extend, service) own their children as
//! `Vec<Node>` in source order; the parser only ever places the variants a
//! container permits (see [`NodeKind::permitted_children`]).
//!
//! Nodes are immutable after construction: normalization and diffing build
//! new values. Nodes carry no back-reference to their parent; the enclosing
//! scope is passed explicitly to the diff engine instead.
//!
//! All AST types derive `Debug, Clone, PartialEq, Serialize`. Floats in
//! constants rule out `Eq`.

use serde::Serialize;

use crate::error::{ParseError, Result};

// ── Leaf values ────────────────────────────────────────────

/// Identifier as written: bare (`foo`), full (`foo.bar`), type reference
/// (`.foo.Bar`) or option name (`(foo.bar).baz`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Identifier(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    #[default]
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

/// Quoted string literal
///
/// `value` is the raw text between the quotes, escapes included, so it
/// serializes back byte-for-byte. The quote character is kept for output
/// but does not take part in equality.
#[derive(Debug, Clone, Serialize)]
pub struct StringLiteral {
    pub value: String,
    pub quote: Quote,
}

impl StringLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        StringLiteral {
            value: value.into(),
            quote: Quote::Double,
        }
    }

    pub fn single_quoted(value: impl Into<String>) -> Self {
        StringLiteral {
            value: value.into(),
            quote: Quote::Single,
        }
    }
}

impl PartialEq for StringLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for StringLiteral {}

impl std::fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let q = self.quote.as_char();
        write!(f, "{}{}{}", q, self.value, q)
    }
}

/// Right-hand side of an option assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(StringLiteral),
    Ident(Identifier),
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Float(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Bool(value)
    }
}

impl From<StringLiteral> for Constant {
    fn from(value: StringLiteral) -> Self {
        Constant::Str(value)
    }
}

impl From<Identifier> for Constant {
    fn from(value: Identifier) -> Self {
        Constant::Ident(value)
    }
}

// ── Ranges and reservations ────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMax {
    Value(i64),
    /// The `max` keyword
    Max,
}

/// `min`, `min to max` or `min to max` with the `max` keyword
///
/// A single value is stored with `max = None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    min: i64,
    max: Option<RangeMax>,
}

impl Range {
    /// Build a range, rejecting `min > max` for a concrete upper bound.
    pub fn new(min: i64, max: Option<RangeMax>) -> Result<Self> {
        if let Some(RangeMax::Value(max)) = max {
            if min > max {
                return Err(ParseError::InvalidRange {
                    min,
                    max,
                    span: None,
                });
            }
        }
        Ok(Range { min, max })
    }

    pub fn single(value: i64) -> Self {
        Range {
            min: value,
            max: None,
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> Option<RangeMax> {
        self.max
    }

    /// Sort key: numeric lower bound, then upper bound with `max` last
    pub fn sort_key(&self) -> (i64, RangeMax) {
        (self.min, self.max.unwrap_or(RangeMax::Value(self.min)))
    }
}

/// Contents of a `reserved` statement: ranges or names, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedEntries {
    Ranges(Vec<Range>),
    Fields(Vec<StringLiteral>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reserved {
    entries: ReservedEntries,
}

impl Reserved {
    pub fn from_ranges(ranges: Vec<Range>) -> Result<Self> {
        if ranges.is_empty() {
            return Err(ParseError::InvalidReserved {
                reason: "expected at least one range".to_string(),
                span: None,
            });
        }
        Ok(Reserved {
            entries: ReservedEntries::Ranges(ranges),
        })
    }

    pub fn from_fields(fields: Vec<StringLiteral>) -> Result<Self> {
        if fields.is_empty() {
            return Err(ParseError::InvalidReserved {
                reason: "expected at least one field name".to_string(),
                span: None,
            });
        }
        Ok(Reserved {
            entries: ReservedEntries::Fields(fields),
        })
    }

    pub fn entries(&self) -> &ReservedEntries {
        &self.entries
    }

    pub fn ranges(&self) -> &[Range] {
        match &self.entries {
            ReservedEntries::Ranges(ranges) => ranges,
            ReservedEntries::Fields(_) => &[],
        }
    }

    pub fn fields(&self) -> &[StringLiteral] {
        match &self.entries {
            ReservedEntries::Fields(fields) => fields,
            ReservedEntries::Ranges(_) => &[],
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut ReservedEntries {
        &mut self.entries
    }
}

// ── Statements ─────────────────────────────────────────────

/// `option name = constant;`, also used for bracketed option lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtoOption {
    pub name: Identifier,
    pub value: Constant,
}

impl ProtoOption {
    pub fn new(name: impl Into<Identifier>, value: impl Into<Constant>) -> Self {
        ProtoOption {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    SingleLine,
    MultiLine,
}

/// Comment text without its delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
}

impl Comment {
    pub fn single_line(text: impl Into<String>) -> Self {
        Comment {
            kind: CommentKind::SingleLine,
            text: text.into(),
        }
    }

    pub fn multi_line(text: impl Into<String>) -> Self {
        Comment {
            kind: CommentKind::MultiLine,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Syntax {
    pub value: StringLiteral,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            value: StringLiteral::new("proto3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: Identifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportModifier {
    Public,
    Weak,
}

impl ImportModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportModifier::Public => "public",
            ImportModifier::Weak => "weak",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub path: StringLiteral,
    pub modifier: Option<ImportModifier>,
}

impl Import {
    pub fn new(path: &str) -> Self {
        Import {
            path: StringLiteral::new(path),
            modifier: None,
        }
    }
}

// ── Fields ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLabel {
    #[default]
    Implicit,
    Optional,
    Repeated,
}

impl FieldLabel {
    pub fn repeated(self) -> bool {
        self == FieldLabel::Repeated
    }

    pub fn keyword(self) -> Option<&'static str> {
        match self {
            FieldLabel::Implicit => None,
            FieldLabel::Optional => Some("optional"),
            FieldLabel::Repeated => Some("repeated"),
        }
    }
}

/// Field type: one of the scalar kinds, or a reference to an enum or message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    EnumOrMessage(Identifier),
}

impl FieldType {
    pub const SCALARS: &'static [(&'static str, FieldType)] = &[
        ("double", FieldType::Double),
        ("float", FieldType::Float),
        ("int32", FieldType::Int32),
        ("int64", FieldType::Int64),
        ("uint32", FieldType::Uint32),
        ("uint64", FieldType::Uint64),
        ("sint32", FieldType::Sint32),
        ("sint64", FieldType::Sint64),
        ("fixed32", FieldType::Fixed32),
        ("fixed64", FieldType::Fixed64),
        ("sfixed32", FieldType::Sfixed32),
        ("sfixed64", FieldType::Sfixed64),
        ("bool", FieldType::Bool),
        ("string", FieldType::String),
        ("bytes", FieldType::Bytes),
    ];

    pub fn scalar(name: &str) -> Option<FieldType> {
        Self::SCALARS
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, ty)| ty.clone())
    }

    pub fn enum_or_message(name: &str) -> Self {
        FieldType::EnumOrMessage(Identifier::new(name))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let FieldType::EnumOrMessage(name) = self {
            return f.write_str(name.as_str());
        }
        let keyword = Self::SCALARS
            .iter()
            .find(|(_, ty)| ty == self)
            .map(|(keyword, _)| *keyword)
            .unwrap_or_default();
        f.write_str(keyword)
    }
}

/// Map key types: integral scalars, `bool` and `string`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKeyType {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
}

impl MapKeyType {
    pub const ALL: &'static [(&'static str, MapKeyType)] = &[
        ("int32", MapKeyType::Int32),
        ("int64", MapKeyType::Int64),
        ("uint32", MapKeyType::Uint32),
        ("uint64", MapKeyType::Uint64),
        ("sint32", MapKeyType::Sint32),
        ("sint64", MapKeyType::Sint64),
        ("fixed32", MapKeyType::Fixed32),
        ("fixed64", MapKeyType::Fixed64),
        ("sfixed32", MapKeyType::Sfixed32),
        ("sfixed64", MapKeyType::Sfixed64),
        ("bool", MapKeyType::Bool),
        ("string", MapKeyType::String),
    ];

    pub fn from_keyword(name: &str) -> Option<MapKeyType> {
        Self::ALL
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, ty)| *ty)
    }

    pub fn keyword(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, ty)| *ty == self)
            .map(|(keyword, _)| *keyword)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageField {
    pub label: FieldLabel,
    pub field_type: FieldType,
    pub name: Identifier,
    pub number: i64,
    pub options: Vec<ProtoOption>,
}

impl MessageField {
    pub fn new(field_type: FieldType, name: &str, number: i64) -> Self {
        MessageField {
            label: FieldLabel::Implicit,
            field_type,
            name: Identifier::new(name),
            number,
            options: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: FieldLabel) -> Self {
        self.label = label;
        self
    }

    pub fn with_options(mut self, options: Vec<ProtoOption>) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Map {
    pub key_type: MapKeyType,
    pub value_type: FieldType,
    pub name: Identifier,
    pub number: i64,
    pub options: Vec<ProtoOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: Identifier,
    pub number: i64,
    pub options: Vec<ProtoOption>,
}

impl EnumValue {
    pub fn new(name: &str, number: i64) -> Self {
        EnumValue {
            name: Identifier::new(name),
            number,
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extensions {
    pub ranges: Vec<Range>,
}

// ── Containers ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name: Identifier,
    pub nodes: Vec<Node>,
}

impl Enum {
    pub fn values(&self) -> impl Iterator<Item = &EnumValue> {
        self.nodes.iter().filter_map(|node| match node {
            Node::EnumValue(value) => Some(value),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneOf {
    pub name: Identifier,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extend {
    pub target: Identifier,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name: Identifier,
    pub nodes: Vec<Node>,
}

impl Message {
    pub fn new(name: &str, nodes: Vec<Node>) -> Self {
        Message {
            name: Identifier::new(name),
            nodes,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &MessageField> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Field(field) => Some(field),
            _ => None,
        })
    }
}

/// Request or response clause of an RPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcType {
    pub stream: bool,
    pub type_name: Identifier,
}

impl RpcType {
    pub fn unary(type_name: &str) -> Self {
        RpcType {
            stream: false,
            type_name: Identifier::new(type_name),
        }
    }

    pub fn streaming(type_name: &str) -> Self {
        RpcType {
            stream: true,
            type_name: Identifier::new(type_name),
        }
    }
}

impl std::fmt::Display for RpcType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.stream {
            write!(f, "stream {}", self.type_name)
        } else {
            write!(f, "{}", self.type_name)
        }
    }
}

/// An RPC declaration inside a service
///
/// The option block holds options only. Comments written inside
/// `{ ... }` are skipped by the parser and do not survive a parse and
/// serialize round trip, unlike comments in container bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rpc {
    pub name: Identifier,
    pub request: RpcType,
    pub response: RpcType,
    pub options: Vec<ProtoOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub name: Identifier,
    pub nodes: Vec<Node>,
}

/// A parsed schema file
///
/// `syntax`, `package`, `imports` and `options` are pulled out of the
/// statement stream; every other top-level node stays in `nodes` in source
/// order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct File {
    pub syntax: Syntax,
    pub package: Option<Package>,
    pub imports: Vec<Import>,
    pub options: Vec<ProtoOption>,
    pub nodes: Vec<Node>,
}

impl File {
    /// Paths of the other schemas this file declares a dependency on
    pub fn import_paths(&self) -> Vec<&str> {
        self.imports.iter().map(|i| i.path.value.as_str()).collect()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Message(message) => Some(message),
            _ => None,
        })
    }
}

// ── Node sum type ──────────────────────────────────────────

/// Any schema node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Syntax(Syntax),
    Package(Package),
    Import(Import),
    Option(ProtoOption),
    Enum(Enum),
    EnumValue(EnumValue),
    Message(Message),
    Field(MessageField),
    OneOf(OneOf),
    Map(Map),
    Reserved(Reserved),
    Extensions(Extensions),
    Extend(Extend),
    Service(Service),
    Rpc(Rpc),
    Comment(Comment),
}

/// Fieldless mirror of [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Syntax,
    Package,
    Import,
    Option,
    Enum,
    EnumValue,
    Message,
    Field,
    OneOf,
    Map,
    Reserved,
    Extensions,
    Extend,
    Service,
    Rpc,
    Comment,
    File,
}

impl NodeKind {
    /// Child kinds a container accepts, in the order the parser tries them.
    /// More specific constructs come before the generic field.
    pub fn permitted_children(self) -> &'static [NodeKind] {
        match self {
            NodeKind::File => &[
                NodeKind::Comment,
                NodeKind::Syntax,
                NodeKind::Package,
                NodeKind::Import,
                NodeKind::Option,
                NodeKind::Message,
                NodeKind::Enum,
                NodeKind::Service,
                NodeKind::Extend,
            ],
            NodeKind::Message => &[
                NodeKind::Comment,
                NodeKind::Option,
                NodeKind::Enum,
                NodeKind::Message,
                NodeKind::Reserved,
                NodeKind::OneOf,
                NodeKind::Map,
                NodeKind::Extensions,
                NodeKind::Extend,
                NodeKind::Field,
            ],
            NodeKind::Enum => &[
                NodeKind::Comment,
                NodeKind::Option,
                NodeKind::Reserved,
                NodeKind::EnumValue,
            ],
            NodeKind::OneOf => &[NodeKind::Comment, NodeKind::Option, NodeKind::Field],
            NodeKind::Extend => &[NodeKind::Comment, NodeKind::Field],
            NodeKind::Service => &[NodeKind::Comment, NodeKind::Option, NodeKind::Rpc],
            _ => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Syntax => "syntax",
            NodeKind::Package => "package",
            NodeKind::Import => "import",
            NodeKind::Option => "option",
            NodeKind::Enum => "enum",
            NodeKind::EnumValue => "enum value",
            NodeKind::Message => "message",
            NodeKind::Field => "field",
            NodeKind::OneOf => "oneof",
            NodeKind::Map => "map",
            NodeKind::Reserved => "reserved",
            NodeKind::Extensions => "extensions",
            NodeKind::Extend => "extend",
            NodeKind::Service => "service",
            NodeKind::Rpc => "rpc",
            NodeKind::Comment => "comment",
            NodeKind::File => "file",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Syntax(_) => NodeKind::Syntax,
            Node::Package(_) => NodeKind::Package,
            Node::Import(_) => NodeKind::Import,
            Node::Option(_) => NodeKind::Option,
            Node::Enum(_) => NodeKind::Enum,
            Node::EnumValue(_) => NodeKind::EnumValue,
            Node::Message(_) => NodeKind::Message,
            Node::Field(_) => NodeKind::Field,
            Node::OneOf(_) => NodeKind::OneOf,
            Node::Map(_) => NodeKind::Map,
            Node::Reserved(_) => NodeKind::Reserved,
            Node::Extensions(_) => NodeKind::Extensions,
            Node::Extend(_) => NodeKind::Extend,
            Node::Service(_) => NodeKind::Service,
            Node::Rpc(_) => NodeKind::Rpc,
            Node::Comment(_) => NodeKind::Comment,
        }
    }

    /// Declared name, for the node kinds that have one
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Package(p) => Some(p.name.as_str()),
            Node::Option(o) => Some(o.name.as_str()),
            Node::Enum(e) => Some(e.name.as_str()),
            Node::EnumValue(v) => Some(v.name.as_str()),
            Node::Message(m) => Some(m.name.as_str()),
            Node::Field(f) => Some(f.name.as_str()),
            Node::OneOf(o) => Some(o.name.as_str()),
            Node::Map(m) => Some(m.name.as_str()),
            Node::Extend(e) => Some(e.target.as_str()),
            Node::Service(s) => Some(s.name.as_str()),
            Node::Rpc(r) => Some(r.name.as_str()),
            Node::Syntax(_)
            | Node::Import(_)
            | Node::Reserved(_)
            | Node::Extensions(_)
            | Node::Comment(_) => None,
        }
    }

    /// Child nodes of a container; empty for leaf statements
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Enum(e) => &e.nodes,
            Node::Message(m) => &m.nodes,
            Node::OneOf(o) => &o.nodes,
            Node::Extend(e) => &e.nodes,
            Node::Service(s) => &s.nodes,
            _ => &[],
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Comment(_))
    }

    /// One-line description used in diff and error output
    pub fn summary(&self) -> String {
        match self {
            Node::Syntax(s) => format!("syntax {}", s.value),
            Node::Package(p) => format!("package {}", p.name),
            Node::Import(i) => match i.modifier {
                Some(m) => format!("import {} {}", m.as_str(), i.path),
                None => format!("import {}", i.path),
            },
            Node::Option(o) => format!("option {}", o.name),
            Node::Enum(e) => format!("enum {}", e.name),
            Node::EnumValue(v) => format!("enum value {} = {}", v.name, v.number),
            Node::Message(m) => format!("message {}", m.name),
            Node::Field(f) => match f.label.keyword() {
                Some(label) => {
                    format!("field {} {} {} = {}", label, f.field_type, f.name, f.number)
                }
                None => format!("field {} {} = {}", f.field_type, f.name, f.number),
            },
            Node::OneOf(o) => format!("oneof {}", o.name),
            Node::Map(m) => format!(
                "map<{}, {}> {} = {}",
                m.key_type.keyword(),
                m.value_type,
                m.name,
                m.number
            ),
            Node::Reserved(_) => "reserved".to_string(),
            Node::Extensions(_) => "extensions".to_string(),
            Node::Extend(e) => format!("extend {}", e.target),
            Node::Service(s) => format!("service {}", s.name),
            Node::Rpc(r) => format!("rpc {} ({}) returns ({})", r.name, r.request, r.response),
            Node::Comment(_) => "comment".to_string(),
        }
    }
}

macro_rules! impl_from_node {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::$variant(value)
                }
            }
        )*
    };
}

impl_from_node!(
    Syntax(Syntax),
    Package(Package),
    Import(Import),
    Option(ProtoOption),
    Enum(Enum),
    EnumValue(EnumValue),
    Message(Message),
    Field(MessageField),
    OneOf(OneOf),
    Map(Map),
    Reserved(Reserved),
    Extensions(Extensions),
    Extend(Extend),
    Service(Service),
    Rpc(Rpc),
    Comment(Comment),
);
