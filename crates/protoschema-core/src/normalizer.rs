//! Canonical normalizer: converts schema trees to a deterministic form
//!
//! Normalized trees are what the diff engine compares. Two schemas that
//! differ only in formatting, comments or the order of order-insignificant
//! lists normalize to equal trees.
//!
//! # Pipeline
//!
//! `proto text → parse → File → normalize → serialize → SHA-256`
//!
//! # Rules
//!
//! - Comments are dropped everywhere
//! - Declaration bodies (file, message, enum, oneof, extend, service) keep
//!   source order, since order affects generated code
//! - Reserved ranges and extension ranges sort by numeric bounds
//! - Reserved field names sort lexically
//! - Bracketed option lists and RPC option blocks sort by option name
//! - Option statements in a message or enum body sort by name among
//!   themselves; the other children keep their slots
//! - Imports sort by path; file options sort by name
//! - String literals use double quotes where the text allows it
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize(normalize(x)) == normalize(x)`
//! - **Deterministic**: same input always produces same output
//! - **Round trip**: `parse(serialize(normalize(x))) == normalize(x)`

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::parser::ast::*;
use crate::{ProtoNode, Result};

/// Canonical form of a node
pub trait Normalize {
    fn normalize(&self) -> Self;
}

// ── Public API ─────────────────────────────────────────────

/// Normalize proto text to canonical text
///
/// Pipeline: parse → normalize → serialize
///
/// # Errors
/// Returns the `ParseError` for invalid input.
pub fn canonicalize(text: &str) -> Result<String> {
    let file = crate::parser::parse(text)?;
    Ok(file.canonical())
}

/// SHA-256 of the canonical serialization, as lowercase hex
///
/// Schemas that normalize to the same tree share a fingerprint, so a
/// registry can de-duplicate versions that differ only cosmetically.
pub fn fingerprint(file: &File) -> String {
    let canonical = file.canonical();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let result = hasher.finalize();
    let hash = format!("{:x}", result);
    debug!(bytes = canonical.len(), %hash, "computed schema fingerprint");
    hash
}

// ── Helpers ────────────────────────────────────────────────

fn normalize_body(nodes: &[Node]) -> Vec<Node> {
    nodes
        .iter()
        .filter(|node| !node.is_comment())
        .map(Normalize::normalize)
        .collect()
}

/// Normalized body whose option statements are sorted in the slots they
/// already occupy
fn normalize_body_sorting_options(nodes: &[Node]) -> Vec<Node> {
    let mut body = normalize_body(nodes);
    let mut options: Vec<ProtoOption> = body
        .iter()
        .filter_map(|node| match node {
            Node::Option(option) => Some(option.clone()),
            _ => None,
        })
        .collect();
    options.sort_by(|a, b| a.name.cmp(&b.name));

    let mut sorted = options.into_iter();
    for node in body.iter_mut() {
        if let Node::Option(option) = node {
            if let Some(next) = sorted.next() {
                *option = next;
            }
        }
    }
    body
}

fn sorted_options(options: &[ProtoOption]) -> Vec<ProtoOption> {
    let mut options: Vec<ProtoOption> = options.iter().map(Normalize::normalize).collect();
    options.sort_by(|a, b| a.name.cmp(&b.name));
    options
}

fn sorted_ranges(ranges: &[Range]) -> Vec<Range> {
    let mut ranges = ranges.to_vec();
    ranges.sort_by_key(Range::sort_key);
    ranges
}

// ── Leaf statements ────────────────────────────────────────

macro_rules! normalize_as_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Normalize for $ty {
                fn normalize(&self) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

normalize_as_clone!(Package, Comment);

/// Double quotes unless the text itself contains a bare `"`
impl Normalize for StringLiteral {
    fn normalize(&self) -> Self {
        if self.quote == Quote::Single && !self.value.contains('"') {
            StringLiteral::new(self.value.clone())
        } else {
            self.clone()
        }
    }
}

impl Normalize for Syntax {
    fn normalize(&self) -> Self {
        Syntax {
            value: self.value.normalize(),
        }
    }
}

impl Normalize for Import {
    fn normalize(&self) -> Self {
        Import {
            path: self.path.normalize(),
            modifier: self.modifier,
        }
    }
}

impl Normalize for Constant {
    fn normalize(&self) -> Self {
        match self {
            Constant::Str(s) => Constant::Str(s.normalize()),
            other => other.clone(),
        }
    }
}

impl Normalize for ProtoOption {
    fn normalize(&self) -> Self {
        ProtoOption {
            name: self.name.clone(),
            value: self.value.normalize(),
        }
    }
}

impl Normalize for Reserved {
    fn normalize(&self) -> Self {
        let mut reserved = self.clone();
        match reserved.entries_mut() {
            ReservedEntries::Ranges(ranges) => ranges.sort_by_key(Range::sort_key),
            ReservedEntries::Fields(fields) => {
                for field in fields.iter_mut() {
                    *field = field.normalize();
                }
                fields.sort_by(|a, b| a.value.cmp(&b.value));
            }
        }
        reserved
    }
}

impl Normalize for Extensions {
    fn normalize(&self) -> Self {
        Extensions {
            ranges: sorted_ranges(&self.ranges),
        }
    }
}

impl Normalize for EnumValue {
    fn normalize(&self) -> Self {
        EnumValue {
            options: sorted_options(&self.options),
            ..self.clone()
        }
    }
}

impl Normalize for MessageField {
    fn normalize(&self) -> Self {
        MessageField {
            options: sorted_options(&self.options),
            ..self.clone()
        }
    }
}

impl Normalize for Map {
    fn normalize(&self) -> Self {
        Map {
            options: sorted_options(&self.options),
            ..self.clone()
        }
    }
}

impl Normalize for Rpc {
    fn normalize(&self) -> Self {
        Rpc {
            options: sorted_options(&self.options),
            ..self.clone()
        }
    }
}

// ── Containers ─────────────────────────────────────────────

impl Normalize for Enum {
    fn normalize(&self) -> Self {
        Enum {
            name: self.name.clone(),
            nodes: normalize_body_sorting_options(&self.nodes),
        }
    }
}

impl Normalize for OneOf {
    fn normalize(&self) -> Self {
        OneOf {
            name: self.name.clone(),
            nodes: normalize_body(&self.nodes),
        }
    }
}

impl Normalize for Message {
    fn normalize(&self) -> Self {
        Message {
            name: self.name.clone(),
            nodes: normalize_body_sorting_options(&self.nodes),
        }
    }
}

impl Normalize for Extend {
    fn normalize(&self) -> Self {
        Extend {
            target: self.target.clone(),
            nodes: normalize_body(&self.nodes),
        }
    }
}

impl Normalize for Service {
    fn normalize(&self) -> Self {
        Service {
            name: self.name.clone(),
            nodes: normalize_body(&self.nodes),
        }
    }
}

impl Normalize for Node {
    fn normalize(&self) -> Self {
        match self {
            Node::Syntax(n) => Node::Syntax(n.normalize()),
            Node::Package(n) => Node::Package(n.normalize()),
            Node::Import(n) => Node::Import(n.normalize()),
            Node::Option(n) => Node::Option(n.normalize()),
            Node::Enum(n) => Node::Enum(n.normalize()),
            Node::EnumValue(n) => Node::EnumValue(n.normalize()),
            Node::Message(n) => Node::Message(n.normalize()),
            Node::Field(n) => Node::Field(n.normalize()),
            Node::OneOf(n) => Node::OneOf(n.normalize()),
            Node::Map(n) => Node::Map(n.normalize()),
            Node::Reserved(n) => Node::Reserved(n.normalize()),
            Node::Extensions(n) => Node::Extensions(n.normalize()),
            Node::Extend(n) => Node::Extend(n.normalize()),
            Node::Service(n) => Node::Service(n.normalize()),
            Node::Rpc(n) => Node::Rpc(n.normalize()),
            Node::Comment(n) => Node::Comment(n.normalize()),
        }
    }
}

impl Normalize for File {
    fn normalize(&self) -> Self {
        let mut imports: Vec<Import> = self.imports.iter().map(Normalize::normalize).collect();
        imports.sort_by(|a, b| a.path.value.cmp(&b.path.value));
        File {
            syntax: self.syntax.normalize(),
            package: self.package.clone(),
            imports,
            options: sorted_options(&self.options),
            nodes: normalize_body(&self.nodes),
        }
    }
}
