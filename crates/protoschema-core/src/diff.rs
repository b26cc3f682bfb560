//! Structural diff between two versions of a schema
//!
//! Diffs compare normalized trees, so comments, formatting and the order
//! of order-insignificant lists never produce a diff.
//!
//! # Matching
//!
//! [`diff_sets`] pairs nodes across two sibling lists by an identity key:
//!
//! | node                          | key                 |
//! |-------------------------------|---------------------|
//! | message, enum, service, rpc   | name                |
//! | oneof                         | name                |
//! | extend                        | target type         |
//! | field, map (one shared slot)  | field number        |
//! | enum value                    | numeric value       |
//! | oneof member                  | field name          |
//! | option                        | option name         |
//! | import                        | path                |
//! | reserved, extensions          | canonical text      |
//!
//! A matched pair whose content differs yields kind-specific change diffs.
//! Because fields and enum values are keyed by number, renaming one is a
//! `*NameChanged` diff while renumbering it is a removal plus an addition.
//!
//! Each diff carries the dotted `scope` of its enclosing declarations
//! (`""` at file level, `Outer.Inner` inside nested messages).

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::normalizer::Normalize;
use crate::parser::ast::*;
use crate::ProtoNode;

// ── Diff kinds ─────────────────────────────────────────────

/// Every kind of change the engine reports
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    PackageAdded,
    PackageRemoved,
    PackageChanged,
    ImportAdded,
    ImportRemoved,
    ImportModifierChanged,
    OptionAdded,
    OptionRemoved,
    OptionValueChanged,
    MessageAdded,
    MessageRemoved,
    EnumAdded,
    EnumRemoved,
    EnumValueAdded,
    EnumValueRemoved,
    EnumValueNameChanged,
    FieldAdded,
    FieldRemoved,
    FieldNameChanged,
    FieldNumberChanged,
    FieldTypeChanged,
    FieldLabelChanged,
    OneOfAdded,
    OneOfRemoved,
    MapAdded,
    MapRemoved,
    ReservedAdded,
    ReservedRemoved,
    ExtensionsAdded,
    ExtensionsRemoved,
    ExtendAdded,
    ExtendRemoved,
    ServiceAdded,
    ServiceRemoved,
    RpcAdded,
    RpcRemoved,
    RpcRequestChanged,
    RpcResponseChanged,
    /// Bracketed options of a field, map or enum value, or an RPC option block
    OptionsChanged,
}

impl DiffKind {
    pub const ALL: &'static [DiffKind] = &[
        DiffKind::PackageAdded,
        DiffKind::PackageRemoved,
        DiffKind::PackageChanged,
        DiffKind::ImportAdded,
        DiffKind::ImportRemoved,
        DiffKind::ImportModifierChanged,
        DiffKind::OptionAdded,
        DiffKind::OptionRemoved,
        DiffKind::OptionValueChanged,
        DiffKind::MessageAdded,
        DiffKind::MessageRemoved,
        DiffKind::EnumAdded,
        DiffKind::EnumRemoved,
        DiffKind::EnumValueAdded,
        DiffKind::EnumValueRemoved,
        DiffKind::EnumValueNameChanged,
        DiffKind::FieldAdded,
        DiffKind::FieldRemoved,
        DiffKind::FieldNameChanged,
        DiffKind::FieldNumberChanged,
        DiffKind::FieldTypeChanged,
        DiffKind::FieldLabelChanged,
        DiffKind::OneOfAdded,
        DiffKind::OneOfRemoved,
        DiffKind::MapAdded,
        DiffKind::MapRemoved,
        DiffKind::ReservedAdded,
        DiffKind::ReservedRemoved,
        DiffKind::ExtensionsAdded,
        DiffKind::ExtensionsRemoved,
        DiffKind::ExtendAdded,
        DiffKind::ExtendRemoved,
        DiffKind::ServiceAdded,
        DiffKind::ServiceRemoved,
        DiffKind::RpcAdded,
        DiffKind::RpcRemoved,
        DiffKind::RpcRequestChanged,
        DiffKind::RpcResponseChanged,
        DiffKind::OptionsChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiffKind::PackageAdded => "package_added",
            DiffKind::PackageRemoved => "package_removed",
            DiffKind::PackageChanged => "package_changed",
            DiffKind::ImportAdded => "import_added",
            DiffKind::ImportRemoved => "import_removed",
            DiffKind::ImportModifierChanged => "import_modifier_changed",
            DiffKind::OptionAdded => "option_added",
            DiffKind::OptionRemoved => "option_removed",
            DiffKind::OptionValueChanged => "option_value_changed",
            DiffKind::MessageAdded => "message_added",
            DiffKind::MessageRemoved => "message_removed",
            DiffKind::EnumAdded => "enum_added",
            DiffKind::EnumRemoved => "enum_removed",
            DiffKind::EnumValueAdded => "enum_value_added",
            DiffKind::EnumValueRemoved => "enum_value_removed",
            DiffKind::EnumValueNameChanged => "enum_value_name_changed",
            DiffKind::FieldAdded => "field_added",
            DiffKind::FieldRemoved => "field_removed",
            DiffKind::FieldNameChanged => "field_name_changed",
            DiffKind::FieldNumberChanged => "field_number_changed",
            DiffKind::FieldTypeChanged => "field_type_changed",
            DiffKind::FieldLabelChanged => "field_label_changed",
            DiffKind::OneOfAdded => "one_of_added",
            DiffKind::OneOfRemoved => "one_of_removed",
            DiffKind::MapAdded => "map_added",
            DiffKind::MapRemoved => "map_removed",
            DiffKind::ReservedAdded => "reserved_added",
            DiffKind::ReservedRemoved => "reserved_removed",
            DiffKind::ExtensionsAdded => "extensions_added",
            DiffKind::ExtensionsRemoved => "extensions_removed",
            DiffKind::ExtendAdded => "extend_added",
            DiffKind::ExtendRemoved => "extend_removed",
            DiffKind::ServiceAdded => "service_added",
            DiffKind::ServiceRemoved => "service_removed",
            DiffKind::RpcAdded => "rpc_added",
            DiffKind::RpcRemoved => "rpc_removed",
            DiffKind::RpcRequestChanged => "rpc_request_changed",
            DiffKind::RpcResponseChanged => "rpc_response_changed",
            DiffKind::OptionsChanged => "options_changed",
        }
    }

    /// Kind reported when a node of `kind` appears; `None` for nodes that
    /// carry no diff weight (comments, syntax)
    pub fn added(kind: NodeKind) -> Option<DiffKind> {
        Some(match kind {
            NodeKind::Package => DiffKind::PackageAdded,
            NodeKind::Import => DiffKind::ImportAdded,
            NodeKind::Option => DiffKind::OptionAdded,
            NodeKind::Message => DiffKind::MessageAdded,
            NodeKind::Enum => DiffKind::EnumAdded,
            NodeKind::EnumValue => DiffKind::EnumValueAdded,
            NodeKind::Field => DiffKind::FieldAdded,
            NodeKind::OneOf => DiffKind::OneOfAdded,
            NodeKind::Map => DiffKind::MapAdded,
            NodeKind::Reserved => DiffKind::ReservedAdded,
            NodeKind::Extensions => DiffKind::ExtensionsAdded,
            NodeKind::Extend => DiffKind::ExtendAdded,
            NodeKind::Service => DiffKind::ServiceAdded,
            NodeKind::Rpc => DiffKind::RpcAdded,
            NodeKind::Syntax | NodeKind::Comment | NodeKind::File => return None,
        })
    }

    /// Kind reported when a node of `kind` disappears
    pub fn removed(kind: NodeKind) -> Option<DiffKind> {
        DiffKind::added(kind).map(DiffKind::inverse)
    }

    /// Swap additions and removals; change kinds map to themselves
    pub fn inverse(self) -> DiffKind {
        match self {
            DiffKind::PackageAdded => DiffKind::PackageRemoved,
            DiffKind::PackageRemoved => DiffKind::PackageAdded,
            DiffKind::ImportAdded => DiffKind::ImportRemoved,
            DiffKind::ImportRemoved => DiffKind::ImportAdded,
            DiffKind::OptionAdded => DiffKind::OptionRemoved,
            DiffKind::OptionRemoved => DiffKind::OptionAdded,
            DiffKind::MessageAdded => DiffKind::MessageRemoved,
            DiffKind::MessageRemoved => DiffKind::MessageAdded,
            DiffKind::EnumAdded => DiffKind::EnumRemoved,
            DiffKind::EnumRemoved => DiffKind::EnumAdded,
            DiffKind::EnumValueAdded => DiffKind::EnumValueRemoved,
            DiffKind::EnumValueRemoved => DiffKind::EnumValueAdded,
            DiffKind::FieldAdded => DiffKind::FieldRemoved,
            DiffKind::FieldRemoved => DiffKind::FieldAdded,
            DiffKind::OneOfAdded => DiffKind::OneOfRemoved,
            DiffKind::OneOfRemoved => DiffKind::OneOfAdded,
            DiffKind::MapAdded => DiffKind::MapRemoved,
            DiffKind::MapRemoved => DiffKind::MapAdded,
            DiffKind::ReservedAdded => DiffKind::ReservedRemoved,
            DiffKind::ReservedRemoved => DiffKind::ReservedAdded,
            DiffKind::ExtensionsAdded => DiffKind::ExtensionsRemoved,
            DiffKind::ExtensionsRemoved => DiffKind::ExtensionsAdded,
            DiffKind::ExtendAdded => DiffKind::ExtendRemoved,
            DiffKind::ExtendRemoved => DiffKind::ExtendAdded,
            DiffKind::ServiceAdded => DiffKind::ServiceRemoved,
            DiffKind::ServiceRemoved => DiffKind::ServiceAdded,
            DiffKind::RpcAdded => DiffKind::RpcRemoved,
            DiffKind::RpcRemoved => DiffKind::RpcAdded,
            changed => changed,
        }
    }
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown diff kind {0:?}")]
pub struct UnknownDiffKind(pub String);

impl FromStr for DiffKind {
    type Err = UnknownDiffKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiffKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownDiffKind(s.to_string()))
    }
}

// ── Node diff ──────────────────────────────────────────────

/// One difference between two schema versions
///
/// Additions carry only `after`, removals only `before`, and changes carry
/// both sides of the changed node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDiff {
    pub kind: DiffKind,
    pub scope: String,
    pub before: Option<Node>,
    pub after: Option<Node>,
}

impl NodeDiff {
    fn added(scope: &str, node: &Node) -> Option<Self> {
        DiffKind::added(node.kind()).map(|kind| NodeDiff {
            kind,
            scope: scope.to_string(),
            before: None,
            after: Some(node.clone()),
        })
    }

    fn removed(scope: &str, node: &Node) -> Option<Self> {
        DiffKind::removed(node.kind()).map(|kind| NodeDiff {
            kind,
            scope: scope.to_string(),
            before: Some(node.clone()),
            after: None,
        })
    }

    fn changed(kind: DiffKind, scope: &str, before: &Node, after: &Node) -> Self {
        NodeDiff {
            kind,
            scope: scope.to_string(),
            before: Some(before.clone()),
            after: Some(after.clone()),
        }
    }

    /// The same difference seen from the other direction
    pub fn inverse(&self) -> Self {
        NodeDiff {
            kind: self.kind.inverse(),
            scope: self.scope.clone(),
            before: self.after.clone(),
            after: self.before.clone(),
        }
    }
}

impl std::fmt::Display for NodeDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.scope.is_empty() {
            write!(f, " in {}", self.scope)?;
        }
        match (&self.before, &self.after) {
            (Some(before), Some(after)) => {
                write!(f, ": {} -> {}", before.summary(), after.summary())
            }
            (Some(node), None) | (None, Some(node)) => write!(f, ": {}", node.summary()),
            (None, None) => Ok(()),
        }
    }
}

// ── Identity keys ──────────────────────────────────────────

/// Key that pairs a node with its counterpart in the other version
pub fn identity_key(node: &Node) -> Option<String> {
    Some(match node {
        Node::Comment(_) => return None,
        Node::Syntax(_) => "syntax".to_string(),
        Node::Package(_) => "package".to_string(),
        Node::Import(i) => format!("import:{}", i.path.value),
        Node::Option(o) => format!("option:{}", o.name),
        Node::Message(m) => format!("message:{}", m.name),
        Node::Enum(e) => format!("enum:{}", e.name),
        Node::Service(s) => format!("service:{}", s.name),
        Node::OneOf(o) => format!("oneof:{}", o.name),
        Node::Rpc(r) => format!("rpc:{}", r.name),
        Node::Extend(e) => format!("extend:{}", e.target),
        Node::EnumValue(v) => format!("value:{}", v.number),
        Node::Field(f) => format!("field:{}", f.number),
        Node::Map(m) => format!("field:{}", m.number),
        Node::Reserved(r) => format!("reserved:{}", r.canonical().trim_end()),
        Node::Extensions(e) => format!("extensions:{}", e.canonical().trim_end()),
    })
}

/// Oneof members pair by field name
fn member_key(node: &Node) -> Option<String> {
    match node {
        Node::Field(f) => Some(format!("member:{}", f.name)),
        other => identity_key(other),
    }
}

fn child_scope(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

// ── Diff algorithms ────────────────────────────────────────

/// Diff two optional nodes within `scope`
///
/// - `None → Some`: one addition
/// - `Some → None`: one removal
/// - equal after normalization: nothing
/// - different identity (kind or key): a removal plus an addition
/// - otherwise: the kind-specific changes
pub fn diff(scope: &str, before: Option<&Node>, after: Option<&Node>) -> Vec<NodeDiff> {
    match (before, after) {
        (None, None) => Vec::new(),
        (None, Some(after)) => NodeDiff::added(scope, &after.normalize()).into_iter().collect(),
        (Some(before), None) => NodeDiff::removed(scope, &before.normalize()).into_iter().collect(),
        (Some(before), Some(after)) => {
            let (before, after) = (before.normalize(), after.normalize());
            if before.kind() != after.kind() || identity_key(&before) != identity_key(&after) {
                return replaced(scope, &before, &after);
            }
            compare(scope, &before, &after)
        }
    }
}

/// Diff two sibling lists, pairing nodes by [`identity_key`]
pub fn diff_sets(scope: &str, before: &[Node], after: &[Node]) -> Vec<NodeDiff> {
    diff_sets_by(scope, before, after, identity_key)
}

/// Index nodes by key; repeated keys get an occurrence suffix so aliases
/// and duplicates pair up in order
fn index_by(nodes: &[Node], key: fn(&Node) -> Option<String>) -> Vec<(String, Node)> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut indexed = Vec::new();
    for node in nodes {
        let Some(base) = key(node) else {
            continue;
        };
        let count = seen.entry(base.clone()).or_insert(0);
        indexed.push((format!("{}#{}", base, count), node.normalize()));
        *count += 1;
    }
    indexed
}

fn diff_sets_by(
    scope: &str,
    before: &[Node],
    after: &[Node],
    key: fn(&Node) -> Option<String>,
) -> Vec<NodeDiff> {
    let before = index_by(before, key);
    let after = index_by(after, key);
    let before_keys: BTreeMap<&str, &Node> = before.iter().map(|(k, n)| (k.as_str(), n)).collect();
    let after_keys: BTreeMap<&str, &Node> = after.iter().map(|(k, n)| (k.as_str(), n)).collect();

    let mut removed = Vec::new();
    let mut changed = Vec::new();
    for (k, node) in &before {
        match after_keys.get(k.as_str()) {
            None => removed.extend(NodeDiff::removed(scope, node)),
            Some(counterpart) => changed.extend(matched(scope, node, counterpart)),
        }
    }
    let added = after
        .iter()
        .filter(|(k, _)| !before_keys.contains_key(k.as_str()))
        .filter_map(|(_, node)| NodeDiff::added(scope, node));

    let mut diffs = removed;
    diffs.extend(added);
    diffs.extend(changed);
    trace!(scope, before = before.len(), after = after.len(), diffs = diffs.len(), "diffed node set");
    diffs
}

/// A paired couple: equal, replaced by a different kind, or changed
fn matched(scope: &str, before: &Node, after: &Node) -> Vec<NodeDiff> {
    if before.kind() != after.kind() {
        return replaced(scope, before, after);
    }
    compare(scope, before, after)
}

fn replaced(scope: &str, before: &Node, after: &Node) -> Vec<NodeDiff> {
    NodeDiff::removed(scope, before)
        .into_iter()
        .chain(NodeDiff::added(scope, after))
        .collect()
}

/// Kind-specific comparison of two normalized nodes of the same kind
fn compare(scope: &str, before: &Node, after: &Node) -> Vec<NodeDiff> {
    if before == after {
        return Vec::new();
    }
    let change = |kind| NodeDiff::changed(kind, scope, before, after);
    let mut diffs = Vec::new();

    match (before, after) {
        (Node::Package(_), Node::Package(_)) => diffs.push(change(DiffKind::PackageChanged)),
        (Node::Import(b), Node::Import(a)) => {
            if b.modifier != a.modifier {
                diffs.push(change(DiffKind::ImportModifierChanged));
            }
        }
        (Node::Option(_), Node::Option(_)) => diffs.push(change(DiffKind::OptionValueChanged)),
        (Node::EnumValue(b), Node::EnumValue(a)) => {
            if b.name != a.name {
                diffs.push(change(DiffKind::EnumValueNameChanged));
            }
            if b.number != a.number {
                return replaced(scope, before, after);
            }
            if b.options != a.options {
                diffs.push(change(DiffKind::OptionsChanged));
            }
        }
        (Node::Field(b), Node::Field(a)) => {
            if b.name != a.name {
                diffs.push(change(DiffKind::FieldNameChanged));
            }
            if b.number != a.number {
                diffs.push(change(DiffKind::FieldNumberChanged));
            }
            if b.field_type != a.field_type {
                diffs.push(change(DiffKind::FieldTypeChanged));
            }
            if b.label != a.label {
                diffs.push(change(DiffKind::FieldLabelChanged));
            }
            if b.options != a.options {
                diffs.push(change(DiffKind::OptionsChanged));
            }
        }
        (Node::Map(b), Node::Map(a)) => {
            if b.name != a.name {
                diffs.push(change(DiffKind::FieldNameChanged));
            }
            if b.number != a.number {
                diffs.push(change(DiffKind::FieldNumberChanged));
            }
            if b.key_type != a.key_type || b.value_type != a.value_type {
                diffs.push(change(DiffKind::FieldTypeChanged));
            }
            if b.options != a.options {
                diffs.push(change(DiffKind::OptionsChanged));
            }
        }
        (Node::Rpc(b), Node::Rpc(a)) => {
            if b.request != a.request {
                diffs.push(change(DiffKind::RpcRequestChanged));
            }
            if b.response != a.response {
                diffs.push(change(DiffKind::RpcResponseChanged));
            }
            if b.options != a.options {
                diffs.push(change(DiffKind::OptionsChanged));
            }
        }
        (Node::Message(b), Node::Message(a)) => {
            diffs = diff_sets(&child_scope(scope, b.name.as_str()), &b.nodes, &a.nodes);
        }
        (Node::Enum(b), Node::Enum(a)) => {
            diffs = diff_sets(&child_scope(scope, b.name.as_str()), &b.nodes, &a.nodes);
        }
        (Node::Service(b), Node::Service(a)) => {
            diffs = diff_sets(&child_scope(scope, b.name.as_str()), &b.nodes, &a.nodes);
        }
        (Node::Extend(b), Node::Extend(a)) => {
            diffs = diff_sets(&child_scope(scope, b.target.as_str()), &b.nodes, &a.nodes);
        }
        (Node::OneOf(b), Node::OneOf(a)) => {
            diffs = diff_sets_by(&child_scope(scope, b.name.as_str()), &b.nodes, &a.nodes, member_key);
        }
        _ => diffs = replaced(scope, before, after),
    }
    diffs
}

impl File {
    /// All differences from `self` (before) to `other` (after)
    ///
    /// Order: package, imports, options, then declarations.
    pub fn diff(&self, other: &File) -> Vec<NodeDiff> {
        let before_package = self.package.clone().map(Node::Package);
        let after_package = other.package.clone().map(Node::Package);
        let mut diffs = diff("", before_package.as_ref(), after_package.as_ref());

        let as_nodes = |imports: &[Import]| -> Vec<Node> {
            imports.iter().cloned().map(Node::Import).collect()
        };
        diffs.extend(diff_sets("", &as_nodes(&self.imports), &as_nodes(&other.imports)));

        let as_nodes = |options: &[ProtoOption]| -> Vec<Node> {
            options.iter().cloned().map(Node::Option).collect()
        };
        diffs.extend(diff_sets("", &as_nodes(&self.options), &as_nodes(&other.options)));

        diffs.extend(diff_sets("", &self.nodes, &other.nodes));
        debug!(diffs = diffs.len(), "diffed schema files");
        diffs
    }
}
