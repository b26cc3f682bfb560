//! Serializer: renders AST nodes back to proto3 source text
//!
//! Output format:
//! - 2-space indentation per nesting level
//! - One statement per line; containers open with `{` on the header line
//! - Blank lines between file sections and between top-level declarations
//! - Integers in decimal, floats always with a decimal point
//! - String literals keep the quote style they were written with
//!
//! `parse(serialize(x))` is structurally equal to `x`; the text is not
//! byte-identical to the original source.

use crate::parser::ast::*;

/// Rendering to proto3 text
pub trait ToProto {
    /// Append this node to `out`, indented by `indent` spaces
    fn write_proto(&self, out: &mut String, indent: usize);

    /// Render as a standalone string
    fn serialize(&self) -> String {
        let mut out = String::new();
        self.write_proto(&mut out, 0);
        out
    }
}

// ── Helpers ────────────────────────────────────────────────

fn write_indent(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push(' ');
    }
}

fn write_line(out: &mut String, indent: usize, line: &str) {
    write_indent(out, indent);
    out.push_str(line);
    out.push('\n');
}

fn write_constant(out: &mut String, value: &Constant) {
    match value {
        Constant::Int(n) => out.push_str(&n.to_string()),
        Constant::Float(f) => {
            let s = format!("{}", f);
            if s.contains('.') {
                out.push_str(&s);
            } else {
                out.push_str(&format!("{}.0", f));
            }
        }
        Constant::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Constant::Str(s) => out.push_str(&s.to_string()),
        Constant::Ident(i) => out.push_str(i.as_str()),
    }
}

fn write_assignment(out: &mut String, option: &ProtoOption) {
    out.push_str(option.name.as_str());
    out.push_str(" = ");
    write_constant(out, &option.value);
}

/// ` [ a = 1, b = 2 ]`, or nothing for an empty list
fn write_option_list(out: &mut String, options: &[ProtoOption]) {
    if options.is_empty() {
        return;
    }
    out.push_str(" [ ");
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_assignment(out, option);
    }
    out.push_str(" ]");
}

fn write_range(out: &mut String, range: &Range) {
    out.push_str(&range.min().to_string());
    match range.max() {
        Some(RangeMax::Value(max)) => out.push_str(&format!(" to {}", max)),
        Some(RangeMax::Max) => out.push_str(" to max"),
        None => {}
    }
}

fn write_ranges(out: &mut String, ranges: &[Range]) {
    for (i, range) in ranges.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_range(out, range);
    }
}

fn write_container(out: &mut String, indent: usize, header: &str, nodes: &[Node]) {
    write_indent(out, indent);
    out.push_str(header);
    if nodes.is_empty() {
        out.push_str(" {}\n");
        return;
    }
    out.push_str(" {\n");
    for node in nodes {
        node.write_proto(out, indent + 2);
    }
    write_line(out, indent, "}");
}

// ── Leaf statements ────────────────────────────────────────

impl ToProto for Syntax {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_line(out, indent, &format!("syntax = {};", self.value));
    }
}

impl ToProto for Package {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_line(out, indent, &format!("package {};", self.name));
    }
}

impl ToProto for Import {
    fn write_proto(&self, out: &mut String, indent: usize) {
        let line = match self.modifier {
            Some(modifier) => format!("import {} {};", modifier.as_str(), self.path),
            None => format!("import {};", self.path),
        };
        write_line(out, indent, &line);
    }
}

impl ToProto for ProtoOption {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        out.push_str("option ");
        write_assignment(out, self);
        out.push_str(";\n");
    }
}

impl ToProto for Comment {
    fn write_proto(&self, out: &mut String, indent: usize) {
        let line = match self.kind {
            CommentKind::SingleLine => format!("//{}", self.text),
            CommentKind::MultiLine => format!("/*{}*/", self.text),
        };
        write_line(out, indent, &line);
    }
}

impl ToProto for Reserved {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        out.push_str("reserved ");
        match self.entries() {
            ReservedEntries::Ranges(ranges) => write_ranges(out, ranges),
            ReservedEntries::Fields(fields) => {
                let names: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
                out.push_str(&names.join(", "));
            }
        }
        out.push_str(";\n");
    }
}

impl ToProto for Extensions {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        out.push_str("extensions ");
        write_ranges(out, &self.ranges);
        out.push_str(";\n");
    }
}

impl ToProto for EnumValue {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        out.push_str(&format!("{} = {}", self.name, self.number));
        write_option_list(out, &self.options);
        out.push_str(";\n");
    }
}

impl ToProto for MessageField {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        if let Some(label) = self.label.keyword() {
            out.push_str(label);
            out.push(' ');
        }
        out.push_str(&format!("{} {} = {}", self.field_type, self.name, self.number));
        write_option_list(out, &self.options);
        out.push_str(";\n");
    }
}

impl ToProto for Map {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        out.push_str(&format!(
            "map<{}, {}> {} = {}",
            self.key_type.keyword(),
            self.value_type,
            self.name,
            self.number
        ));
        write_option_list(out, &self.options);
        out.push_str(";\n");
    }
}

impl ToProto for Rpc {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_indent(out, indent);
        out.push_str(&format!(
            "rpc {} ({}) returns ({})",
            self.name, self.request, self.response
        ));
        if self.options.is_empty() {
            out.push_str(";\n");
            return;
        }
        out.push_str(" {\n");
        for option in &self.options {
            option.write_proto(out, indent + 2);
        }
        write_line(out, indent, "}");
    }
}

// ── Containers ─────────────────────────────────────────────

impl ToProto for Enum {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_container(out, indent, &format!("enum {}", self.name), &self.nodes);
    }
}

impl ToProto for OneOf {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_container(out, indent, &format!("oneof {}", self.name), &self.nodes);
    }
}

impl ToProto for Message {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_container(out, indent, &format!("message {}", self.name), &self.nodes);
    }
}

impl ToProto for Extend {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_container(out, indent, &format!("extend {}", self.target), &self.nodes);
    }
}

impl ToProto for Service {
    fn write_proto(&self, out: &mut String, indent: usize) {
        write_container(out, indent, &format!("service {}", self.name), &self.nodes);
    }
}

impl ToProto for Node {
    fn write_proto(&self, out: &mut String, indent: usize) {
        match self {
            Node::Syntax(n) => n.write_proto(out, indent),
            Node::Package(n) => n.write_proto(out, indent),
            Node::Import(n) => n.write_proto(out, indent),
            Node::Option(n) => n.write_proto(out, indent),
            Node::Enum(n) => n.write_proto(out, indent),
            Node::EnumValue(n) => n.write_proto(out, indent),
            Node::Message(n) => n.write_proto(out, indent),
            Node::Field(n) => n.write_proto(out, indent),
            Node::OneOf(n) => n.write_proto(out, indent),
            Node::Map(n) => n.write_proto(out, indent),
            Node::Reserved(n) => n.write_proto(out, indent),
            Node::Extensions(n) => n.write_proto(out, indent),
            Node::Extend(n) => n.write_proto(out, indent),
            Node::Service(n) => n.write_proto(out, indent),
            Node::Rpc(n) => n.write_proto(out, indent),
            Node::Comment(n) => n.write_proto(out, indent),
        }
    }
}

// ── File ───────────────────────────────────────────────────

impl ToProto for File {
    /// Sections in fixed order: syntax, package, imports, options, then
    /// declarations. A comment stays attached to the declaration after it.
    fn write_proto(&self, out: &mut String, indent: usize) {
        self.syntax.write_proto(out, indent);

        if let Some(package) = &self.package {
            out.push('\n');
            package.write_proto(out, indent);
        }

        if !self.imports.is_empty() {
            out.push('\n');
            for import in &self.imports {
                import.write_proto(out, indent);
            }
        }

        if !self.options.is_empty() {
            out.push('\n');
            for option in &self.options {
                option.write_proto(out, indent);
            }
        }

        let mut after_comment = false;
        for node in &self.nodes {
            if !after_comment {
                out.push('\n');
            }
            node.write_proto(out, indent);
            after_comment = node.is_comment();
        }
    }
}
