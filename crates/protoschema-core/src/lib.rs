//! Protoschema Core - proto3 schema parsing and compatibility checking
//!
//! Parses proto3 IDL text into a typed tree, normalizes it to a canonical
//! form, and diffs two versions structurally so a schema registry can reject
//! breaking changes before they are registered.
//!
//! # Architecture
//!
//! ```text
//! proto text → Parser → File (AST) → Normalizer → Canonical text / SHA-256
//!                                        ↓
//!                        before, after → Diff → Vec<NodeDiff>
//!                                        ↓
//!                              CompatibilityChecker → violations
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: Same input always produces identical output
//! - **Total**: Parsing never panics; malformed input yields a `ParseError`
//! - **Canonical**: One normalized form per schema
//! - **Cosmetic-blind**: Comments and formatting never produce a diff
//!
//! # Example
//!
//! ```
//! use protoschema_core::{parse, CompatibilityChecker, DiffKind};
//!
//! let before = parse("syntax = \"proto3\";\nmessage A {}").unwrap();
//! let after = parse("syntax = \"proto3\";\nmessage A {}\nmessage B {}").unwrap();
//!
//! let report = CompatibilityChecker::default().report(&before, &after);
//! assert!(report.is_compatible());
//! assert_eq!(report.allowed[0].kind, DiffKind::MessageAdded);
//! ```

pub mod compatibility;
pub mod diff;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod serializer;


pub use compatibility::{CompatibilityChecker, CompatibilityReport};
pub use diff::{DiffKind, NodeDiff, UnknownDiffKind};
pub use error::{ParseError, Result, Span};
pub use normalizer::{canonicalize, fingerprint, Normalize};
pub use parser::ast::*;
pub use parser::parse;
pub use serializer::ToProto;

/// Version of this crate, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common surface of every schema node: canonical form, proto text and
/// structural equality
pub trait ProtoNode: Normalize + ToProto + Clone + PartialEq + std::fmt::Debug {
    /// Proto text of the normalized node
    fn canonical(&self) -> String {
        self.normalize().serialize()
    }
}

impl<T> ProtoNode for T where T: Normalize + ToProto + Clone + PartialEq + std::fmt::Debug {}
