//! Error types for the protoschema core
//!
//! All fallible operations return `Result<T, ParseError>`.
//! "No match" is not an error: matchers return `Ok(None)` so the caller can
//! try a sibling alternative. A `ParseError` means a construct was recognized
//! but is malformed, or a node invariant was violated at construction time.

use thiserror::Error;

pub use crate::parser::source::Span;

/// Errors raised while parsing or constructing schema nodes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input ended while a committed construct still needed tokens
    #[error("Unexpected end of input at {span}: expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    /// A required token is missing from a committed construct
    #[error("Expected {expected} at {span}, found {found:?}")]
    MissingToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// Range with `min > max`
    #[error("Invalid range{}: min {min} is greater than max {max}", location(.span))]
    InvalidRange {
        min: i64,
        max: i64,
        span: Option<Span>,
    },

    #[error("Unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("Unterminated multi-line comment starting at {span}")]
    UnterminatedComment { span: Span },

    /// No permitted child construct matched inside a container
    #[error("Unrecognized construct in {context} at {span}: {found:?}")]
    UnrecognizedConstruct {
        context: String,
        found: String,
        span: Span,
    },

    #[error("Invalid identifier at {span}: {found:?}")]
    InvalidIdentifier { found: String, span: Span },

    #[error("Invalid number at {span}: {found:?}")]
    InvalidNumber { found: String, span: Span },

    /// Reserved statement declaring neither ranges nor names, or mixing both
    #[error("Invalid reserved declaration{}: {reason}", location(.span))]
    InvalidReserved { reason: String, span: Option<Span> },

    #[error("Unsupported syntax {found:?} at {span}, only \"proto3\" is supported")]
    InvalidSyntax { found: String, span: Span },

    #[error("Missing syntax declaration, expected `syntax = \"proto3\";`")]
    MissingSyntax,

    #[error("Duplicate {what} declaration at {span}")]
    DuplicateDeclaration { what: String, span: Span },

    /// Containers nested deeper than [`MAX_NESTING_DEPTH`](crate::parser::source::MAX_NESTING_DEPTH)
    #[error("Nesting deeper than {limit} levels at {span}")]
    NestingTooDeep { limit: usize, span: Span },
}

impl ParseError {
    /// Attach a source position to construction-time errors that lack one.
    pub fn with_span(self, at: Span) -> Self {
        match self {
            ParseError::InvalidRange {
                min,
                max,
                span: None,
            } => ParseError::InvalidRange {
                min,
                max,
                span: Some(at),
            },
            ParseError::InvalidReserved { reason, span: None } => ParseError::InvalidReserved {
                reason,
                span: Some(at),
            },
            other => other,
        }
    }

    /// Source position of the error, when known
    pub fn span(&self) -> Option<&Span> {
        match self {
            ParseError::UnexpectedEof { span, .. }
            | ParseError::MissingToken { span, .. }
            | ParseError::UnterminatedString { span }
            | ParseError::UnterminatedComment { span }
            | ParseError::UnrecognizedConstruct { span, .. }
            | ParseError::InvalidIdentifier { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::DuplicateDeclaration { span, .. }
            | ParseError::NestingTooDeep { span, .. } => Some(span),
            ParseError::InvalidRange { span, .. } | ParseError::InvalidReserved { span, .. } => {
                span.as_ref()
            }
            ParseError::MissingSyntax => None,
        }
    }
}

fn location(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at {}", span),
        None => String::new(),
    }
}

/// Result type alias for protoschema operations
pub type Result<T> = std::result::Result<T, ParseError>;
