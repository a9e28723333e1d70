//! Error types for loading and running programs.

use std::fmt;

use thiserror::Error;

use crate::runtime::phi::Phi;
use crate::runtime::value::TypeTag;
use crate::runtime::vertices::Vertex;

/// The control signal raised by `try.raise`.
///
/// It travels upward as an ordinary `Err` until the `try` object whose
/// vertex equals `target` catches it.
#[derive(Clone)]
pub struct Signal {
    pub target: Vertex,
    pub payload: Phi,
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({} <- {:?})", self.target, self.payload)
    }
}

/// Kind of a runtime error, with `Failure` wrappers looked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotYetBound,
    AlreadyBound,
    NoSuchAttribute,
    NotData,
    TypeMismatch,
    UnsupportedVertexType,
    Raise,
    General,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotYetBound => "NotYetBound",
            ErrorKind::AlreadyBound => "AlreadyBound",
            ErrorKind::NoSuchAttribute => "NoSuchAttribute",
            ErrorKind::NotData => "NotData",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::UnsupportedVertexType => "UnsupportedVertexType",
            ErrorKind::Raise => "Raise",
            ErrorKind::General => "General",
        };
        write!(f, "{}", name)
    }
}

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("The attribute '{attr}' of {object} is not bound yet, can't read")]
    NotYetBound { attr: String, object: String },

    #[error("The attribute '{attr}' of {object} is already bound, can't rebind")]
    AlreadyBound { attr: String, object: String },

    #[error("Can't find attribute '{attr}' in {object}")]
    NoSuchAttribute { attr: String, object: String },

    #[error("Can't dataize {object}: {reason}")]
    NotData { object: String, reason: String },

    #[error("The argument '.{attr}' is of type '{found}', not '{expected}' as expected")]
    TypeMismatch {
        attr: String,
        expected: TypeTag,
        found: TypeTag,
    },

    #[error("Unknown type for vertex allocation: {0}")]
    UnsupportedVertexType(String),

    #[error("Nobody caught the raise aimed at {}", .0.target)]
    Raise(Signal),

    #[error("{message}")]
    General { message: String },

    #[error("{source}\n  while dataizing: {term}")]
    Failure {
        term: String,
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    pub fn not_yet_bound(attr: impl Into<String>, object: impl Into<String>) -> Self {
        Self::NotYetBound {
            attr: attr.into(),
            object: object.into(),
        }
    }

    pub fn already_bound(attr: impl Into<String>, object: impl Into<String>) -> Self {
        Self::AlreadyBound {
            attr: attr.into(),
            object: object.into(),
        }
    }

    pub fn no_such_attribute(attr: impl Into<String>, object: impl Into<String>) -> Self {
        Self::NoSuchAttribute {
            attr: attr.into(),
            object: object.into(),
        }
    }

    pub fn not_data(object: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotData {
            object: object.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(attr: impl Into<String>, expected: TypeTag, found: TypeTag) -> Self {
        Self::TypeMismatch {
            attr: attr.into(),
            expected,
            found,
        }
    }

    pub fn unsupported_vertex_type(tag: impl Into<String>) -> Self {
        Self::UnsupportedVertexType(tag.into())
    }

    /// The innermost error, past any `Failure` context.
    pub fn root_cause(&self) -> &RuntimeError {
        match self {
            Self::Failure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Self::NotYetBound { .. } => ErrorKind::NotYetBound,
            Self::AlreadyBound { .. } => ErrorKind::AlreadyBound,
            Self::NoSuchAttribute { .. } => ErrorKind::NoSuchAttribute,
            Self::NotData { .. } => ErrorKind::NotData,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::UnsupportedVertexType(_) => ErrorKind::UnsupportedVertexType,
            Self::Raise(_) => ErrorKind::Raise,
            Self::General { .. } | Self::Failure { .. } => ErrorKind::General,
        }
    }

    /// Control signals pass through dataization untouched.
    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Raise(_))
    }
}

/// Errors in a program tree handed over by the parser.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Unknown data type '{tag}' at line {line}")]
    UnknownDataType { tag: String, line: usize },

    #[error("Invalid {tag} literal '{text}' at line {line}: {reason}")]
    InvalidLiteral {
        tag: String,
        text: String,
        reason: String,
        line: usize,
    },

    #[error("Duplicate attribute '{attr}' in '{object}' at line {line}")]
    DuplicateAttribute {
        object: String,
        attr: String,
        line: usize,
    },

    #[error("The name '{name}' is reserved and can't be declared (line {line})")]
    ReservedName { name: String, line: usize },

    #[error("Only the last parameter may be vararg, '{name}' is not (line {line})")]
    MisplacedVararg { name: String, line: usize },

    #[error("Method '.{method}' has no receiver at line {line}")]
    MissingReceiver { method: String, line: usize },

    #[error("{what} at line {line} must have a name")]
    Unnamed { what: &'static str, line: usize },

    #[error("Top-level object '{name}' at line {line} must be an abstraction")]
    NotAnAbstraction { name: String, line: usize },

    #[error("There is no object '{0}' to run")]
    MissingRoot(String),
}

impl TreeError {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownDataType { line, .. }
            | Self::InvalidLiteral { line, .. }
            | Self::DuplicateAttribute { line, .. }
            | Self::ReservedName { line, .. }
            | Self::MisplacedVararg { line, .. }
            | Self::MissingReceiver { line, .. }
            | Self::Unnamed { line, .. }
            | Self::NotAnAbstraction { line, .. } => Some(*line),
            Self::MissingRoot(_) => None,
        }
    }
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum PhicError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Runtime error: {}: {}", .0.kind(), .0)]
    Runtime(#[from] RuntimeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_failures() {
        let inner = RuntimeError::not_yet_bound("x", "app");
        let wrapped = RuntimeError::Failure {
            term: "app⟦x ↦ Ø⟧".to_string(),
            source: Box::new(inner),
        };
        assert_eq!(wrapped.kind(), ErrorKind::NotYetBound);
        assert!(wrapped.to_string().contains("while dataizing: app⟦x ↦ Ø⟧"));
    }

    #[test]
    fn test_type_mismatch_message_names_both_tags() {
        let err = RuntimeError::type_mismatch("x", TypeTag::Int, TypeTag::String);
        assert_eq!(
            err.to_string(),
            "The argument '.x' is of type 'string', not 'int' as expected"
        );
    }

    #[test]
    fn test_runtime_error_wraps_with_kind() {
        let err: PhicError = RuntimeError::no_such_attribute("foo", "app").into();
        assert_eq!(
            err.to_string(),
            "Runtime error: NoSuchAttribute: Can't find attribute 'foo' in app"
        );
    }
}
