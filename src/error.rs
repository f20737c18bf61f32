//! Error types for Convoflow.
//!
//! Construction-time failures (parsing a flow, reading a config file) are
//! represented by the `ConvoflowError` enum. Failures that happen while a
//! session is running are never raised: they travel on the
//! [`ExecutionOutcome`](crate::ExecutionOutcome) as an [`ErrorKind`] plus a
//! message.

use std::{io::ErrorKind as IoErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Convoflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum ConvoflowError {
    /// Engine-level errors (unknown session, unknown flow).
    #[error("{0}")]
    Engine(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML, etc.).
    #[error("{0}")]
    Convert(String),

    /// Flow definition errors.
    #[error("{0}")]
    Flow(String),

    /// Node definition errors.
    #[error("{0}")]
    Node(String),

    /// Node type tag that no handler is registered for.
    #[error("unsupported node type: {0}")]
    UnsupportedNode(String),

    /// Edge definition errors.
    #[error("{0}")]
    Edge(String),

    /// Action execution errors.
    #[error("{0}")]
    Action(String),

    /// Session lifecycle errors.
    #[error("{0}")]
    Session(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),

    /// Event queue errors.
    #[error("{0}")]
    Queue(String),
}

/// Classification of a failed step, carried on the execution outcome.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The flow has no `start` node.
    NoStartNode,
    /// The node's type tag has no handler.
    UnsupportedNodeType,
    /// A required answer was blank.
    MissingRequiredField,
    /// The answer failed the node's validation rules.
    InvalidInput,
    /// The answer selected a branch that has no edge.
    NoMatchingEdge,
    /// Too many consecutive autonomous steps.
    LoopGuardTripped,
    /// A handler failed or panicked.
    HandlerException,
    /// The call is not valid in the session's current state.
    InvalidState,
    /// An edge points at a node that does not exist.
    NodeNotFound,
}

impl ErrorKind {
    /// Whether a session must stop after an outcome of this kind.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ErrorKind::MissingRequiredField | ErrorKind::InvalidInput | ErrorKind::NoMatchingEdge | ErrorKind::InvalidState
        )
    }
}

impl From<ConvoflowError> for String {
    fn from(val: ConvoflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for ConvoflowError {
    fn from(error: std::io::Error) -> Self {
        ConvoflowError::IoError(error.to_string())
    }
}

impl From<ConvoflowError> for std::io::Error {
    fn from(val: ConvoflowError) -> Self {
        std::io::Error::new(IoErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for ConvoflowError {
    fn from(_: FromUtf8Error) -> Self {
        ConvoflowError::Convert("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for ConvoflowError {
    fn from(error: serde_json::Error) -> Self {
        ConvoflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for ConvoflowError {
    fn from(error: toml::de::Error) -> Self {
        ConvoflowError::Config(error.to_string())
    }
}

impl From<regex::Error> for ConvoflowError {
    fn from(error: regex::Error) -> Self {
        ConvoflowError::Action(format!("invalid validation rule: {}", error))
    }
}

impl From<jsonschema::ValidationError<'_>> for ConvoflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        ConvoflowError::Node(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(ErrorKind::NoStartNode.is_fatal());
        assert!(ErrorKind::LoopGuardTripped.is_fatal());
        assert!(ErrorKind::HandlerException.is_fatal());
        assert!(!ErrorKind::MissingRequiredField.is_fatal());
        assert!(!ErrorKind::NoMatchingEdge.is_fatal());
    }

    #[test]
    fn test_unsupported_node_message() {
        let err = ConvoflowError::UnsupportedNode("carousel".to_string());
        assert_eq!(err.to_string(), "unsupported node type: carousel");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let value = serde_json::to_value(ErrorKind::LoopGuardTripped).unwrap();
        assert_eq!(value, serde_json::json!("loop_guard_tripped"));
        assert_eq!(ErrorKind::MissingRequiredField.as_ref(), "missing_required_field");
    }
}
