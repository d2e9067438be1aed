//! Error and diagnostic types for the migration engine.

use serde::Serialize;
use thiserror::Error;

/// The main error type for migration operations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Failed to parse the configuration document. Fatal: no partial output.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Failed to parse the state document. Fatal: no partial output.
    #[error("state parse error: {0}")]
    StateParse(#[from] serde_json::Error),

    /// A per-resource transform failed. Recoverable at document granularity.
    #[error("resource {address}: {message}")]
    Resource { address: String, message: String },

    /// A split-resource migrator met a discriminant value it does not know.
    #[error("resource {address}: unknown {field} value '{value}'")]
    UnknownVariant {
        address: String,
        field: String,
        value: String,
    },

    /// A state subtree did not have the shape the migrator expected.
    #[error("state path '{path}': expected {expected}")]
    MalformedState { path: String, expected: String },

    /// IO error surfaced by a driver-provided reader.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Create a parse error at the given source position.
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a per-resource error for the given address.
    pub fn resource(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resource {
            address: address.into(),
            message: message.into(),
        }
    }

    pub fn unknown_variant(
        address: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::UnknownVariant {
            address: address.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn malformed_state(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MalformedState {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The resource's migration failed; the document result is marked failed.
    Error,
    /// Structurally successful migration with something worth surfacing.
    Warning,
}

/// A diagnostic attached to a resource address.
///
/// Errors mark the document failed but never stop sibling processing;
/// warnings are informational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub address: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
