//! Error types for the scan engine.
//!
//! Every failure propagates to the statement that triggered it; nothing in
//! the index or cursor layer retries.

use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;
use thiserror::Error as ThisError;

/// Result type alias for Quarry operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Quarry operations.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: DataType, got: DataType },

    #[error("NULL not allowed for column {column}")]
    NullConstraint { column: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },

    #[error("table not found: {name}")]
    TableNotFound { name: String },

    #[error("index {index} not found in table {table}")]
    IndexNotFound { table: String, index: String },

    #[error("view not found: {name}")]
    ViewNotFound { name: String },

    #[error("duplicate key {key} in unique index {index}")]
    DuplicateKey { index: String, key: Value },

    /// The operation is not offered by this index or cursor kind.
    #[error("unsupported operation: {message}")]
    Unsupported { message: String },

    /// A stored query could not be compiled.
    #[error("compilation of {object} failed: {message}")]
    Compilation { object: String, message: String },

    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// The statement was cancelled while an evaluator was producing rows.
    #[error("statement interrupted: {statement}")]
    Interrupted { statement: String },

    /// A row producer failed while evaluating a query.
    #[error("evaluation failed: {message}")]
    Evaluation { message: String },

    /// An engine invariant was violated. Always a defect, never user error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn type_mismatch(expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch { expected, got }
    }

    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    pub fn index_not_found(table: impl Into<String>, index: impl Into<String>) -> Self {
        Error::IndexNotFound {
            table: table.into(),
            index: index.into(),
        }
    }

    pub fn view_not_found(name: impl Into<String>) -> Self {
        Error::ViewNotFound { name: name.into() }
    }

    pub fn duplicate_key(index: impl Into<String>, key: Value) -> Self {
        Error::DuplicateKey {
            index: index.into(),
            key,
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported {
            message: message.into(),
        }
    }

    pub fn compilation(object: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Compilation {
            object: object.into(),
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Error::AccessDenied {
            message: message.into(),
        }
    }

    pub fn interrupted(statement: impl Into<String>) -> Self {
        Error::Interrupted {
            statement: statement.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Returns true for errors that indicate an engine defect.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch(DataType::Int32, DataType::String);
        assert_eq!(
            err.to_string(),
            "type mismatch: expected INTEGER, got CHARACTER VARYING"
        );

        let err = Error::unsupported("previous() on a forward-only cursor");
        assert!(err.to_string().starts_with("unsupported operation"));

        let err = Error::compilation("PUBLIC.V", "column X not found");
        assert_eq!(err.to_string(), "compilation of PUBLIC.V failed: column X not found");
    }

    #[test]
    fn test_duplicate_key_carries_value() {
        let err = Error::duplicate_key("idx_id", Value::Int64(3));
        match &err {
            Error::DuplicateKey { index, key } => {
                assert_eq!(index, "idx_id");
                assert_eq!(key, &Value::Int64(3));
            }
            _ => panic!("wrong error type"),
        }
        assert!(err.to_string().contains("idx_id"));
    }

    #[test]
    fn test_is_internal() {
        assert!(Error::internal("cursor advanced after exhaustion").is_internal());
        assert!(!Error::evaluation("disk").is_internal());
    }
}
