//! Error types for widecol core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while declaring record types or manipulating records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A column declaration is invalid.
    #[error("invalid declaration on {record_type}: {message}")]
    Declaration {
        /// Record type being declared.
        record_type: String,
        /// Description of the problem.
        message: String,
    },

    /// A declared column was read before any value was set.
    #[error("missing attribute {name} on {record_type}")]
    MissingAttribute {
        /// Record type of the instance.
        record_type: String,
        /// Column name.
        name: String,
    },

    /// No column (and no virtual setter) with this name exists on the type.
    #[error("unknown attribute {name} on {record_type}")]
    UnknownAttribute {
        /// Record type of the instance.
        record_type: String,
        /// Attribute name.
        name: String,
    },

    /// A key column was written after the instance was loaded.
    #[error("can't change key column {name} of a loaded {record_type}")]
    KeyImmutable {
        /// Record type of the instance.
        record_type: String,
        /// Key column name.
        name: String,
    },

    /// A list index was outside `[0, len)`.
    #[error("index {index} out of range for list {column} of length {len}")]
    IndexOutOfRange {
        /// List column name.
        column: String,
        /// Offending index.
        index: usize,
        /// Length of the list at the time of the call.
        len: usize,
    },

    /// A wholesale write supplied a value of the wrong shape.
    #[error("type mismatch on {column}: expected {expected}, got {found}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected value shape.
        expected: String,
        /// Shape that was supplied.
        found: String,
    },

    /// A collection proxy of one kind was requested for a column of another kind.
    #[error("column {column} is not a {expected} column")]
    NotACollection {
        /// Column name.
        column: String,
        /// Collection kind that was requested.
        expected: String,
    },
}

impl CoreError {
    /// Creates a declaration error.
    pub fn declaration(record_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Declaration {
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Creates a missing attribute error.
    pub fn missing_attribute(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingAttribute {
            record_type: record_type.into(),
            name: name.into(),
        }
    }

    /// Creates an unknown attribute error.
    pub fn unknown_attribute(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            record_type: record_type.into(),
            name: name.into(),
        }
    }

    /// Creates a key immutability error.
    pub fn key_immutable(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::KeyImmutable {
            record_type: record_type.into(),
            name: name.into(),
        }
    }

    /// Creates an index out of range error.
    pub fn index_out_of_range(column: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            column: column.into(),
            index,
            len,
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a not-a-collection error.
    pub fn not_a_collection(column: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::NotACollection {
            column: column.into(),
            expected: expected.into(),
        }
    }
}
