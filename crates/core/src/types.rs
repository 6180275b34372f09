//! Column data types.

use core::fmt;

/// Supported column data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
    /// Binary data
    Bytes,
}

impl DataType {
    /// Returns whether this type is nullable when a column does not say otherwise.
    pub fn is_nullable_by_default(&self) -> bool {
        matches!(self, DataType::Bytes)
    }

    /// Returns whether this type can be used as an index key column.
    pub fn is_indexable(&self) -> bool {
        !matches!(self, DataType::Bytes)
    }

    /// Returns whether values of this type compare numerically with each other.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INTEGER",
            DataType::Int64 => "BIGINT",
            DataType::Float64 => "DOUBLE PRECISION",
            DataType::String => "CHARACTER VARYING",
            DataType::DateTime => "TIMESTAMP",
            DataType::Bytes => "BINARY VARYING",
        };
        f.write_str(name)
    }
}
