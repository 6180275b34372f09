//! Column definitions.

use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;

/// A column definition in a table schema.
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
    /// Position in the table's row shape (0-based).
    index: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: data_type.is_nullable_by_default(),
            index: 0,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_indexable(&self) -> bool {
        self.data_type.is_indexable()
    }

    /// Checks that `value` may be stored in this column.
    pub fn validate(&self, value: &Value) -> Result<()> {
        match value.data_type() {
            None if self.nullable => Ok(()),
            None => Err(Error::null_constraint(self.name.as_str())),
            Some(_) if value.fits(self.data_type) => Ok(()),
            Some(got) => Err(Error::type_mismatch(self.data_type, got)),
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}
