//! Users and schema ownership.

use alloc::format;
use alloc::string::String;
use hashbrown::HashSet;
use quarry_core::{Error, Result};

/// A database user, as far as DDL privilege checks are concerned.
#[derive(Clone, Debug)]
pub struct User {
    name: String,
    admin: bool,
    owned_schemas: HashSet<String>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: false,
            owned_schemas: HashSet::new(),
        }
    }

    /// Creates a user with admin rights, who owns every schema.
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            admin: true,
            ..Self::new(name)
        }
    }

    /// Makes the user the owner of `schema`.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.owned_schemas.insert(schema.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn owns_schema(&self, schema: &str) -> bool {
        self.admin || self.owned_schemas.contains(schema)
    }

    /// Fails with `AccessDenied` unless the user owns `schema` or is an admin.
    pub fn check_schema_owner(&self, schema: &str) -> Result<()> {
        if self.owns_schema(schema) {
            Ok(())
        } else {
            Err(Error::access_denied(format!(
                "user {} does not own schema {}",
                self.name, schema
            )))
        }
    }
}
