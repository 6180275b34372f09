//! DDL commands.

use crate::catalog::Catalog;
use crate::session::User;
use crate::view::QueryCompiler;
use alloc::string::String;
use quarry_core::{Error, Result};
use tracing::debug;

/// `ALTER VIEW [IF EXISTS] name RECOMPILE`.
///
/// Recompiles the view's stored query. The caller must own the view's
/// schema. If the query no longer compiles the error is returned and the
/// view stays unscannable until a later recompile succeeds.
#[derive(Clone, Debug)]
pub struct AlterView {
    view_name: String,
    if_exists: bool,
}

impl AlterView {
    pub fn new(view_name: impl Into<String>) -> Self {
        Self {
            view_name: view_name.into(),
            if_exists: false,
        }
    }

    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// Runs the command. Returns the update count, which is always 0.
    pub fn update(
        &self,
        catalog: &mut Catalog,
        user: &User,
        compiler: &dyn QueryCompiler,
    ) -> Result<u64> {
        let Some(view) = catalog.get_view_mut(&self.view_name) else {
            if self.if_exists {
                debug!(view = %self.view_name, "ALTER VIEW IF EXISTS on a missing view");
                return Ok(0);
            }
            return Err(Error::view_not_found(self.view_name.as_str()));
        };
        user.check_schema_owner(view.schema())?;
        view.recompile(compiler, true)?;
        Ok(0)
    }
}
