//! Catalog of schema objects the DDL commands act on.

use crate::view::View;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use quarry_core::{Error, Result};

/// Views keyed by name.
#[derive(Debug, Default)]
pub struct Catalog {
    views: HashMap<String, View>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view. Fails if a view with the same name exists.
    pub fn add_view(&mut self, view: View) -> Result<()> {
        if self.views.contains_key(view.name()) {
            return Err(Error::invalid_schema(format!(
                "View already exists: {}",
                view.name()
            )));
        }
        self.views.insert(view.name().to_string(), view);
        Ok(())
    }

    pub fn get_view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn get_view_mut(&mut self, name: &str) -> Option<&mut View> {
        self.views.get_mut(name)
    }

    pub fn remove_view(&mut self, name: &str) -> Option<View> {
        self.views.remove(name)
    }

    /// Names of all views, sorted.
    pub fn view_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.views.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
