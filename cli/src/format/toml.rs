use crate::format::traits::StructuredFormat;
use bmtree::error::{BmtreeError, Result};
use serde::Serialize;

/// TOML needs a table at the top level; sequences must be wrapped by the caller
pub struct TomlOutput<'a, T: Serialize>(pub &'a T);

impl<T: Serialize> StructuredFormat for TomlOutput<'_, T> {
    fn render(&self) -> Result<String> {
        toml::to_string_pretty(self.0)
            .map_err(|e| BmtreeError::InvalidInput(format!("cannot render as TOML: {}", e)))
    }
}
