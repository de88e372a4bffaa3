use crate::format::traits::StructuredFormat;
use bmtree::error::Result;
use serde::Serialize;

pub struct JsonOutput<'a, T: Serialize>(pub &'a T);

impl<T: Serialize> StructuredFormat for JsonOutput<'_, T> {
    fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.0)?)
    }
}
