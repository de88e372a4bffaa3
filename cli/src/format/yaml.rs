use crate::format::traits::StructuredFormat;
use bmtree::error::Result;
use serde::Serialize;

pub struct YamlOutput<'a, T: Serialize>(pub &'a T);

impl<T: Serialize> StructuredFormat for YamlOutput<'_, T> {
    fn render(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self.0)?)
    }
}
