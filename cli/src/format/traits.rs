use bmtree::error::Result;

/// A value rendered in one of the structured output formats
pub trait StructuredFormat {
    fn render(&self) -> Result<String>;
}
