pub mod browser;
pub mod export;
pub mod import;

pub use export::{export_file, export_tree};
pub use import::{import_file, import_value};
