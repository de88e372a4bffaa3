pub mod config;
pub mod error;
pub mod import_export;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;
pub mod tree;
pub mod utils;

// Re-export error types for convenience
pub use error::BmtreeError;
pub use repository::{DeletePolicy, Repository};
pub use store::{DocumentStore, SqliteStore};
