/// Error type for the bmtree library
///
/// Every failure of an import, a tree operation or a store write ends up here and is
/// reported once by the CLI. `thiserror` provides the `Error` impl and `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum BmtreeError {
    /// Malformed import input (browser export does not have the expected shape)
    #[error("Format error at {path}: {message}")]
    Format { path: String, message: String },

    /// Folder document rejected by the schema check, nothing was written
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced folder or URL index does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation would make a folder its own ancestor
    #[error("Cycle error: {0}")]
    Cycle(String),

    /// Document store unreachable (cannot open, busy or locked)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Folder still has child folders and the delete policy blocks
    #[error("Folder '{0}' has child folders; delete them first or use a recursive delete")]
    FolderNotEmpty(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Any other database failure (SQLite)
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors outside of import parsing
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML parsing/serialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using BmtreeError
pub type Result<T> = std::result::Result<T, BmtreeError>;

impl BmtreeError {
    pub fn format(path: impl Into<String>, message: impl Into<String>) -> Self {
        BmtreeError::Format {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for BmtreeError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure,
            ) => BmtreeError::Connection(err.to_string()),
            _ => BmtreeError::Database(err),
        }
    }
}

impl From<serde_yaml::Error> for BmtreeError {
    fn from(err: serde_yaml::Error) -> Self {
        BmtreeError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for BmtreeError {
    fn from(err: serde_json::Error) -> Self {
        BmtreeError::Json(err.to_string())
    }
}
