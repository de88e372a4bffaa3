pub mod folder;

pub use folder::{FolderDocument, FolderId, UrlEntry, UrlPatch};
