//! Document store seam.
//!
//! A store keeps one document per folder. Writes that touch one folder are a single
//! read-modify-write unit on that one document; writes spanning several folders
//! (imports, cascading deletes, URL moves) are applied all-or-nothing.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{FolderDocument, FolderId};

/// Callback applied to documents inside a store write; returning an error aborts the
/// write and leaves the stored documents untouched.
pub type Mutation<'a> = dyn FnMut(&mut [FolderDocument]) -> Result<()> + 'a;

pub trait DocumentStore {
    fn find(&self, id: &FolderId) -> Result<Option<FolderDocument>>;

    /// The folder without a parent, if the store has been initialised
    fn find_root(&self) -> Result<Option<FolderDocument>>;

    /// Direct child folders, ordered by position
    fn find_children(&self, parent: &FolderId) -> Result<Vec<FolderDocument>>;

    /// `id` and every folder below it, read as one consistent snapshot
    fn find_subtree(&self, id: &FolderId) -> Result<Vec<FolderDocument>>;

    /// Folders whose id starts with `prefix`
    fn find_by_id_prefix(&self, prefix: &str) -> Result<Vec<FolderDocument>>;

    /// Every stored folder
    fn find_all(&self) -> Result<Vec<FolderDocument>>;

    /// Insert new documents in one transaction
    fn insert(&self, documents: &[FolderDocument]) -> Result<()>;

    /// Load the documents for `ids`, let `mutation` change them, then store them back,
    /// all within one write transaction. Fails with NotFound if any id is missing.
    fn update_many(
        &self,
        ids: &[&FolderId],
        mutation: &mut Mutation<'_>,
    ) -> Result<Vec<FolderDocument>>;

    /// Single-document form of `update_many`
    fn update(
        &self,
        id: &FolderId,
        mutation: &mut dyn FnMut(&mut FolderDocument) -> Result<()>,
    ) -> Result<FolderDocument> {
        let mut documents =
            self.update_many(&[id], &mut |docs: &mut [FolderDocument]| mutation(&mut docs[0]))?;
        Ok(documents.remove(0))
    }

    /// Re-parent `id` under `new_parent`, appended after its new siblings.
    ///
    /// The ancestor walk that rejects moves into the folder's own subtree runs inside
    /// the same write transaction as the update. `mutation` sees the document after
    /// `parent_id` and `position` are set. Fails with Cycle for the root, for the
    /// folder itself, or for any of its descendants.
    fn reparent(
        &self,
        id: &FolderId,
        new_parent: &FolderId,
        mutation: &mut dyn FnMut(&mut FolderDocument) -> Result<()>,
    ) -> Result<FolderDocument>;

    /// Delete a folder only if no folder has it as parent. Returns false when it has children.
    fn delete_leaf(&self, id: &FolderId) -> Result<bool>;

    /// Delete a folder and all folders below it, returning how many were removed
    fn delete_subtree(&self, id: &FolderId) -> Result<usize>;
}
