//! Folder and URL operations on top of a `DocumentStore`.
//!
//! Every write that changes a folder's URL list goes through `DocumentStore::update`
//! on that one folder document, and every document is checked against the folder
//! schema before the store commits it.

use crate::error::{BmtreeError, Result};
use crate::models::{FolderDocument, FolderId, UrlEntry, UrlPatch};
use crate::schema;
use crate::store::DocumentStore;
use crate::tree::BookmarkTree;
use serde::{Deserialize, Serialize};

/// Shortest id prefix accepted by `Repository::resolve`
pub const MIN_PREFIX_LEN: usize = 4;

/// What happens to child folders when their parent is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse to delete a folder that still has child folders
    #[default]
    Block,
    /// Delete the folder together with every folder below it
    Cascade,
}

/// One level of a folder: its child folders and its embedded URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Children {
    pub folders: Vec<FolderDocument>,
    pub urls: Vec<UrlEntry>,
}

/// A URL found by `Repository::find_urls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMatch {
    pub folder_id: FolderId,
    pub folder_name: String,
    pub index: usize,
    pub entry: UrlEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub root: FolderId,
    pub folders: usize,
    pub urls: usize,
}

pub struct Repository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn root(&self) -> Result<Option<FolderDocument>> {
        self.store.find_root()
    }

    /// Root folder, created with `name` if the store is still empty
    pub fn ensure_root(&self, name: &str) -> Result<FolderDocument> {
        if let Some(root) = self.store.find_root()? {
            return Ok(root);
        }
        let doc = FolderDocument::new(name.trim(), None, 0);
        schema::validate_document(&doc)?;
        self.store.insert(std::slice::from_ref(&doc))?;
        log::info!("Created root folder '{}' ({})", doc.name, doc.id);
        Ok(doc)
    }

    pub fn folder(&self, id: &FolderId) -> Result<FolderDocument> {
        self.store
            .find(id)?
            .ok_or_else(|| BmtreeError::NotFound(format!("folder {}", id)))
    }

    /// Map a full id or a unique id prefix to a folder id
    pub fn resolve(&self, input: &str) -> Result<FolderId> {
        let input = input.trim();
        if input.is_empty() {
            return Err(BmtreeError::InvalidInput("empty folder id".to_string()));
        }
        let exact = FolderId::from(input);
        if self.store.find(&exact)?.is_some() {
            return Ok(exact);
        }
        if input.len() < MIN_PREFIX_LEN {
            return Err(BmtreeError::NotFound(format!("folder {}", input)));
        }

        let mut matches = self.store.find_by_id_prefix(input)?;
        match matches.len() {
            0 => Err(BmtreeError::NotFound(format!("folder {}", input))),
            1 => Ok(matches.remove(0).id),
            n => Err(BmtreeError::InvalidInput(format!(
                "'{}' matches {} folders, give more characters",
                input, n
            ))),
        }
    }

    fn next_position(&self, parent: &FolderId) -> Result<u32> {
        Ok(self
            .store
            .find_children(parent)?
            .iter()
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0))
    }

    /// Create a folder under `parent`.
    ///
    /// Without a parent the folder becomes the root of an empty store, or a child of
    /// the existing root otherwise.
    pub fn create_folder(&self, parent: Option<&FolderId>, name: &str) -> Result<FolderDocument> {
        let parent_id = match parent {
            Some(id) => Some(self.folder(id)?.id),
            None => self.store.find_root()?.map(|root| root.id),
        };
        let doc = match parent_id {
            Some(pid) => {
                let position = self.next_position(&pid)?;
                FolderDocument::new(name.trim(), Some(pid), position)
            }
            None => FolderDocument::new(name.trim(), None, 0),
        };

        schema::validate_document(&doc)?;
        self.store.insert(std::slice::from_ref(&doc))?;
        log::debug!("Created folder '{}' ({})", doc.name, doc.id);
        Ok(doc)
    }

    /// Fully materialised snapshot of `id` and everything below it
    pub fn read_subtree(&self, id: &FolderId) -> Result<BookmarkTree> {
        let documents = self.store.find_subtree(id)?;
        if documents.is_empty() {
            return Err(BmtreeError::NotFound(format!("folder {}", id)));
        }
        BookmarkTree::from_documents(id, documents)
    }

    /// The whole tree, or `None` for an empty store
    pub fn read_all(&self) -> Result<Option<BookmarkTree>> {
        match self.store.find_root()? {
            Some(root) => self.read_subtree(&root.id).map(Some),
            None => Ok(None),
        }
    }

    pub fn list_children(&self, id: &FolderId) -> Result<Children> {
        let folder = self.folder(id)?;
        let folders = self.store.find_children(id)?;
        Ok(Children {
            folders,
            urls: folder.urls,
        })
    }

    pub fn rename_folder(&self, id: &FolderId, name: &str) -> Result<FolderDocument> {
        let name = name.trim();
        let doc = self.store.update(id, &mut |doc| {
            doc.name = name.to_string();
            doc.touch();
            schema::validate_document(doc)
        })?;
        log::debug!("Renamed folder {} to '{}'", id, name);
        Ok(doc)
    }

    /// Re-parent a folder. Only the moved folder's document is written.
    pub fn move_folder(&self, id: &FolderId, new_parent: &FolderId) -> Result<FolderDocument> {
        let doc = self.store.reparent(id, new_parent, &mut |doc| {
            doc.touch();
            schema::validate_document(doc)
        })?;
        log::debug!("Moved folder {} under {}", id, new_parent);
        Ok(doc)
    }

    /// Delete a folder with its embedded URLs. Returns the number of folders removed.
    pub fn delete_folder(&self, id: &FolderId, policy: DeletePolicy) -> Result<usize> {
        let doc = self.folder(id)?;
        let deleted = match policy {
            DeletePolicy::Block => {
                if !self.store.delete_leaf(id)? {
                    return Err(BmtreeError::FolderNotEmpty(doc.name));
                }
                1
            }
            DeletePolicy::Cascade => self.store.delete_subtree(id)?,
        };
        log::debug!("Deleted folder '{}' ({} folder(s) removed)", doc.name, deleted);
        Ok(deleted)
    }

    /// Append a URL to a folder, returning its index
    pub fn add_url(&self, folder: &FolderId, mut entry: UrlEntry) -> Result<usize> {
        normalize_entry(&mut entry);

        let mut index = 0;
        self.store.update(folder, &mut |doc| {
            doc.urls.push(entry.clone());
            index = doc.urls.len() - 1;
            doc.touch();
            schema::validate_document(doc)
        })?;
        log::debug!("Added url '{}' to folder {} at #{}", entry.name, folder, index);
        Ok(index)
    }

    pub fn update_url(&self, folder: &FolderId, index: usize, patch: &UrlPatch) -> Result<UrlEntry> {
        if patch.is_empty() {
            return Err(BmtreeError::InvalidInput("nothing to update".to_string()));
        }

        let doc = self.store.update(folder, &mut |doc| {
            let entry = doc
                .urls
                .get_mut(index)
                .ok_or_else(|| missing_url(folder, index))?;
            patch.apply(entry);
            normalize_entry(entry);
            doc.touch();
            schema::validate_document(doc)
        })?;
        log::debug!("Updated url #{} of folder {}", index, folder);
        Ok(doc.urls[index].clone())
    }

    pub fn remove_url(&self, folder: &FolderId, index: usize) -> Result<UrlEntry> {
        let mut removed = None;
        self.store.update(folder, &mut |doc| {
            if index >= doc.urls.len() {
                return Err(missing_url(folder, index));
            }
            removed = Some(doc.urls.remove(index));
            doc.touch();
            schema::validate_document(doc)
        })?;
        log::debug!("Removed url #{} from folder {}", index, folder);
        removed.ok_or_else(|| missing_url(folder, index))
    }

    /// Move a URL to the end of another folder's list (or of its own), returning the new index
    pub fn move_url(&self, from: &FolderId, index: usize, to: &FolderId) -> Result<usize> {
        let mut new_index = 0;

        if from == to {
            self.store.update(from, &mut |doc| {
                if index >= doc.urls.len() {
                    return Err(missing_url(from, index));
                }
                let entry = doc.urls.remove(index);
                doc.urls.push(entry);
                new_index = doc.urls.len() - 1;
                doc.touch();
                schema::validate_document(doc)
            })?;
        } else {
            self.store.update_many(&[from, to], &mut |docs| {
                let (source, target) = docs.split_at_mut(1);
                let (source, target) = (&mut source[0], &mut target[0]);
                if index >= source.urls.len() {
                    return Err(missing_url(from, index));
                }
                target.urls.push(source.urls.remove(index));
                new_index = target.urls.len() - 1;
                source.touch();
                target.touch();
                schema::validate_document(source)?;
                schema::validate_document(target)
            })?;
        }

        log::debug!("Moved url #{} of folder {} to {} #{}", index, from, to, new_index);
        Ok(new_index)
    }

    /// Persist an imported tree.
    ///
    /// Into an empty store the tree's root becomes the store root; otherwise the tree
    /// is attached below `parent`, or below the existing root. All documents are
    /// validated before anything is written, then inserted in one transaction.
    pub fn import_tree(&self, tree: &BookmarkTree, parent: Option<&FolderId>) -> Result<ImportSummary> {
        let mut documents = tree.to_documents();

        let attach_to = match parent {
            Some(id) => Some(self.folder(id)?.id),
            None => self.store.find_root()?.map(|root| root.id),
        };
        if let Some(pid) = attach_to {
            let position = self.next_position(&pid)?;
            documents[0].parent_id = Some(pid);
            documents[0].position = position;
        }

        schema::validate_documents(&documents)?;
        self.store.insert(&documents)?;

        let summary = ImportSummary {
            root: tree.root_id().clone(),
            folders: documents.len(),
            urls: tree.url_count(),
        };
        log::info!(
            "Imported {} folder(s) and {} url(s) as '{}'",
            summary.folders,
            summary.urls,
            tree.root().name
        );
        Ok(summary)
    }

    /// Case-insensitive search over URL names and addresses
    pub fn find_urls(&self, query: &str) -> Result<Vec<UrlMatch>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(BmtreeError::InvalidInput("empty search query".to_string()));
        }

        let mut matches = Vec::new();
        for doc in self.store.find_all()? {
            for (index, entry) in doc.urls.iter().enumerate() {
                if entry.name.to_lowercase().contains(&needle)
                    || entry.address.to_lowercase().contains(&needle)
                {
                    matches.push(UrlMatch {
                        folder_id: doc.id.clone(),
                        folder_name: doc.name.clone(),
                        index,
                        entry: entry.clone(),
                    });
                }
            }
        }
        Ok(matches)
    }
}

/// Trim user-entered text and drop blank keywords
fn normalize_entry(entry: &mut UrlEntry) {
    entry.name = entry.name.trim().to_string();
    entry.address = entry.address.trim().to_string();
    entry.keywords = entry
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
}

fn missing_url(folder: &FolderId, index: usize) -> BmtreeError {
    BmtreeError::NotFound(format!("url #{} in folder {}", index, folder))
}
