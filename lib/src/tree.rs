//! In-memory bookmark tree.
//!
//! Folders live in an arena keyed by `FolderId`; each folder keeps the ordered ids of
//! its child folders and its embedded URLs. Every structural operation checks that the
//! result is still a tree before touching anything, so a rejected call leaves the tree
//! exactly as it was.

use crate::error::{BmtreeError, Result};
use crate::models::{FolderDocument, FolderId, UrlEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFolder {
    pub id: FolderId,
    pub name: String,
    pub parent: Option<FolderId>,
    pub children: Vec<FolderId>,
    pub urls: Vec<UrlEntry>,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl TreeFolder {
    fn new(name: String, parent: Option<FolderId>) -> Self {
        let now = Utc::now();
        Self {
            id: FolderId::generate(),
            name,
            parent,
            children: Vec::new(),
            urls: Vec::new(),
            date_added: now,
            date_modified: now,
        }
    }
}

/// Nested, serializable view of a tree (used for listings and comparisons)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderOutline {
    pub id: FolderId,
    pub name: String,
    pub urls: Vec<UrlEntry>,
    pub folders: Vec<FolderOutline>,
}

#[derive(Debug, Clone)]
pub struct BookmarkTree {
    root: FolderId,
    folders: HashMap<FolderId, TreeFolder>,
}

impl BookmarkTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = TreeFolder::new(root_name.into(), None);
        let root_id = root.id.clone();
        let mut folders = HashMap::new();
        folders.insert(root_id.clone(), root);
        Self {
            root: root_id,
            folders,
        }
    }

    pub fn root_id(&self) -> &FolderId {
        &self.root
    }

    pub fn root(&self) -> &TreeFolder {
        &self.folders[&self.root]
    }

    pub fn folder(&self, id: &FolderId) -> Option<&TreeFolder> {
        self.folders.get(id)
    }

    pub fn contains(&self, id: &FolderId) -> bool {
        self.folders.contains_key(id)
    }

    /// Number of folders, root included
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn url_count(&self) -> usize {
        self.folders.values().map(|f| f.urls.len()).sum()
    }

    fn get(&self, id: &FolderId) -> Result<&TreeFolder> {
        self.folders
            .get(id)
            .ok_or_else(|| BmtreeError::NotFound(format!("folder {}", id)))
    }

    fn get_mut(&mut self, id: &FolderId) -> Result<&mut TreeFolder> {
        self.folders
            .get_mut(id)
            .ok_or_else(|| BmtreeError::NotFound(format!("folder {}", id)))
    }

    /// Child folders of `id`, in order
    pub fn children(&self, id: &FolderId) -> Result<Vec<&TreeFolder>> {
        let folder = self.get(id)?;
        Ok(folder.children.iter().map(|c| &self.folders[c]).collect())
    }

    pub fn insert_folder(&mut self, parent: &FolderId, name: impl Into<String>) -> Result<FolderId> {
        self.get(parent)?;
        let folder = TreeFolder::new(name.into(), Some(parent.clone()));
        let id = folder.id.clone();
        self.folders.insert(id.clone(), folder);
        self.get_mut(parent)?.children.push(id.clone());
        Ok(id)
    }

    /// Append a URL to a folder, returning its index
    pub fn insert_url(&mut self, folder: &FolderId, entry: UrlEntry) -> Result<usize> {
        let folder = self.get_mut(folder)?;
        folder.urls.push(entry);
        Ok(folder.urls.len() - 1)
    }

    pub fn rename(&mut self, id: &FolderId, name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_dates(
        &mut self,
        id: &FolderId,
        date_added: DateTime<Utc>,
        date_modified: DateTime<Utc>,
    ) -> Result<()> {
        let folder = self.get_mut(id)?;
        folder.date_added = date_added;
        folder.date_modified = date_modified;
        Ok(())
    }

    /// True when `node` sits somewhere below `ancestor`
    pub fn is_descendant(&self, ancestor: &FolderId, node: &FolderId) -> bool {
        let mut current = self.folders.get(node).and_then(|f| f.parent.as_ref());
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.folders.get(id).and_then(|f| f.parent.as_ref());
        }
        false
    }

    /// Ids of `id` and everything below it, pre-order
    pub fn subtree_ids(&self, id: &FolderId) -> Result<Vec<FolderId>> {
        self.get(id)?;
        let mut ids = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            let folder = &self.folders[&current];
            stack.extend(folder.children.iter().rev().cloned());
            ids.push(current);
        }
        Ok(ids)
    }

    /// Re-parent a folder, appending it after its new siblings
    pub fn move_folder(&mut self, id: &FolderId, new_parent: &FolderId) -> Result<()> {
        self.get(id)?;
        self.get(new_parent)?;

        if *id == self.root {
            return Err(BmtreeError::Cycle("the root folder cannot be moved".to_string()));
        }
        if id == new_parent || self.is_descendant(id, new_parent) {
            return Err(BmtreeError::Cycle(format!(
                "cannot move folder {} under its own descendant {}",
                id, new_parent
            )));
        }

        let old_parent = self.folders[id].parent.clone();
        if let Some(old) = old_parent {
            self.get_mut(&old)?.children.retain(|c| c != id);
        }
        self.get_mut(new_parent)?.children.push(id.clone());
        self.get_mut(id)?.parent = Some(new_parent.clone());
        Ok(())
    }

    /// Cut a folder and everything below it out of this tree
    pub fn detach(&mut self, id: &FolderId) -> Result<BookmarkTree> {
        if *id == self.root {
            return Err(BmtreeError::Cycle(
                "the root folder cannot be detached".to_string(),
            ));
        }
        let ids = self.subtree_ids(id)?;

        if let Some(parent) = self.folders[id].parent.clone() {
            self.get_mut(&parent)?.children.retain(|c| c != id);
        }

        let mut folders = HashMap::with_capacity(ids.len());
        for folder_id in ids {
            if let Some(folder) = self.folders.remove(&folder_id) {
                folders.insert(folder_id, folder);
            }
        }
        if let Some(top) = folders.get_mut(id) {
            top.parent = None;
        }

        Ok(BookmarkTree {
            root: id.clone(),
            folders,
        })
    }

    /// Graft another tree below `parent`
    pub fn attach(&mut self, parent: &FolderId, subtree: BookmarkTree) -> Result<()> {
        if subtree.contains(parent) {
            return Err(BmtreeError::Cycle(format!(
                "cannot attach folder {} under itself",
                subtree.root
            )));
        }
        self.get(parent)?;
        if let Some(dup) = subtree.folders.keys().find(|k| self.folders.contains_key(*k)) {
            return Err(BmtreeError::InvalidInput(format!(
                "folder {} is already part of the tree",
                dup
            )));
        }

        let BookmarkTree { root, mut folders } = subtree;
        if let Some(top) = folders.get_mut(&root) {
            top.parent = Some(parent.clone());
        }
        self.folders.extend(folders);
        self.get_mut(parent)?.children.push(root);
        Ok(())
    }

    /// Pre-order walk with depth (root at depth 0)
    pub fn walk(&self) -> Vec<(usize, &TreeFolder)> {
        let mut out = Vec::with_capacity(self.folders.len());
        let mut stack = vec![(0usize, &self.root)];
        while let Some((depth, id)) = stack.pop() {
            let folder = &self.folders[id];
            stack.extend(folder.children.iter().rev().map(|c| (depth + 1, c)));
            out.push((depth, folder));
        }
        out
    }

    pub fn outline(&self) -> FolderOutline {
        self.outline_of(&self.root)
    }

    fn outline_of(&self, id: &FolderId) -> FolderOutline {
        let folder = &self.folders[id];
        FolderOutline {
            id: folder.id.clone(),
            name: folder.name.clone(),
            urls: folder.urls.clone(),
            folders: folder.children.iter().map(|c| self.outline_of(c)).collect(),
        }
    }

    /// Same folder names, URL name/address pairs and sibling order; ids and dates ignored
    pub fn is_isomorphic(&self, other: &BookmarkTree) -> bool {
        self.same_shape(&self.root, other, &other.root)
    }

    fn same_shape(&self, id: &FolderId, other: &BookmarkTree, other_id: &FolderId) -> bool {
        let a = &self.folders[id];
        let b = &other.folders[other_id];
        a.name == b.name
            && a.urls.len() == b.urls.len()
            && a
                .urls
                .iter()
                .zip(&b.urls)
                .all(|(x, y)| x.name == y.name && x.address == y.address)
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(&b.children)
                .all(|(x, y)| self.same_shape(x, other, y))
    }

    /// Storage documents, pre-order; positions follow sibling order
    pub fn to_documents(&self) -> Vec<FolderDocument> {
        self.walk()
            .into_iter()
            .map(|(_, folder)| {
                let position = folder
                    .parent
                    .as_ref()
                    .and_then(|p| self.folders.get(p))
                    .and_then(|p| p.children.iter().position(|c| *c == folder.id))
                    .unwrap_or(0);
                FolderDocument {
                    id: folder.id.clone(),
                    name: folder.name.clone(),
                    parent_id: folder.parent.clone(),
                    position: position as u32,
                    date_added: folder.date_added,
                    date_modified: folder.date_modified,
                    urls: folder.urls.clone(),
                }
            })
            .collect()
    }

    /// Rebuild a tree from stored documents rooted at `root`.
    ///
    /// `root` may have a parent outside of `documents` (a subtree read); it becomes the
    /// root of the returned tree. Every other document must hang off a folder in the set
    /// and be reachable from `root`.
    pub fn from_documents(root: &FolderId, documents: Vec<FolderDocument>) -> Result<Self> {
        let mut folders: HashMap<FolderId, TreeFolder> = HashMap::with_capacity(documents.len());
        let mut order: HashMap<FolderId, (u32, DateTime<Utc>)> = HashMap::new();

        for doc in documents {
            let parent = if doc.id == *root { None } else { doc.parent_id };
            order.insert(doc.id.clone(), (doc.position, doc.date_added));
            let previous = folders.insert(
                doc.id.clone(),
                TreeFolder {
                    id: doc.id.clone(),
                    name: doc.name,
                    parent,
                    children: Vec::new(),
                    urls: doc.urls,
                    date_added: doc.date_added,
                    date_modified: doc.date_modified,
                },
            );
            if previous.is_some() {
                return Err(BmtreeError::InvalidInput(format!(
                    "folder {} appears twice",
                    doc.id
                )));
            }
        }

        if !folders.contains_key(root) {
            return Err(BmtreeError::NotFound(format!("folder {}", root)));
        }

        let mut links: Vec<(FolderId, FolderId)> = Vec::new();
        for folder in folders.values() {
            if let Some(parent) = &folder.parent {
                if !folders.contains_key(parent) {
                    return Err(BmtreeError::NotFound(format!(
                        "parent {} of folder {}",
                        parent, folder.id
                    )));
                }
                links.push((parent.clone(), folder.id.clone()));
            }
        }
        links.sort_by(|(_, a), (_, b)| order[a].cmp(&order[b]).then_with(|| a.cmp(b)));
        for (parent, child) in links {
            if let Some(p) = folders.get_mut(&parent) {
                p.children.push(child);
            }
        }

        let tree = BookmarkTree {
            root: root.clone(),
            folders,
        };

        let mut seen = HashSet::new();
        let mut stack = vec![tree.root.clone()];
        while let Some(id) = stack.pop() {
            if seen.insert(id.clone()) {
                stack.extend(tree.folders[&id].children.iter().cloned());
            }
        }
        if seen.len() != tree.folders.len() {
            let mut stray: Vec<&str> = tree
                .folders
                .keys()
                .filter(|k| !seen.contains(*k))
                .map(FolderId::as_str)
                .collect();
            stray.sort_unstable();
            return Err(BmtreeError::Cycle(format!(
                "folders not reachable from {}: {}",
                tree.root,
                stray.join(", ")
            )));
        }

        Ok(tree)
    }
}
