//! Browser JSON export -> `BookmarkTree`.
//!
//! Input is either a whole browser bookmark file (an object with `roots`) or a single
//! folder node. Folder nodes become folders, `url` nodes become entries embedded in
//! their parent folder. Malformed input fails with a `Format` error carrying the JSON
//! path of the offending node, e.g. `roots.other.children[3].url`.

use super::browser::{self, NodeKind, ROOTS_FOLDER_NAME, ROOT_KEYS};
use crate::error::{BmtreeError, Result};
use crate::models::{FolderId, UrlEntry};
use crate::tree::BookmarkTree;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Path used for a bare folder node at the top of the input
const TOP: &str = "$";

/// Read and parse an export file
pub fn import_file(path: &Path) -> Result<BookmarkTree> {
    let mut content = fs::read(path)?;
    let value: Value = simd_json::serde::from_slice(&mut content)
        .map_err(|e| BmtreeError::format(path.display().to_string(), e.to_string()))?;
    let tree = import_value(&value)?;
    log::debug!(
        "Parsed {}: {} folder(s), {} url(s)",
        path.display(),
        tree.len(),
        tree.url_count()
    );
    Ok(tree)
}

pub fn import_value(value: &Value) -> Result<BookmarkTree> {
    let importer = Importer { now: Utc::now() };
    match value.get("roots") {
        Some(roots) => importer.import_roots(roots),
        None => importer.import_folder(value),
    }
}

struct Importer {
    now: DateTime<Utc>,
}

impl Importer {
    fn import_roots(&self, roots: &Value) -> Result<BookmarkTree> {
        let entries = as_object(roots, "roots")?;
        let mut tree = BookmarkTree::new(ROOTS_FOLDER_NAME);
        let top = tree.root_id().clone();

        let mut found = 0;
        for key in ROOT_KEYS {
            if let Some(node) = entries.get(key) {
                let path = format!("roots.{}", key);
                self.expect_kind(node, &path, NodeKind::Folder)?;
                let id = tree.insert_folder(&top, folder_name(node, &path)?)?;
                self.fill_folder(&mut tree, &id, node, &path)?;
                found += 1;
            }
        }
        if found == 0 {
            return Err(BmtreeError::format(
                "roots",
                format!("none of {} present", ROOT_KEYS.join(", ")),
            ));
        }
        Ok(tree)
    }

    fn import_folder(&self, node: &Value) -> Result<BookmarkTree> {
        self.expect_kind(node, TOP, NodeKind::Folder)?;
        let mut tree = BookmarkTree::new(folder_name(node, TOP)?);
        let root = tree.root_id().clone();
        self.fill_folder(&mut tree, &root, node, TOP)?;
        Ok(tree)
    }

    fn expect_kind(&self, node: &Value, path: &str, expected: NodeKind) -> Result<()> {
        let kind = node_kind(node, path)?;
        if kind != expected {
            return Err(BmtreeError::format(
                path,
                format!("expected a {} node, found '{}'", expected.tag(), kind.tag()),
            ));
        }
        Ok(())
    }

    /// Dates and children of an already inserted folder
    fn fill_folder(
        &self,
        tree: &mut BookmarkTree,
        id: &FolderId,
        node: &Value,
        path: &str,
    ) -> Result<()> {
        let date_added = self.timestamp(node, "date_added", path)?;
        let date_modified = self.timestamp(node, "date_modified", path)?;
        tree.set_dates(id, date_added, date_modified.max(date_added))?;

        let children = node
            .get("children")
            .ok_or_else(|| BmtreeError::format(path, "missing key 'children'"))?
            .as_array()
            .ok_or_else(|| BmtreeError::format(format!("{}.children", path), "expected an array"))?;

        for (index, child) in children.iter().enumerate() {
            let child_path = format!("{}.children[{}]", path, index);
            match node_kind(child, &child_path)? {
                NodeKind::Folder => {
                    let child_id = tree.insert_folder(id, folder_name(child, &child_path)?)?;
                    self.fill_folder(tree, &child_id, child, &child_path)?;
                }
                NodeKind::Url => {
                    tree.insert_url(id, self.url_entry(child, &child_path)?)?;
                }
            }
        }
        Ok(())
    }

    fn url_entry(&self, node: &Value, path: &str) -> Result<UrlEntry> {
        let address = string_field(node, "url", path)?
            .ok_or_else(|| BmtreeError::format(path, "missing key 'url'"))?
            .trim();
        let name = string_field(node, "name", path)?
            .ok_or_else(|| BmtreeError::format(path, "missing key 'name'"))?
            .trim();

        let mut entry = UrlEntry::new(if name.is_empty() { address } else { name }, address);
        entry.date_added = self.timestamp(node, "date_added", path)?;

        if let Some(meta) = node.get("meta_info").and_then(Value::as_object) {
            entry.icon = meta
                .get("icon")
                .and_then(Value::as_str)
                .filter(|icon| !icon.is_empty())
                .map(str::to_string);
            if let Some(keywords) = meta.get("keywords").and_then(Value::as_str) {
                entry.keywords = keywords
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
        Ok(entry)
    }

    /// A browser timestamp field, or the import time when absent or unset
    fn timestamp(&self, node: &Value, key: &str, path: &str) -> Result<DateTime<Utc>> {
        match string_field(node, key, path)? {
            None => Ok(self.now),
            Some(raw) => browser::parse_timestamp(raw)
                .map(|date| date.unwrap_or(self.now))
                .map_err(|message| BmtreeError::format(format!("{}.{}", path, key), message)),
        }
    }
}

fn as_object<'a>(node: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    node.as_object()
        .ok_or_else(|| BmtreeError::format(path, "expected an object"))
}

fn node_kind(node: &Value, path: &str) -> Result<NodeKind> {
    let tag = string_field(node, "type", path)?
        .ok_or_else(|| BmtreeError::format(path, "missing key 'type'"))?;
    NodeKind::from_tag(tag).ok_or_else(|| {
        BmtreeError::format(
            format!("{}.type", path),
            format!("unknown node type '{}'", tag),
        )
    })
}

/// `Ok(None)` when absent, an error when present but not a string
fn string_field<'a>(node: &'a Value, key: &str, path: &str) -> Result<Option<&'a str>> {
    match as_object(node, path)?.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(BmtreeError::format(
            format!("{}.{}", path, key),
            "expected a string",
        )),
    }
}

fn folder_name<'a>(node: &'a Value, path: &str) -> Result<&'a str> {
    let name = string_field(node, "name", path)?
        .ok_or_else(|| BmtreeError::format(path, "missing key 'name'"))?;
    crate::utils::clean_name(name)
        .ok_or_else(|| BmtreeError::format(format!("{}.name", path), "folder name is empty"))
}
