use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a folder document (UUID v4 in its hyphenated string form)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to resolve a folder in practice
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl From<String> for FolderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bookmark embedded in its parent folder's document.
/// It has no identity of its own besides its index in `FolderDocument::urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub date_added: DateTime<Utc>,
}

impl UrlEntry {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            icon: None,
            keywords: Vec::new(),
            date_added: Utc::now(),
        }
    }
}

/// Partial update of an embedded URL; `None` leaves a field untouched.
/// An empty `icon` clears the icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub icon: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl UrlPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.icon.is_none() && self.keywords.is_none()
    }

    pub fn apply(&self, entry: &mut UrlEntry) {
        if let Some(name) = &self.name {
            entry.name = name.clone();
        }
        if let Some(address) = &self.address {
            entry.address = address.clone();
        }
        if let Some(icon) = &self.icon {
            entry.icon = (!icon.is_empty()).then(|| icon.clone());
        }
        if let Some(keywords) = &self.keywords {
            entry.keywords = keywords.clone();
        }
    }
}

/// One stored folder: the unit of atomic writes.
///
/// Child folders are separate documents pointing back through `parent_id`;
/// `position` orders them among their siblings. URLs live inline in `urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDocument {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub position: u32,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub urls: Vec<UrlEntry>,
}

impl FolderDocument {
    pub fn new(name: impl Into<String>, parent_id: Option<FolderId>, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: FolderId::generate(),
            name: name.into(),
            parent_id,
            position,
            date_added: now,
            date_modified: now,
            urls: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn touch(&mut self) {
        self.date_modified = Utc::now();
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Every field serializes infallibly (strings, integers, RFC 3339 dates)
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
