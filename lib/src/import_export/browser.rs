//! Browser bookmark file conventions shared by the importer and the exporter.
//!
//! Chromium-family browsers store timestamps as a decimal string of microseconds
//! since 1601-01-01 UTC (the WebKit epoch).

use chrono::{DateTime, Utc};

/// Microseconds between 1601-01-01 and 1970-01-01
pub const WEBKIT_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Keys under `roots` that hold bookmark folders, in import order
pub const ROOT_KEYS: [&str; 3] = ["bookmark_bar", "other", "synced"];

/// Name of the folder that stands in for the `roots` object
pub const ROOTS_FOLDER_NAME: &str = "roots";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    Url,
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "folder" => Some(NodeKind::Folder),
            "url" => Some(NodeKind::Url),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::Url => "url",
        }
    }
}

/// Parse a browser timestamp.
///
/// `Ok(None)` for `"0"`, which browsers write for "never set"; `Err` when the string
/// is not a plain decimal number or falls outside chrono's range.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a decimal timestamp", raw));
    }
    let micros: i64 = raw
        .parse()
        .map_err(|_| format!("timestamp '{}' is out of range", raw))?;
    if micros == 0 {
        return Ok(None);
    }
    DateTime::from_timestamp_micros(micros - WEBKIT_EPOCH_OFFSET_MICROS)
        .map(Some)
        .ok_or_else(|| format!("timestamp '{}' is out of range", raw))
}

pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    (date.timestamp_micros() + WEBKIT_EPOCH_OFFSET_MICROS).to_string()
}
