//! Shape check for folder documents, run before every store write.
//!
//! The structural rules live in `schemas/folder_document.json` (draft 7) and are
//! enforced by `jsonschema`. URL addresses are additionally parsed with the `url`
//! crate since JSON-schema format checks are advisory.

use crate::error::{BmtreeError, Result};
use crate::models::FolderDocument;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use serde_json::Value;

static FOLDER_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema_content = include_str!("../schemas/folder_document.json");
    let schema: Value = serde_json::from_str(schema_content).expect("Invalid folder schema");
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .expect("Failed to compile folder schema")
});

/// Validate a raw JSON value against the folder document schema
pub fn validate_value(document: &Value) -> Result<()> {
    if let Err(errors) = FOLDER_SCHEMA.validate(document) {
        let error_list: Vec<String> = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();
        return Err(BmtreeError::Validation(error_list.join("; ")));
    }

    if let Some(urls) = document.get("urls").and_then(Value::as_array) {
        for (index, url) in urls.iter().enumerate() {
            if let Some(address) = url.get("address").and_then(Value::as_str) {
                check_address(address).map_err(|message| {
                    BmtreeError::Validation(format!("/urls/{}/address: {}", index, message))
                })?;
            }
        }
    }

    Ok(())
}

/// Validate a folder document before it is written
pub fn validate_document(document: &FolderDocument) -> Result<()> {
    validate_value(&document.to_value())
}

/// Validate a batch; the first failing document aborts the whole batch
pub fn validate_documents(documents: &[FolderDocument]) -> Result<()> {
    documents.iter().try_for_each(validate_document)
}

fn check_address(address: &str) -> std::result::Result<(), String> {
    url::Url::parse(address)
        .map(|_| ())
        .map_err(|e| format!("'{}' is not a valid URL ({})", address, e))
}
