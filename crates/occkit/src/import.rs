//! Import documents for `occ config:import`.
//!
//! `config:*:set` can only carry a scalar, so structured values are written
//! to a private temporary file in the same shape `config:list` prints and
//! merged with `config:import`.

use crate::error::Result;
use crate::types::Scope;
use serde_json::{Map, Value, json};
use std::io::Write;
use tempfile::NamedTempFile;

/// Build the document that sets exactly one value.
///
/// `{"system": {name: value}}` or `{"apps": {owner: {name: value}}}`.
pub fn import_document(scope: &Scope, name: &str, value: &Value) -> Value {
    let mut entry = Map::new();
    entry.insert(name.to_string(), value.clone());

    match scope {
        Scope::System => json!({ "system": entry }),
        Scope::App(owner) => {
            let mut apps = Map::new();
            apps.insert(owner.clone(), Value::Object(entry));
            json!({ "apps": apps })
        }
    }
}

/// Write a document to a new temporary file.
///
/// The file is created exclusively with owner-only permissions and is fully
/// written and synced before this returns. It is deleted when dropped.
pub fn write_import_file(document: &Value) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("occctl-import-")
        .suffix(".json")
        .tempfile()?;

    serde_json::to_writer(&mut file, document)?;
    file.flush()?;
    file.as_file().sync_all()?;

    log::debug!("Wrote import document to {}", file.path().display());
    Ok(file)
}
