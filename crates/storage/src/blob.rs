//! Export/import of the interchange document as files on disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

use crate::document::ImportReport;
use crate::store::InventoryStore;

const EXPORT_FILE_PREFIX: &str = "stockage-voiles-";

/// `stockage-voiles-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// Write the current state into `dir` and return the file path.
pub fn export_to_dir(store: &InventoryStore, dir: &Path) -> anyhow::Result<PathBuf> {
    export_to_dir_at(store, dir, Utc::now())
}

pub fn export_to_dir_at(store: &InventoryStore, dir: &Path, at: DateTime<Utc>) -> anyhow::Result<PathBuf> {
    let path = dir.join(export_file_name(at.date_naive()));
    let json = store
        .export_document_at(at)
        .to_json_pretty()
        .context("failed to render inventory document")?;

    std::fs::write(&path, json).with_context(|| format!("failed to write export to {}", path.display()))?;

    tracing::info!(path = %path.display(), sails = store.inventory().len(), "inventory exported");
    Ok(path)
}

/// Read a document from `path` and replace the store's state with it.
///
/// Read or parse failures leave the store unchanged.
pub fn import_from_path(store: &mut InventoryStore, path: &Path) -> anyhow::Result<ImportReport> {
    let result = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read import file {}", path.display()))
        .and_then(|text| {
            store
                .import_json(&text)
                .with_context(|| format!("failed to import {}", path.display()))
        });

    if let Err(err) = &result {
        tracing::error!(error = ?err, "import aborted");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        assert_eq!(export_file_name(date), "stockage-voiles-2024-11-03.json");
    }
}
