//! Interchange document: the JSON snapshot used for export and import.
//!
//! ```text
//! {
//!   "storage":  { "A": { "Haut": [sail, ...], "Bas": [...] }, ... },
//!   "plancher": [sail, ...],
//!   "entree":   [sail, ...],
//!   "lastExport": "2024-05-02T08:00:00Z"
//! }
//! ```
//!
//! Parsing is lenient. Only text that is not JSON at all is an error; a
//! container that is missing or has the wrong shape degrades to empty.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use voilerie_core::{DomainError, SailId};

use crate::inventory::Inventory;
use crate::location::{Aisle, Level, Location};
use crate::sail::Sail;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("import is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize inventory: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("import rejected: {0}")]
    Rejected(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDocument {
    pub storage: BTreeMap<Aisle, BTreeMap<Level, Vec<Sail>>>,
    pub plancher: Vec<Sail>,
    pub entree: Vec<Sail>,
    pub last_export: DateTime<Utc>,
}

impl InventoryDocument {
    /// Snapshot of `inventory`; every bin is emitted, empty or not.
    pub fn from_inventory(inventory: &Inventory, exported_at: DateTime<Utc>) -> Self {
        let mut storage: BTreeMap<Aisle, BTreeMap<Level, Vec<Sail>>> = BTreeMap::new();
        for location in Location::bins() {
            if let Location::Bin(aisle, level) = location {
                storage
                    .entry(aisle)
                    .or_default()
                    .insert(level, inventory.sails(location).to_vec());
            }
        }

        Self {
            storage,
            plancher: inventory.sails(Location::Plancher).to_vec(),
            entree: inventory.sails(Location::Entree).to_vec(),
            last_export: exported_at,
        }
    }

    /// Two-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }
}

/// What a lenient parse had to discard or repair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub sails: usize,
    /// Containers present with the wrong shape, reset to empty.
    pub degraded_containers: Vec<String>,
    /// Aisle or level keys outside the grid.
    pub unknown_keys: Vec<String>,
    /// Records that did not parse as a sail.
    pub dropped_records: usize,
    /// Later occurrences of an id already seen.
    pub duplicate_ids: usize,
    pub last_export: Option<DateTime<Utc>>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.degraded_containers.is_empty()
            && self.unknown_keys.is_empty()
            && self.dropped_records == 0
            && self.duplicate_ids == 0
    }
}

/// Result of parsing a document, ready to replace the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedInventory {
    /// Traversal order; each `position` matches the container it was read from.
    pub sails: Vec<Sail>,
    pub report: ImportReport,
}

/// Parse an interchange document.
pub fn parse(text: &str) -> Result<ImportedInventory, DocumentError> {
    let value: Value = serde_json::from_str(text).map_err(DocumentError::Parse)?;
    let empty = Map::new();
    let root = value.as_object().unwrap_or(&empty);

    let mut reader = Reader::default();
    reader.list("plancher", root.get("plancher"), Location::Plancher);
    reader.list("entree", root.get("entree"), Location::Entree);
    reader.storage(root.get("storage"));

    reader.report.last_export = root
        .get("lastExport")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc));
    reader.report.sails = reader.sails.len();

    Ok(ImportedInventory {
        sails: reader.sails,
        report: reader.report,
    })
}

#[derive(Default)]
struct Reader {
    sails: Vec<Sail>,
    seen: HashSet<SailId>,
    report: ImportReport,
}

impl Reader {
    fn storage(&mut self, value: Option<&Value>) {
        let aisles = match value {
            None | Some(Value::Null) => return,
            Some(Value::Object(aisles)) => aisles,
            Some(_) => {
                tracing::warn!("import: `storage` is not an object; treating as empty");
                self.report.degraded_containers.push("storage".to_string());
                return;
            }
        };

        // Walk in grid order so duplicates resolve the same way as the stats traversal.
        let mut bins: Vec<(Location, String, &Value)> = Vec::new();
        for (aisle_key, levels) in aisles {
            let Ok(aisle) = aisle_key.parse::<Aisle>() else {
                tracing::warn!(key = %aisle_key, "import: unknown aisle dropped");
                self.report.unknown_keys.push(aisle_key.clone());
                continue;
            };
            let levels = match levels {
                Value::Object(levels) => levels,
                Value::Null => continue,
                _ => {
                    tracing::warn!(aisle = %aisle_key, "import: aisle is not an object; treating as empty");
                    self.report.degraded_containers.push(aisle_key.clone());
                    continue;
                }
            };
            for (level_key, list) in levels {
                let key = format!("{aisle_key}_{level_key}");
                match level_key.parse::<Level>() {
                    Ok(level) => bins.push((Location::Bin(aisle, level), key, list)),
                    Err(_) => {
                        tracing::warn!(%key, "import: unknown level dropped");
                        self.report.unknown_keys.push(key);
                    }
                }
            }
        }
        bins.sort_by_key(|(location, _, _)| *location);

        for (location, key, list) in bins {
            self.list(&key, Some(list), location);
        }
    }

    fn list(&mut self, name: &str, value: Option<&Value>, location: Location) {
        let items = match value {
            None | Some(Value::Null) => return,
            Some(Value::Array(items)) => items,
            Some(_) => {
                tracing::warn!(container = name, "import: container is not a list; treating as empty");
                self.report.degraded_containers.push(name.to_string());
                return;
            }
        };

        for item in items {
            let mut item = item.clone();
            if let Value::Object(fields) = &mut item {
                fields.insert("position".to_string(), Value::String(location.to_string()));
            }
            match serde_json::from_value::<Sail>(item) {
                Ok(sail) if self.seen.insert(sail.id) => self.sails.push(sail),
                Ok(sail) => {
                    tracing::warn!(sail_id = %sail.id, container = name, "import: duplicate sail dropped");
                    self.report.duplicate_ids += 1;
                }
                Err(err) => {
                    tracing::warn!(container = name, error = %err, "import: unreadable sail record dropped");
                    self.report.dropped_records += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAIL_A: &str = r#"{
        "id": "3f2b8c1e-9d4a-4e6b-8f0a-1c2d3e4f5a6b",
        "name": "GV1", "type": "Grand-voile",
        "clientName": "Dupont", "boatName": "Aella",
        "dateAdded": "2024-03-01T09:30:00.000Z",
        "lastModified": "2024-03-02T10:00:00.000Z",
        "position": "entree"
    }"#;

    const SAIL_B: &str = r#"{
        "id": "7a1d0c55-2b3e-4f60-9a8b-0c1d2e3f4a5b",
        "name": "Spi", "type": "Spinnaker",
        "clientName": "Leroy", "boatName": "Mistral",
        "dateAdded": "2024-01-10T08:00:00Z",
        "lastModified": "2024-01-10T08:00:00Z",
        "position": "plancher"
    }"#;

    #[test]
    fn empty_object_yields_an_empty_clean_import() {
        let imported = parse("{}").unwrap();
        assert!(imported.sails.is_empty());
        assert!(imported.report.is_clean());
        assert!(imported.report.last_export.is_none());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse("{ \"entree\": [").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn non_object_root_degrades_to_empty() {
        for text in ["[]", "42", "null", "\"entree\""] {
            let imported = parse(text).unwrap();
            assert!(imported.sails.is_empty(), "{text}");
        }
    }

    #[test]
    fn wrong_shaped_containers_degrade_individually() {
        let text = format!(
            r#"{{ "entree": {{"oops": true}}, "plancher": [{SAIL_B}], "storage": [1, 2] }}"#
        );
        let imported = parse(&text).unwrap();

        assert_eq!(imported.sails.len(), 1);
        assert_eq!(imported.sails[0].position, Location::Plancher);
        assert_eq!(
            imported.report.degraded_containers,
            vec!["entree".to_string(), "storage".to_string()]
        );
    }

    #[test]
    fn unknown_grid_keys_are_dropped() {
        let text = format!(r#"{{ "storage": {{ "Z": {{ "Haut": [] }}, "B": {{ "Milieu": [{SAIL_A}], "Bas": [{SAIL_B}] }} }} }}"#);
        let imported = parse(&text).unwrap();

        // Object keys are read in sorted order.
        assert_eq!(imported.report.unknown_keys, vec!["B_Milieu".to_string(), "Z".to_string()]);
        assert_eq!(imported.sails.len(), 1);
        assert_eq!(imported.sails[0].position, Location::Bin(Aisle::B, Level::Bas));
    }

    #[test]
    fn position_follows_the_container_not_the_record() {
        // SAIL_A claims `entree` but is listed on the floor.
        let text = format!(r#"{{ "plancher": [{SAIL_A}] }}"#);
        let imported = parse(&text).unwrap();
        assert_eq!(imported.sails[0].position, Location::Plancher);
    }

    #[test]
    fn unreadable_records_and_duplicates_are_counted() {
        let text = format!(
            r#"{{ "plancher": [{SAIL_A}, {{"id": "nope"}}], "entree": [{SAIL_A}, 3] }}"#
        );
        let imported = parse(&text).unwrap();

        assert_eq!(imported.sails.len(), 1);
        assert_eq!(imported.sails[0].position, Location::Plancher);
        assert_eq!(imported.report.dropped_records, 2);
        assert_eq!(imported.report.duplicate_ids, 1);
        assert!(!imported.report.is_clean());
    }

    #[test]
    fn reads_last_export_timestamp() {
        let imported = parse(r#"{ "lastExport": "2024-06-01T12:00:00.000Z" }"#).unwrap();
        assert_eq!(
            imported.report.last_export,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn export_emits_every_bin_and_the_document_keys() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let doc = InventoryDocument::from_inventory(&Inventory::new(), at);
        assert_eq!(doc.storage.len(), 7);
        assert!(doc.storage.values().all(|levels| levels.len() == 2));

        let value: Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["storage"]["A"]["Haut"], Value::Array(vec![]));
        assert_eq!(value["plancher"], Value::Array(vec![]));
        assert_eq!(value["entree"], Value::Array(vec![]));
        assert_eq!(value["lastExport"], "2024-06-01T12:00:00Z");
    }

    #[test]
    fn pretty_output_uses_two_space_indent() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let json = InventoryDocument::from_inventory(&Inventory::new(), at)
            .to_json_pretty()
            .unwrap();
        assert!(json.starts_with("{\n  \"storage\": {\n    \"A\": {"));
    }
}
