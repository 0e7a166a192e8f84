use super::{CatalogError, PriceRecord};
use crate::game_log::ItemId;
use hashbrown::HashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keyed persistence for catalog records. The engine only needs a bulk read
/// at startup and a write after accepted price updates.
pub trait CatalogStore {
    fn load(&self) -> Result<HashMap<ItemId, PriceRecord>, CatalogError>;

    fn save(&mut self, records: &HashMap<ItemId, PriceRecord>) -> Result<(), CatalogError>;
}

/// `full_table.json`: `{ "<id>": { "name", "type", "price", "last_update", "from" } }`
#[derive(Debug, Clone)]
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the catalog from the English id table when it does not exist
    /// yet. Returns `true` when a new catalog was written.
    pub fn initialize_from_en_table(&mut self, en_table: &Path) -> Result<bool, CatalogError> {
        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Catalog already exists");
            return Ok(false);
        }
        if !en_table.exists() {
            tracing::warn!(path = %en_table.display(), "English id table not found, cannot seed catalog");
            return Ok(false);
        }

        let records = seed_from_en_table(en_table)?;
        self.save(&records)?;
        tracing::info!(
            items = records.len(),
            path = %self.path.display(),
            "Catalog seeded from English id table"
        );
        Ok(true)
    }
}

impl CatalogStore for JsonCatalogStore {
    fn load(&self) -> Result<HashMap<ItemId, PriceRecord>, CatalogError> {
        let raw: BTreeMap<String, PriceRecord> = match read_json(&self.path) {
            Ok(raw) => raw,
            Err(CatalogError::ReadFile { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No catalog file, starting empty");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e),
        };
        keyed_by_item(&self.path, raw)
    }

    fn save(&mut self, records: &HashMap<ItemId, PriceRecord>) -> Result<(), CatalogError> {
        let sorted: BTreeMap<String, &PriceRecord> = records
            .iter()
            .map(|(id, record)| (id.to_string(), record))
            .collect();
        let json = serde_json::to_string_pretty(&sorted).map_err(CatalogError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| CatalogError::WriteFile {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Deserialize)]
struct EnTableEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
}

/// Build unpriced records from `en_id_table.json` (`{ "<id>": { "name", "type" } }`).
pub fn seed_from_en_table(path: &Path) -> Result<HashMap<ItemId, PriceRecord>, CatalogError> {
    let raw: BTreeMap<String, EnTableEntry> = read_json(path)?;
    let mut records = HashMap::with_capacity(raw.len());
    for (key, entry) in raw {
        let id = parse_item_key(path, &key)?;
        let name = entry.name.unwrap_or_else(|| format!("Unknown_{key}"));
        let item_type = entry.item_type.unwrap_or_else(|| "Unknown".to_string());
        records.insert(id, PriceRecord::new(name, item_type));
    }
    Ok(records)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn keyed_by_item(
    path: &Path,
    raw: BTreeMap<String, PriceRecord>,
) -> Result<HashMap<ItemId, PriceRecord>, CatalogError> {
    raw.into_iter()
        .map(|(key, record)| Ok((parse_item_key(path, &key)?, record)))
        .collect()
}

fn parse_item_key(path: &Path, key: &str) -> Result<ItemId, CatalogError> {
    key.trim()
        .parse::<u64>()
        .map(ItemId)
        .map_err(|_| CatalogError::InvalidItemId {
            path: path.to_path_buf(),
            key: key.to_string(),
        })
}
