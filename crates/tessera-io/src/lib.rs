//! Edit-list persistence (TOML).
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

use tessera_edit::EditRecord;

/// On-disk document: a flat list of `[[edits]]` tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(default)]
    pub edits: Vec<EditRecord>,
}

pub fn save_edits(path: &Path, edits: &[EditRecord]) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let doc = SaveFile {
        edits: edits.to_vec(),
    };
    let s = toml::to_string_pretty(&doc)?;
    fs::write(path, s)?;
    log::info!("saved {} edits to {}", edits.len(), path.display());
    Ok(())
}

pub fn try_load_edits(path: &Path) -> Result<Vec<EditRecord>, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let doc: SaveFile = toml::from_str(&s)?;
    Ok(doc.edits)
}

/// Loads the edit list; a missing or malformed file yields an empty list.
pub fn load_edits(path: &Path) -> Vec<EditRecord> {
    if !path.exists() {
        log::info!("no save file at {}; starting with no edits", path.display());
        return Vec::new();
    }
    match try_load_edits(path) {
        Ok(edits) => {
            log::info!("loaded {} edits from {}", edits.len(), path.display());
            edits
        }
        Err(e) => {
            log::warn!("failed to load edits from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
