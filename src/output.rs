use std::{
    fs::{self, read_to_string, write},
    path::Path,
};

use _model::{CanonicalRecord, Region, UsState};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const US_INDEX: &str = "us_index.json";
pub const CUSTOM: &str = "custom.json";

/// Writes a compact `[[name, lat, lon, meta], ..]` array.
pub fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write(path, serde_json::to_string(records)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("saved {} ({} courses)", path.display(), records.len());
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<CanonicalRecord>> {
    let json = read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub code: String,
    pub name: String,
    pub count: usize,
}

/// Lists every US state dataset with at least one course, by name.
pub fn write_us_index(output_dir: &Path) -> Result<Vec<IndexEntry>> {
    let mut index = Vec::new();
    for state in UsState::all() {
        let region = Region::UsState(state);
        let path = output_dir.join(region.output_file());
        if !path.exists() {
            continue;
        }
        let count = match read_records(&path) {
            Ok(x) => x.len(),
            Err(e) => {
                warn!("{e:#}");
                0
            }
        };
        if count > 0 {
            index.push(IndexEntry {
                code: region.code(),
                name: region.name(),
                count,
            });
        }
    }
    index.sort_by(|a, b| a.name.cmp(&b.name));

    let path = output_dir.join(US_INDEX);
    fs::create_dir_all(output_dir)?;
    write(&path, serde_json::to_string(&index)?)?;
    info!("saved {} ({} states)", path.display(), index.len());
    Ok(index)
}

/// Hand-maintained courses live here; never overwritten.
pub fn ensure_custom(output_dir: &Path) -> Result<()> {
    let path = output_dir.join(CUSTOM);
    if !path.exists() {
        fs::create_dir_all(output_dir)?;
        write(&path, "[]")?;
        info!("created {} (empty placeholder)", path.display());
    }
    Ok(())
}
