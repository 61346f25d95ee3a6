//! Optional load/save adapter for the completed probability table, so a
//! run can skip rebuilding from raw scraped data.

use log::info;
use std::fs;
use std::path::Path;

use crate::error::{Result, SeedPoolError};
use crate::raw::{NestedRates, RawWinRates};
use crate::win_prob::{NestedTable, WinProbabilityTable};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| SeedPoolError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SeedPoolError::Json { path: display, source })
}

/// Write the table as one record per seed holding an opponent map.
pub fn save_table<P: AsRef<Path>>(path: P, table: &WinProbabilityTable) -> Result<()> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let json = serde_json::to_string_pretty(&table.to_nested()).map_err(|source| {
        SeedPoolError::Json {
            path: display.clone(),
            source,
        }
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SeedPoolError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| SeedPoolError::Io {
        path: display.clone(),
        source,
    })?;
    info!("saved probability table to {}", display);
    Ok(())
}

/// Load and validate a previously saved table.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<WinProbabilityTable> {
    let nested: NestedTable = read_json(path.as_ref())?;
    WinProbabilityTable::from_nested(&nested)
}

/// Load the scraper's nested seed -> {opponent -> rate} document.
pub fn load_raw_json<P: AsRef<Path>>(path: P) -> Result<RawWinRates> {
    let nested: NestedRates = read_json(path.as_ref())?;
    RawWinRates::from_nested(&nested)
}
