use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_SIMULATIONS, DEFAULT_TOP_K};
use crate::error::{Result, SeedPoolError};
use crate::seed::Seed;

/// How a seed's rounds won turn into pool points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// One point per round won
    #[default]
    RoundsWon,
    /// Points per win multiplied by the seed number
    SeedWeighted,
}

impl ScoringRule {
    pub fn weight(self, seed: Seed) -> f64 {
        match self {
            ScoringRule::RoundsWon => 1.0,
            ScoringRule::SeedWeighted => seed.get() as f64,
        }
    }
}

/// Knobs for the combination search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub n_simulations: usize,
    pub top_k: usize,
    /// Master seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Ordering used by `ExpectedValueTable::ranked`
    pub scoring: ScoringRule,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            n_simulations: DEFAULT_SIMULATIONS,
            top_k: DEFAULT_TOP_K,
            seed: None,
            scoring: ScoringRule::RoundsWon,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_simulations == 0 {
            return Err(SeedPoolError::NoSimulations);
        }
        Ok(())
    }
}

/// Settings for the `region_search` binary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Raw scraped win rates (`.json` nested map or `.csv` records)
    pub raw_path: PathBuf,
    /// Completed table; read when present, written after a fresh build
    pub table_cache_path: PathBuf,
    pub search: SearchConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            raw_path: PathBuf::from("data/seed_win_rates.json"),
            table_cache_path: PathBuf::from("data/win_probability_table.json"),
            search: SearchConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| SeedPoolError::Io {
            path: display.clone(),
            source,
        })?;
        let config: RunConfig = serde_json::from_str(&text)
            .map_err(|source| SeedPoolError::Json { path: display, source })?;
        config.search.validate()?;
        Ok(config)
    }
}
