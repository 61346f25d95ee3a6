//! Rank every 4-seed combination for one region.
//!
//! Usage: `region_search [config.json]`

use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::time::Instant;

use seed_pool::cache::{load_raw_json, load_table, save_table};
use seed_pool::{build_probability_table, search_all, RawWinRates, RunConfig, WinProbabilityTable};

fn load_or_build_table(config: &RunConfig) -> Result<WinProbabilityTable> {
    if config.table_cache_path.exists() {
        info!("using cached table {}", config.table_cache_path.display());
        return load_table(&config.table_cache_path).with_context(|| {
            format!("loading cached table {}", config.table_cache_path.display())
        });
    }

    let raw_path = &config.raw_path;
    let raw = match raw_path.extension().and_then(|e| e.to_str()) {
        Some("csv") => RawWinRates::read_csv(raw_path),
        _ => load_raw_json(raw_path),
    }
    .with_context(|| format!("reading raw win rates {}", raw_path.display()))?;

    let table = build_probability_table(&raw);
    save_table(&config.table_cache_path, &table).context("caching probability table")?;
    Ok(table)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            RunConfig::load(Path::new(&path)).with_context(|| format!("loading config {}", path))?
        }
        None => RunConfig::default(),
    };

    let table = load_or_build_table(&config)?;

    let start = Instant::now();
    let values = search_all(&table, &config.search)?;
    info!("search finished in {:.1?}", start.elapsed());

    println!(
        "{:>4}  {:<18} {:>10} {:>8} {:>11}",
        "rank", "seeds", "rounds", "stderr", "pool pts"
    );
    for (rank, estimate) in values.top_k(config.search.top_k).iter().enumerate() {
        println!(
            "{:>4}  {:<18} {:>10.4} {:>8.4} {:>11.4}",
            rank + 1,
            estimate.combination.to_string(),
            estimate.expected_points,
            estimate.standard_error,
            estimate.pool_points
        );
    }

    Ok(())
}
