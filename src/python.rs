//! Python bindings, built with `--features python`.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use std::collections::BTreeMap;

use crate::cache;
use crate::config::{ScoringRule, SearchConfig};
use crate::constants::{
    DEFAULT_SIMULATIONS, DEFAULT_TOP_K, STANDARD_SEED_ORDER, UNOBSERVED_FALLBACK_PROB,
};
use crate::error::SeedPoolError;
use crate::raw::{NestedRates, RawWinRates};
use crate::search;
use crate::simulate;
use crate::topology::BracketTopology;
use crate::win_prob::{self, NestedTable, WinProbabilityTable};

impl From<SeedPoolError> for PyErr {
    fn from(err: SeedPoolError) -> PyErr {
        match err {
            SeedPoolError::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Complete a raw scraped table; returns the symmetric nested form.
#[pyfunction]
#[pyo3(name = "build_probability_table")]
fn py_build_probability_table(raw: NestedRates) -> PyResult<NestedTable> {
    let raw = RawWinRates::from_nested(&raw)?;
    Ok(win_prob::build_probability_table(&raw).to_nested())
}

/// Simulate one region. Returns seed -> rounds won.
#[pyfunction]
#[pyo3(name = "simulate_region", signature = (table, seed = None))]
fn py_simulate_region(table: NestedTable, seed: Option<u64>) -> PyResult<BTreeMap<u8, u8>> {
    let table = WinProbabilityTable::from_nested(&table)?;
    let points = simulate::simulate_region_seeded(&BracketTopology::standard(), &table, seed);
    Ok(points
        .as_array()
        .iter()
        .enumerate()
        .map(|(i, &w)| (i as u8 + 1, w))
        .collect())
}

#[pyfunction]
#[pyo3(
    name = "expected_points_for_combination",
    signature = (seeds, table, n_simulations = DEFAULT_SIMULATIONS, seed = None)
)]
fn py_expected_points_for_combination(
    py: Python<'_>,
    seeds: Vec<i64>,
    table: NestedTable,
    n_simulations: usize,
    seed: Option<u64>,
) -> PyResult<f64> {
    let table = WinProbabilityTable::from_nested(&table)?;
    let value = py.allow_threads(|| {
        search::expected_points_for_combination(&seeds, &table, n_simulations, seed)
    })?;
    Ok(value)
}

/// Evaluate all 1820 combinations and return the top rows as
/// (seeds, expected rounds won, standard error, pool points).
#[pyfunction]
#[pyo3(
    name = "rank_combinations",
    signature = (
        table,
        n_simulations = DEFAULT_SIMULATIONS,
        top_k = DEFAULT_TOP_K,
        seed = None,
        seed_weighted = false
    )
)]
fn py_rank_combinations(
    py: Python<'_>,
    table: NestedTable,
    n_simulations: usize,
    top_k: usize,
    seed: Option<u64>,
    seed_weighted: bool,
) -> PyResult<Vec<(Vec<u8>, f64, f64, f64)>> {
    let table = WinProbabilityTable::from_nested(&table)?;
    let config = SearchConfig {
        n_simulations,
        top_k,
        seed,
        scoring: if seed_weighted {
            ScoringRule::SeedWeighted
        } else {
            ScoringRule::RoundsWon
        },
    };
    let values = py.allow_threads(|| search::search_all(&table, &config))?;

    Ok(values
        .top_k(config.top_k)
        .into_iter()
        .map(|e| {
            let seeds = e.combination.seeds().iter().map(|s| s.get()).collect();
            (seeds, e.expected_points, e.standard_error, e.pool_points)
        })
        .collect())
}

#[pyfunction]
#[pyo3(name = "load_table")]
fn py_load_table(path: &str) -> PyResult<NestedTable> {
    Ok(cache::load_table(path)?.to_nested())
}

#[pyfunction]
#[pyo3(name = "save_table")]
fn py_save_table(path: &str, table: NestedTable) -> PyResult<()> {
    let table = WinProbabilityTable::from_nested(&table)?;
    cache::save_table(path, &table)?;
    Ok(())
}

/// Python module definition
#[pymodule]
fn seed_pool(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_build_probability_table, m)?)?;
    m.add_function(wrap_pyfunction!(py_simulate_region, m)?)?;
    m.add_function(wrap_pyfunction!(py_expected_points_for_combination, m)?)?;
    m.add_function(wrap_pyfunction!(py_rank_combinations, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_table, m)?)?;
    m.add_function(wrap_pyfunction!(py_save_table, m)?)?;

    m.add("UNOBSERVED_FALLBACK_PROB", UNOBSERVED_FALLBACK_PROB)?;
    m.add("DEFAULT_SIMULATIONS", DEFAULT_SIMULATIONS)?;
    m.add("STANDARD_SEED_ORDER", STANDARD_SEED_ORDER.to_vec())?;

    Ok(())
}
