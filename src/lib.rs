//! Seed Pool - Monte Carlo seed-combination search for one bracket region.
//!
//! Builds a complete seed-vs-seed win probability table from sparse
//! historical records, simulates 16-seed single-elimination regions, and
//! ranks every 4-seed combination by expected rounds won. Python bindings
//! are available behind the `python` feature.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod game_transform;
pub mod raw;
pub mod search;
pub mod seed;
pub mod simulate;
pub mod topology;
pub mod win_prob;

#[cfg(feature = "python")]
mod python;

pub use config::{RunConfig, ScoringRule, SearchConfig};
pub use constants::{
    DEFAULT_SIMULATIONS, DEFAULT_TOP_K, NUM_COMBINATIONS, NUM_ROUNDS, NUM_SEEDS,
    UNOBSERVED_FALLBACK_PROB,
};
pub use error::{Result, SeedPoolError};
pub use raw::RawWinRates;
pub use search::{
    enumerate_combinations, estimate_combination, expected_points_for_combination,
    nearest_seed_combination, search_all, CombinationEstimate, ExpectedValueTable,
    SeedCombination,
};
pub use seed::Seed;
pub use simulate::{expected_points_exact, run_simulations, simulate_region, PointsBySeed};
pub use topology::BracketTopology;
pub use win_prob::{build_probability_table, surrogates_by_differential, WinProbabilityTable};
