use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::config::{ScoringRule, SearchConfig};
use crate::constants::{COMBINATION_SIZE, NUM_COMBINATIONS, NUM_SEEDS};
use crate::error::{Result, SeedPoolError};
use crate::seed::Seed;
use crate::simulate::simulate_region;
use crate::topology::BracketTopology;
use crate::win_prob::WinProbabilityTable;

/// Four distinct seeds from one region, stored ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SeedCombination([Seed; COMBINATION_SIZE]);

impl SeedCombination {
    /// Validate raw seed numbers: exactly 4, distinct, each in 1..=16.
    pub fn new(seeds: &[i64]) -> Result<Self> {
        let invalid = || SeedPoolError::InvalidCombination {
            expected: COMBINATION_SIZE,
            seeds: seeds.to_vec(),
        };
        if seeds.len() != COMBINATION_SIZE {
            return Err(invalid());
        }

        let mut sorted = [Seed::from_index(0); COMBINATION_SIZE];
        for (slot, &raw) in sorted.iter_mut().zip(seeds) {
            *slot = Seed::new(raw).map_err(|_| invalid())?;
        }
        sorted.sort();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid());
        }
        Ok(SeedCombination(sorted))
    }

    pub fn from_seeds(seeds: &[Seed]) -> Result<Self> {
        let raw: Vec<i64> = seeds.iter().map(|s| s.get() as i64).collect();
        Self::new(&raw)
    }

    /// Snap continuous optimizer output onto four distinct seeds.
    pub fn from_continuous(values: &[f64]) -> Result<Self> {
        Self::from_seeds(&nearest_seed_combination(values, false)?)
    }

    pub fn seeds(&self) -> &[Seed; COMBINATION_SIZE] {
        &self.0
    }
}

impl fmt::Display for SeedCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "({}, {}, {}, {})", a, b, c, d)
    }
}

/// All C(16, 4) combinations in lexicographic order.
pub fn enumerate_combinations() -> Vec<SeedCombination> {
    let mut combos = Vec::with_capacity(NUM_COMBINATIONS);
    for a in 0..NUM_SEEDS {
        for b in a + 1..NUM_SEEDS {
            for c in b + 1..NUM_SEEDS {
                for d in c + 1..NUM_SEEDS {
                    combos.push(SeedCombination([a, b, c, d].map(Seed::from_index)));
                }
            }
        }
    }
    combos
}

/// Map each continuous value to the nearest seed in 1..=16.
///
/// Without `replace`, a chosen seed leaves the search space so the result
/// has no repeats. Ties go to the lower seed.
pub fn nearest_seed_combination(values: &[f64], replace: bool) -> Result<Vec<Seed>> {
    if !replace && values.len() > NUM_SEEDS {
        return Err(SeedPoolError::SearchSpaceExhausted {
            requested: values.len(),
        });
    }

    let mut space: Vec<Seed> = Seed::all().collect();
    let mut picked = Vec::with_capacity(values.len());
    for &value in values {
        let (idx, &seed) = space
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (a.get() as f64 - value).abs();
                let db = (b.get() as f64 - value).abs();
                da.total_cmp(&db)
            })
            .ok_or(SeedPoolError::SearchSpaceExhausted {
                requested: values.len(),
            })?;
        picked.push(seed);
        if !replace {
            space.remove(idx);
        }
    }
    Ok(picked)
}

/// Monte Carlo estimate for one combination.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinationEstimate {
    pub combination: SeedCombination,
    /// Mean over simulations of the combination's summed rounds won
    pub expected_points: f64,
    /// Standard error of `expected_points`
    pub standard_error: f64,
    /// Sum of seed x mean rounds won for the four seeds
    pub pool_points: f64,
    pub n_simulations: usize,
}

impl CombinationEstimate {
    pub fn score(&self, rule: ScoringRule) -> f64 {
        match rule {
            ScoringRule::RoundsWon => self.expected_points,
            ScoringRule::SeedWeighted => self.pool_points,
        }
    }
}

/// Run `n_simulations` independent regions and summarize the four seeds.
///
/// # Arguments
/// * `combination` - Seeds whose rounds won are summed
/// * `topology` - Slot order of the region
/// * `table` - Completed win probability table
/// * `n_simulations` - Number of playouts (at least 1)
/// * `seed` - Master seed; `None` draws from OS entropy
///
/// # Returns
/// Mean summed rounds won, its standard error and seed-weighted pool points
pub fn estimate_combination(
    combination: &SeedCombination,
    topology: &BracketTopology,
    table: &WinProbabilityTable,
    n_simulations: usize,
    seed: Option<u64>,
) -> Result<CombinationEstimate> {
    if n_simulations == 0 {
        return Err(SeedPoolError::NoSimulations);
    }

    let mut master = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let seeds = combination.seeds();
    let mut samples = Vec::with_capacity(n_simulations);
    let mut wins_by_seed = [0u64; COMBINATION_SIZE];

    for _ in 0..n_simulations {
        let mut rng = ChaCha8Rng::seed_from_u64(master.gen::<u64>());
        let points = simulate_region(topology, table, &mut rng);
        for (total, &s) in wins_by_seed.iter_mut().zip(seeds) {
            *total += points.get(s) as u64;
        }
        samples.push(points.sum_for(seeds) as f64);
    }

    let expected_points = samples.iter().mean();
    let standard_error = if n_simulations > 1 {
        samples.iter().std_dev() / (n_simulations as f64).sqrt()
    } else {
        0.0
    };
    let pool_points: f64 = wins_by_seed
        .iter()
        .zip(seeds)
        .map(|(&wins, &s)| {
            ScoringRule::SeedWeighted.weight(s) * wins as f64 / n_simulations as f64
        })
        .sum();

    Ok(CombinationEstimate {
        combination: *combination,
        expected_points,
        standard_error,
        pool_points,
        n_simulations,
    })
}

/// Expected summed rounds won for four seeds over the standard bracket.
///
/// # Arguments
/// * `seeds` - Exactly 4 distinct seeds in 1..=16
/// * `table` - Completed win probability table
/// * `n_simulations` - Number of playouts (at least 1)
/// * `seed` - Master seed; `None` draws from OS entropy
///
/// # Returns
/// Monte Carlo mean, or `InvalidCombination` for a bad seed set
pub fn expected_points_for_combination(
    seeds: &[i64],
    table: &WinProbabilityTable,
    n_simulations: usize,
    seed: Option<u64>,
) -> Result<f64> {
    let combination = SeedCombination::new(seeds)?;
    let estimate = estimate_combination(
        &combination,
        &BracketTopology::standard(),
        table,
        n_simulations,
        seed,
    )?;
    Ok(estimate.expected_points)
}

/// Estimates for every combination, rankable by the configured rule.
#[derive(Clone, Debug)]
pub struct ExpectedValueTable {
    estimates: Vec<CombinationEstimate>,
    index: HashMap<SeedCombination, usize>,
    scoring: ScoringRule,
}

impl ExpectedValueTable {
    fn new(estimates: Vec<CombinationEstimate>, scoring: ScoringRule) -> Self {
        let index = estimates
            .iter()
            .enumerate()
            .map(|(i, e)| (e.combination, i))
            .collect();
        ExpectedValueTable {
            estimates,
            index,
            scoring,
        }
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn scoring(&self) -> ScoringRule {
        self.scoring
    }

    pub fn get(&self, combination: &SeedCombination) -> Option<&CombinationEstimate> {
        self.index.get(combination).map(|&i| &self.estimates[i])
    }

    /// Estimates in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = &CombinationEstimate> {
        self.estimates.iter()
    }

    /// `Less` means `a` ranks ahead of `b`.
    fn rank_order(&self, a: &CombinationEstimate, b: &CombinationEstimate) -> Ordering {
        b.score(self.scoring)
            .total_cmp(&a.score(self.scoring))
            .then_with(|| a.combination.cmp(&b.combination))
    }

    /// Highest score first; equal scores fall back to seed order.
    pub fn ranked(&self) -> Vec<&CombinationEstimate> {
        let mut ranked: Vec<&CombinationEstimate> = self.estimates.iter().collect();
        ranked.sort_by(|a, b| self.rank_order(a, b));
        ranked
    }

    pub fn best(&self) -> Option<&CombinationEstimate> {
        self.estimates.iter().min_by(|a, b| self.rank_order(a, b))
    }

    pub fn top_k(&self, k: usize) -> Vec<&CombinationEstimate> {
        let mut ranked = self.ranked();
        ranked.truncate(k);
        ranked
    }
}

/// Evaluate all 1820 combinations.
///
/// Combinations run in parallel. Each one gets its own generator seed drawn
/// up front from the master stream, so a fixed `config.seed` gives the
/// same table no matter how work is scheduled.
///
/// # Returns
/// Estimates for all combinations, ranked by `config.scoring`
pub fn search_all(
    table: &WinProbabilityTable,
    config: &SearchConfig,
) -> Result<ExpectedValueTable> {
    config.validate()?;

    let topology = BracketTopology::standard();
    let combinations = enumerate_combinations();
    let mut master = match config.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let seeds: Vec<u64> = combinations.iter().map(|_| master.gen()).collect();

    info!(
        "evaluating {} combinations x {} simulations",
        combinations.len(),
        config.n_simulations
    );

    let estimates = combinations
        .par_iter()
        .zip(seeds.par_iter())
        .map(|(combination, &seed)| {
            estimate_combination(combination, &topology, table, config.n_simulations, Some(seed))
        })
        .collect::<Result<Vec<_>>>()?;

    let values = ExpectedValueTable::new(estimates, config.scoring);
    if let Some(best) = values.best() {
        debug!(
            "best {}: {:.4} rounds, {:.4} pool points",
            best.combination, best.expected_points, best.pool_points
        );
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn s(n: i64) -> Seed {
        Seed::new(n).unwrap()
    }

    fn combo(seeds: [i64; 4]) -> SeedCombination {
        SeedCombination::new(&seeds).unwrap()
    }

    #[test]
    fn test_enumeration_exhaustive() {
        let combos = enumerate_combinations();
        assert_eq!(combos.len(), 1820);

        let unique: HashSet<_> = combos.iter().collect();
        assert_eq!(unique.len(), 1820);

        assert_eq!(combos[0], combo([1, 2, 3, 4]));
        assert_eq!(combos[1819], combo([13, 14, 15, 16]));
        assert!(combos.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_combination_validation() {
        assert_eq!(combo([9, 1, 16, 4]).seeds(), &[s(1), s(4), s(9), s(16)]);
        assert!(SeedCombination::new(&[1, 2, 3]).is_err());
        assert!(SeedCombination::new(&[1, 2, 3, 4, 5]).is_err());
        assert!(SeedCombination::new(&[1, 2, 2, 4]).is_err());
        assert!(SeedCombination::new(&[0, 2, 3, 4]).is_err());
        assert!(SeedCombination::new(&[1, 2, 3, 17]).is_err());
        let table = WinProbabilityTable::uniform(0.5).unwrap();
        assert!(matches!(
            expected_points_for_combination(&[1, 1, 2, 3], &table, 10, Some(1)),
            Err(SeedPoolError::InvalidCombination { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(combo([16, 3, 8, 1]).to_string(), "(1, 3, 8, 16)");
    }

    #[test]
    fn test_nearest_seed_combination() {
        let picked = nearest_seed_combination(&[1.2, 1.4, 15.7, 40.0], false).unwrap();
        assert_eq!(picked, vec![s(1), s(2), s(16), s(15)]);

        let picked = nearest_seed_combination(&[1.2, 1.4, -3.0], true).unwrap();
        assert_eq!(picked, vec![s(1), s(1), s(1)]);

        // 2.5 is equidistant from 2 and 3
        assert_eq!(nearest_seed_combination(&[2.5], false).unwrap(), vec![s(2)]);

        assert!(nearest_seed_combination(&[1.0; 17], false).is_err());
        assert_eq!(
            SeedCombination::from_continuous(&[4.1, 3.9, 4.0, 12.2]).unwrap(),
            combo([3, 4, 5, 12])
        );
    }

    #[test]
    fn test_fair_coin_symmetry() {
        let table = WinProbabilityTable::uniform(0.5).unwrap();
        let top = expected_points_for_combination(&[1, 2, 3, 4], &table, 20_000, Some(5)).unwrap();
        let bottom =
            expected_points_for_combination(&[13, 14, 15, 16], &table, 20_000, Some(6)).unwrap();

        assert!((top - bottom).abs() < 0.1, "{} vs {}", top, bottom);
        assert!((top - 3.75).abs() < 0.1);
        assert!((bottom - 3.75).abs() < 0.1);
    }

    #[test]
    fn test_forced_round_one_win_raises_value() {
        let uniform = WinProbabilityTable::uniform(0.5).unwrap();
        let forced = uniform.with_override(s(1), s(16), 1.0).unwrap();
        let topology = BracketTopology::standard();
        let solo = combo([1, 2, 3, 4]);

        let base = estimate_combination(&solo, &topology, &uniform, 20_000, Some(8)).unwrap();
        let boosted = estimate_combination(&solo, &topology, &forced, 20_000, Some(8)).unwrap();

        // seed 1 goes from 0.9375 to 1 + 0.5 + 0.25 + 0.125 expected wins
        assert!(boosted.expected_points > base.expected_points);
        assert!((boosted.expected_points - base.expected_points - 0.9375).abs() < 0.1);
    }

    #[test]
    fn test_standard_error_shrinks() {
        let table = WinProbabilityTable::uniform(0.7).unwrap();
        let topology = BracketTopology::standard();
        let c = combo([1, 5, 9, 13]);

        let small = estimate_combination(&c, &topology, &table, 100, Some(2)).unwrap();
        let large = estimate_combination(&c, &topology, &table, 10_000, Some(2)).unwrap();
        assert!(large.standard_error < small.standard_error);
        assert!(large.standard_error > 0.0);
    }

    #[test]
    fn test_single_simulation_has_zero_error() {
        let table = WinProbabilityTable::uniform(0.5).unwrap();
        let topology = BracketTopology::standard();
        let c = combo([1, 2, 3, 4]);

        let estimate = estimate_combination(&c, &topology, &table, 1, Some(4)).unwrap();
        assert_eq!(estimate.standard_error, 0.0);
        assert!(estimate_combination(&c, &topology, &table, 0, None).is_err());
    }

    #[test]
    fn test_search_chalk_bracket() {
        let table = WinProbabilityTable::uniform(1.0).unwrap();
        let config = SearchConfig {
            n_simulations: 3,
            seed: Some(1),
            ..SearchConfig::default()
        };
        let values = search_all(&table, &config).unwrap();

        assert_eq!(values.len(), 1820);
        let best = values.best().unwrap();
        assert_eq!(best.combination, combo([1, 2, 3, 4]));
        assert_eq!(best.expected_points, 11.0);
        // 1*4 + 2*3 + 3*2 + 4*2
        assert_eq!(best.pool_points, 24.0);
        assert_eq!(values.top_k(20).len(), 20);
    }

    #[test]
    fn test_ranked_descending_with_tie_break() {
        // chalk outcomes are fixed, so many combinations tie exactly
        let table = WinProbabilityTable::uniform(1.0).unwrap();
        let config = SearchConfig {
            n_simulations: 1,
            seed: Some(2),
            ..SearchConfig::default()
        };
        let values = search_all(&table, &config).unwrap();
        let ranked = values.ranked();

        assert!(ranked
            .windows(2)
            .all(|w| w[0].expected_points >= w[1].expected_points));
        for w in ranked.windows(2) {
            if w[0].expected_points == w[1].expected_points {
                assert!(w[0].combination < w[1].combination);
            }
        }
        assert_eq!(values.best(), ranked.first().copied());
    }

    #[test]
    fn test_search_reproducible_and_seed_weighted() {
        let table = WinProbabilityTable::uniform(0.6).unwrap();
        let config = SearchConfig {
            n_simulations: 20,
            seed: Some(77),
            scoring: ScoringRule::SeedWeighted,
            ..SearchConfig::default()
        };
        let first = search_all(&table, &config).unwrap();
        let second = search_all(&table, &config).unwrap();

        for estimate in first.iter() {
            assert_eq!(Some(estimate), second.get(&estimate.combination));
        }
        let ranked = first.ranked();
        assert!(ranked.windows(2).all(|w| w[0].pool_points >= w[1].pool_points));
        assert_eq!(first.best(), ranked.first().copied());
        assert_eq!(first.scoring(), ScoringRule::SeedWeighted);
    }
}
