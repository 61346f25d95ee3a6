use log::{debug, info};
use std::collections::BTreeMap;

use crate::constants::{MAX_DIFFERENTIAL, NUM_SEEDS, UNOBSERVED_FALLBACK_PROB};
use crate::error::{Result, SeedPoolError};
use crate::raw::RawWinRates;
use crate::seed::Seed;

/// Persisted form: seed -> {opponent -> P(seed beats opponent)}.
pub type NestedTable = BTreeMap<u8, BTreeMap<u8, f64>>;

/// Dense, complete seed-vs-seed win probabilities for one region.
///
/// `probs[i][j]` is the probability that seed `i + 1` beats seed `j + 1`.
/// Both directions are always stored and always sum to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct WinProbabilityTable {
    probs: [[f64; NUM_SEEDS]; NUM_SEEDS],
}

impl WinProbabilityTable {
    /// Table where the lower seed wins every matchup with probability `p`.
    ///
    /// # Returns
    /// `ProbabilityOutOfRange` when `p` is NaN or outside [0, 1]
    pub fn uniform(p: f64) -> Result<Self> {
        check_probability(Seed::from_index(0), Seed::from_index(1), p)?;
        Ok(Self::from_fn(|_, _| p))
    }

    /// Build from a function giving P(lower seed wins) for `(lower, higher)`.
    /// Callers only pass values already known to lie in [0, 1].
    pub(crate) fn from_fn<F: FnMut(Seed, Seed) -> f64>(mut lower_wins: F) -> Self {
        let mut probs = [[0.5; NUM_SEEDS]; NUM_SEEDS];
        for lower in Seed::all() {
            for higher in Seed::all().filter(|&h| h > lower) {
                let p = lower_wins(lower, higher);
                debug_assert!((0.0..=1.0).contains(&p), "{} vs {}: {}", lower, higher, p);
                probs[lower.index()][higher.index()] = p;
                probs[higher.index()][lower.index()] = 1.0 - p;
            }
        }
        WinProbabilityTable { probs }
    }

    /// Probability that `a` beats `b`.
    #[inline]
    pub fn win_prob(&self, a: Seed, b: Seed) -> f64 {
        self.probs[a.index()][b.index()]
    }

    /// Probability that the better-ranked of the two seeds wins,
    /// regardless of argument order.
    #[inline]
    pub fn probability_lower_seed_wins(&self, a: Seed, b: Seed) -> f64 {
        if a < b {
            self.win_prob(a, b)
        } else {
            self.win_prob(b, a)
        }
    }

    /// Copy of this table with one matchup forced to P(a beats b) = `p`.
    ///
    /// # Arguments
    /// * `a` - Seed whose win probability is set
    /// * `b` - Opponent; must differ from `a`
    /// * `p` - Probability of `a` winning (0.0-1.0)
    pub fn with_override(&self, a: Seed, b: Seed, p: f64) -> Result<Self> {
        if a == b {
            return Err(SeedPoolError::SelfPairing { seed: a.get() });
        }
        check_probability(a, b, p)?;

        let mut table = self.clone();
        table.probs[a.index()][b.index()] = p;
        table.probs[b.index()][a.index()] = 1.0 - p;
        Ok(table)
    }

    /// Symmetric nested map for caching.
    pub fn to_nested(&self) -> NestedTable {
        Seed::all()
            .map(|a| {
                let row = Seed::all()
                    .filter(|&b| b != a)
                    .map(|b| (b.get(), self.win_prob(a, b)))
                    .collect();
                (a.get(), row)
            })
            .collect()
    }

    /// Rebuild from a cached nested map. Every pair must be present in
    /// both directions, inside [0, 1] and complementary. Keys outside
    /// 1..=16 and self pairs are rejected.
    pub fn from_nested(nested: &NestedTable) -> Result<Self> {
        for (&seed, row) in nested {
            let seed = Seed::new(seed as i64)?;
            for &opponent in row.keys() {
                if Seed::new(opponent as i64)? == seed {
                    return Err(SeedPoolError::SelfPairing { seed: seed.get() });
                }
            }
        }

        let lookup = |a: Seed, b: Seed| -> Result<f64> {
            let value = nested
                .get(&a.get())
                .and_then(|row| row.get(&b.get()))
                .copied()
                .ok_or(SeedPoolError::IncompleteTable {
                    seed_a: a.get(),
                    seed_b: b.get(),
                })?;
            check_probability(a, b, value)?;
            Ok(value)
        };

        let mut probs = [[0.5; NUM_SEEDS]; NUM_SEEDS];
        for lower in Seed::all() {
            for higher in Seed::all().filter(|&h| h > lower) {
                let forward = lookup(lower, higher)?;
                let reverse = lookup(higher, lower)?;
                if (forward + reverse - 1.0).abs() > 1e-9 {
                    return Err(SeedPoolError::NotComplementary {
                        seed_a: lower.get(),
                        seed_b: higher.get(),
                        forward,
                        reverse,
                    });
                }
                probs[lower.index()][higher.index()] = forward;
                probs[higher.index()][lower.index()] = 1.0 - forward;
            }
        }
        Ok(WinProbabilityTable { probs })
    }
}

fn check_probability(a: Seed, b: Seed, value: f64) -> Result<()> {
    // NaN fails the range check
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SeedPoolError::ProbabilityOutOfRange {
            seed_a: a.get(),
            seed_b: b.get(),
            value,
        })
    }
}

/// Mean observed lower-seed win rate for each seed differential.
///
/// Index `d - 1` holds the surrogate for differential `d`; `None` when no
/// pair with that differential has any history.
pub fn surrogates_by_differential(raw: &RawWinRates) -> [Option<f64>; MAX_DIFFERENTIAL] {
    let mut sums = [0.0; MAX_DIFFERENTIAL];
    let mut counts = [0usize; MAX_DIFFERENTIAL];

    for lower in Seed::all() {
        for higher in Seed::all().filter(|&h| h > lower) {
            if let Some(p) = raw.get(lower, higher) {
                let bucket = lower.differential(higher) - 1;
                sums[bucket] += p;
                counts[bucket] += 1;
            }
        }
    }

    let mut surrogates = [None; MAX_DIFFERENTIAL];
    for (bucket, surrogate) in surrogates.iter_mut().enumerate() {
        if counts[bucket] > 0 {
            *surrogate = Some(sums[bucket] / counts[bucket] as f64);
        }
    }
    surrogates
}

/// Complete a sparse historical table.
///
/// Observed pairs keep their value as-is, including exact 0.0 or 1.0 from
/// sparse history. Unobserved pairs take the mean of their differential
/// bucket, or `UNOBSERVED_FALLBACK_PROB` when the bucket is empty.
///
/// # Arguments
/// * `raw` - Sparse historical rates; absent pairs need a surrogate
///
/// # Returns
/// Dense table with every pair in [0, 1]
pub fn build_probability_table(raw: &RawWinRates) -> WinProbabilityTable {
    let surrogates = surrogates_by_differential(raw);
    for (bucket, surrogate) in surrogates.iter().enumerate() {
        match surrogate {
            Some(p) => debug!("differential {}: surrogate {:.4}", bucket + 1, p),
            None => debug!(
                "differential {}: no history, fallback {:.2}",
                bucket + 1,
                UNOBSERVED_FALLBACK_PROB
            ),
        }
    }

    let mut filled = 0usize;
    let table = WinProbabilityTable::from_fn(|lower, higher| match raw.get(lower, higher) {
        Some(p) => p,
        None => {
            filled += 1;
            surrogates[lower.differential(higher) - 1].unwrap_or(UNOBSERVED_FALLBACK_PROB)
        }
    });

    info!(
        "built probability table: {} observed pairs, {} surrogate-filled",
        raw.observed_count(),
        filled
    );
    table
}
