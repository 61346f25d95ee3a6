use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::CONFLICT_TOLERANCE;
use crate::error::{Result, SeedPoolError};
use crate::seed::Seed;

/// Nested raw input: seed -> {opponent seed -> win rate of `seed`}.
/// Values outside [0, 1] mean the pair was never observed.
pub type NestedRates = BTreeMap<i64, BTreeMap<i64, f64>>;

/// Sparse historical seed-vs-seed win rates.
///
/// Pairs are stored with the lower seed first and the value is the
/// probability that the lower seed wins. Lookups with the seeds reversed
/// are flipped automatically. A pair with no entry has never been observed.
#[derive(Clone, Debug, Default)]
pub struct RawWinRates {
    observations: HashMap<(Seed, Seed), Observation>,
}

#[derive(Clone, Copy, Debug)]
struct Observation {
    sum: f64,
    count: u32,
}

impl Observation {
    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

fn canonical(a: Seed, b: Seed, rate: f64) -> ((Seed, Seed), f64) {
    if a < b {
        ((a, b), rate)
    } else {
        ((b, a), 1.0 - rate)
    }
}

impl RawWinRates {
    pub fn new() -> Self {
        RawWinRates {
            observations: HashMap::new(),
        }
    }

    /// Ingest the nested map produced by the scraper.
    pub fn from_nested(nested: &NestedRates) -> Result<Self> {
        let mut raw = RawWinRates::new();
        for (&seed, opponents) in nested {
            for (&opponent, &rate) in opponents {
                raw.insert_raw(seed, opponent, rate)?;
            }
        }
        Ok(raw)
    }

    /// Validate seeds then record `rate` = P(seed beats opponent).
    pub fn insert_raw(&mut self, seed: i64, opponent: i64, rate: f64) -> Result<()> {
        let a = Seed::new(seed)?;
        let b = Seed::new(opponent)?;
        self.insert(a, b, rate)
    }

    /// Record P(a beats b). Out-of-range rates are the absent marker and
    /// leave the pair untouched.
    pub fn insert(&mut self, a: Seed, b: Seed, rate: f64) -> Result<()> {
        if a == b {
            return Err(SeedPoolError::SelfPairing { seed: a.get() });
        }
        if rate.is_nan() {
            return Err(SeedPoolError::NonFiniteRate {
                seed_a: a.get(),
                seed_b: b.get(),
            });
        }
        if !(0.0..=1.0).contains(&rate) {
            return Ok(());
        }

        let (key, value) = canonical(a, b, rate);
        match self.observations.get_mut(&key) {
            Some(obs) => {
                let existing = obs.mean();
                if (existing - value).abs() > CONFLICT_TOLERANCE {
                    return Err(SeedPoolError::ConflictingRecords {
                        lower: key.0.get(),
                        higher: key.1.get(),
                        existing,
                        incoming: value,
                    });
                }
                obs.sum += value;
                obs.count += 1;
            }
            None => {
                self.observations.insert(key, Observation { sum: value, count: 1 });
            }
        }
        Ok(())
    }

    /// Read records from a CSV file.
    /// Format: seed_a,seed_b,rate (rate is P(seed_a beats seed_b))
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| SeedPoolError::Io {
            path: display.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut raw = RawWinRates::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| SeedPoolError::Io {
                path: display.clone(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(SeedPoolError::MalformedRecord {
                    path: display,
                    line: idx + 1,
                    reason: format!("expected 3 fields, got {}", parts.len()),
                });
            }

            let (seed_a, seed_b) = match (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
                (Ok(a), Ok(b)) => (a, b),
                // header row
                _ if idx == 0 => continue,
                _ => {
                    return Err(SeedPoolError::MalformedRecord {
                        path: display,
                        line: idx + 1,
                        reason: "seeds must be integers".to_string(),
                    })
                }
            };
            let rate: f64 = parts[2].parse().map_err(|e| SeedPoolError::MalformedRecord {
                path: display.clone(),
                line: idx + 1,
                reason: format!("invalid rate: {}", e),
            })?;

            raw.insert_raw(seed_a, seed_b, rate)?;
        }

        Ok(raw)
    }

    /// Observed P(a beats b), if the pair has history.
    pub fn get(&self, a: Seed, b: Seed) -> Option<f64> {
        if a == b {
            return None;
        }
        let (key, flip) = if a < b { ((a, b), false) } else { ((b, a), true) };
        self.observations
            .get(&key)
            .map(|obs| obs.mean())
            .map(|p| if flip { 1.0 - p } else { p })
    }

    /// Number of distinct pairs with at least one observation.
    pub fn observed_count(&self) -> usize {
        self.observations.len()
    }
}
