use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::NUM_SEEDS;
use crate::error::{Result, SeedPoolError};

/// A team's rank within its region, 1 (best) through 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Seed(u8);

impl Seed {
    /// Validate and wrap a raw seed number.
    pub fn new(seed: i64) -> Result<Self> {
        if (1..=NUM_SEEDS as i64).contains(&seed) {
            Ok(Seed(seed as u8))
        } else {
            Err(SeedPoolError::SeedOutOfRange { seed })
        }
    }

    /// Seed from a 0-based index. Caller guarantees `index < 16`.
    pub(crate) const fn from_index(index: usize) -> Self {
        Seed(index as u8 + 1)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 0-based position for array lookups
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// |self - other|
    pub fn differential(self, other: Seed) -> usize {
        self.0.abs_diff(other.0) as usize
    }

    /// All 16 seeds, ascending.
    pub fn all() -> impl Iterator<Item = Seed> {
        (0..NUM_SEEDS).map(Seed::from_index)
    }
}

impl TryFrom<i64> for Seed {
    type Error = SeedPoolError;

    fn try_from(value: i64) -> Result<Self> {
        Seed::new(value)
    }
}

impl From<Seed> for u8 {
    fn from(seed: Seed) -> u8 {
        seed.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
