/// Seeds in a single region
pub const NUM_SEEDS: usize = 16;

/// Rounds played inside one region (round of 64 through the regional final)
pub const NUM_ROUNDS: usize = 4;

/// Seeds picked per region
pub const COMBINATION_SIZE: usize = 4;

/// C(16, 4)
pub const NUM_COMBINATIONS: usize = 1820;

/// C(16, 2)
pub const NUM_PAIRS: usize = 120;

/// Largest possible seed differential
pub const MAX_DIFFERENTIAL: usize = NUM_SEEDS - 1;

/// Lower-seed win probability used when a whole differential bucket has
/// no historical games. Only differential 14 (1v15, 2v16) hits this.
pub const UNOBSERVED_FALLBACK_PROB: f64 = 0.90;

/// Conventional "never observed" marker in raw scraped data.
/// Any value outside [0, 1] is treated the same way.
pub const RAW_SENTINEL: f64 = -1.0;

/// Two records for the same pair may disagree by at most this much
/// (after flipping to the lower seed) before ingestion rejects them.
pub const CONFLICT_TOLERANCE: f64 = 0.02;

/// Simulations per combination in a production run
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Rows reported from the ranked table by default
pub const DEFAULT_TOP_K: usize = 20;

/// Seeds in bracket slot order. Slots (2k, 2k+1) meet in round 1 and
/// adjacent winners meet in every later round.
pub const STANDARD_SEED_ORDER: [u8; NUM_SEEDS] =
    [1, 16, 8, 9, 5, 12, 4, 13, 6, 11, 3, 14, 7, 10, 2, 15];
