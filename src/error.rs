use thiserror::Error;

pub type Result<T> = std::result::Result<T, SeedPoolError>;

#[derive(Debug, Error)]
pub enum SeedPoolError {
    #[error("seed {seed} is outside 1..=16")]
    SeedOutOfRange { seed: i64 },
    #[error("seed {seed} cannot be paired with itself")]
    SelfPairing { seed: u8 },
    #[error("win rate for {seed_a} vs {seed_b} is not a number")]
    NonFiniteRate { seed_a: u8, seed_b: u8 },
    #[error(
        "conflicting records for {lower} vs {higher}: {existing:.3} and {incoming:.3} (lower seed)"
    )]
    ConflictingRecords {
        lower: u8,
        higher: u8,
        existing: f64,
        incoming: f64,
    },
    #[error("combination must be {expected} distinct seeds in 1..=16, got {seeds:?}")]
    InvalidCombination { expected: usize, seeds: Vec<i64> },
    #[error("probability table is missing {seed_a} vs {seed_b}")]
    IncompleteTable { seed_a: u8, seed_b: u8 },
    #[error("probability {value} for {seed_a} vs {seed_b} is outside [0, 1]")]
    ProbabilityOutOfRange { seed_a: u8, seed_b: u8, value: f64 },
    #[error("{seed_a} vs {seed_b} ({forward:.4}) and its reverse ({reverse:.4}) do not sum to 1")]
    NotComplementary {
        seed_a: u8,
        seed_b: u8,
        forward: f64,
        reverse: f64,
    },
    #[error("cannot place {requested} values on 16 seeds without repeats")]
    SearchSpaceExhausted { requested: usize },
    #[error("n_simulations must be at least 1")]
    NoSimulations,
    #[error("malformed line {line} in {path}: {reason}")]
    MalformedRecord {
        path: String,
        line: usize,
        reason: String,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
