use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::constants::NUM_SEEDS;
use crate::game_transform::{certain, game_transform_prob, game_transform_sim, SlotDistribution};
use crate::seed::Seed;
use crate::topology::BracketTopology;
use crate::win_prob::WinProbabilityTable;

/// Rounds won by each seed in one simulated region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointsBySeed {
    wins: [u8; NUM_SEEDS],
}

impl PointsBySeed {
    pub fn get(&self, seed: Seed) -> u8 {
        self.wins[seed.index()]
    }

    /// Wins across all seeds: 15 for a completed region (8 + 4 + 2 + 1 games).
    pub fn total(&self) -> u32 {
        self.wins.iter().map(|&w| w as u32).sum()
    }

    /// Seed that won every round.
    pub fn champion(&self) -> Option<Seed> {
        let max = *self.wins.iter().max()?;
        Seed::all().find(|s| self.wins[s.index()] == max && max > 0)
    }

    pub fn sum_for(&self, seeds: &[Seed]) -> u32 {
        seeds.iter().map(|&s| self.get(s) as u32).sum()
    }

    pub fn as_array(&self) -> &[u8; NUM_SEEDS] {
        &self.wins
    }
}

/// Play out one region.
///
/// Each round pairs adjacent surviving slots; the winner of each game
/// earns one point and advances. All state lives on this call's stack.
///
/// # Arguments
/// * `topology` - Slot order of the region
/// * `table` - Completed win probability table
/// * `rng` - Random source owned by this playout
///
/// # Returns
/// Rounds won by every seed; the champion holds 4
pub fn simulate_region<R: Rng>(
    topology: &BracketTopology,
    table: &WinProbabilityTable,
    rng: &mut R,
) -> PointsBySeed {
    let mut points = PointsBySeed::default();
    let mut alive: Vec<Seed> = topology.seeds_in_order().to_vec();

    while alive.len() > 1 {
        let mut next = Vec::with_capacity(alive.len() / 2);
        for pair in alive.chunks(2) {
            let winner = game_transform_sim(pair[0], pair[1], table, rng);
            points.wins[winner.index()] += 1;
            next.push(winner);
        }
        alive = next;
    }

    points
}

/// Single playout with its own ChaCha8 stream; entropy-seeded when `seed`
/// is `None`.
pub fn simulate_region_seeded(
    topology: &BracketTopology,
    table: &WinProbabilityTable,
    seed: Option<u64>,
) -> PointsBySeed {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    simulate_region(topology, table, &mut rng)
}

/// Run multiple independent playouts.
///
/// Each playout gets a fresh generator seeded from a master stream, so a
/// fixed `seed` reproduces the whole batch.
pub fn run_simulations(
    topology: &BracketTopology,
    table: &WinProbabilityTable,
    n_simulations: usize,
    seed: Option<u64>,
) -> Vec<PointsBySeed> {
    let mut master = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    (0..n_simulations)
        .map(|_| {
            let sim_seed = master.gen::<u64>();
            simulate_region_seeded(topology, table, Some(sim_seed))
        })
        .collect()
}

/// Exact expected rounds won per seed.
///
/// # Returns
/// Expected rounds won, indexed by `Seed::index`
pub fn expected_points_exact(
    topology: &BracketTopology,
    table: &WinProbabilityTable,
) -> [f64; NUM_SEEDS] {
    let mut expected = [0.0; NUM_SEEDS];
    let mut games: Vec<SlotDistribution> =
        topology.seeds_in_order().iter().map(|&s| certain(s)).collect();

    while games.len() > 1 {
        let mut next = Vec::with_capacity(games.len() / 2);
        for pair in games.chunks(2) {
            let parent = game_transform_prob(&pair[0], &pair[1], table);
            for (total, p) in expected.iter_mut().zip(parent.iter()) {
                *total += p;
            }
            next.push(parent);
        }
        games = next;
    }

    expected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(n: i64) -> Seed {
        Seed::new(n).unwrap()
    }

    #[test]
    fn test_single_winner_invariant() {
        let topology = BracketTopology::standard();
        let table = WinProbabilityTable::uniform(0.7).unwrap();

        for points in run_simulations(&topology, &table, 500, Some(3)) {
            assert_eq!(points.total(), 15);
            let fours = points.as_array().iter().filter(|&&w| w == 4).count();
            assert_eq!(fours, 1);
            assert!(points.as_array().iter().all(|&w| w <= 4));
            assert_eq!(points.get(points.champion().unwrap()), 4);
        }
    }

    #[test]
    fn test_chalk_bracket() {
        let topology = BracketTopology::standard();
        let table = WinProbabilityTable::uniform(1.0).unwrap();
        let points = simulate_region_seeded(&topology, &table, Some(1));

        assert_eq!(points.get(s(1)), 4);
        assert_eq!(points.get(s(2)), 3);
        assert_eq!(points.get(s(3)), 2);
        assert_eq!(points.get(s(4)), 2);
        for seed in 5..=8 {
            assert_eq!(points.get(s(seed)), 1);
        }
        for seed in 9..=16 {
            assert_eq!(points.get(s(seed)), 0);
        }
    }

    #[test]
    fn test_round_one_losers_stop_scoring() {
        // 16 always beats 1, everyone else chalk
        let topology = BracketTopology::standard();
        let table = WinProbabilityTable::uniform(1.0)
            .unwrap()
            .with_override(s(16), s(1), 1.0)
            .unwrap();
        let points = simulate_region_seeded(&topology, &table, Some(9));

        assert_eq!(points.get(s(1)), 0);
        assert_eq!(points.get(s(16)), 1);
        // 8 then beats 16 and reaches the regional semifinal
        assert_eq!(points.get(s(8)), 2);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let topology = BracketTopology::standard();
        let table = WinProbabilityTable::uniform(0.6).unwrap();

        let a = run_simulations(&topology, &table, 50, Some(42));
        let b = run_simulations(&topology, &table, 50, Some(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_exact_expectation_sums_to_games_played() {
        let topology = BracketTopology::standard();
        let table = WinProbabilityTable::uniform(0.5)
            .unwrap()
            .with_override(s(3), s(14), 0.85)
            .unwrap();
        let expected = expected_points_exact(&topology, &table);

        let total: f64 = expected.iter().sum();
        assert!((total - 15.0).abs() < 1e-9, "got {}", total);
    }

    #[test]
    fn test_fair_coin_exact() {
        // each seed: 1/2 + 1/4 + 1/8 + 1/16
        let expected = expected_points_exact(
            &BracketTopology::standard(),
            &WinProbabilityTable::uniform(0.5).unwrap(),
        );
        for e in expected {
            assert!((e - 0.9375).abs() < 1e-12);
        }
    }

    #[test]
    fn test_monte_carlo_matches_exact() {
        let topology = BracketTopology::standard();
        let table = WinProbabilityTable::uniform(0.7).unwrap();
        let exact = expected_points_exact(&topology, &table);

        let n = 20_000;
        let mut totals = [0u64; NUM_SEEDS];
        for points in run_simulations(&topology, &table, n, Some(11)) {
            for (t, &w) in totals.iter_mut().zip(points.as_array()) {
                *t += w as u64;
            }
        }
        for seed in Seed::all() {
            let mean = totals[seed.index()] as f64 / n as f64;
            assert!(
                (mean - exact[seed.index()]).abs() < 0.05,
                "seed {}: simulated {} exact {}",
                seed,
                mean,
                exact[seed.index()]
            );
        }
    }
}
