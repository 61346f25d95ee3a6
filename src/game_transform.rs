use rand::Rng;

use crate::constants::NUM_SEEDS;
use crate::seed::Seed;
use crate::win_prob::WinProbabilityTable;

/// Probability that each seed (by index) occupies a bracket slot.
pub type SlotDistribution = [f64; NUM_SEEDS];

/// Distribution for a slot known to hold `seed`.
pub fn certain(seed: Seed) -> SlotDistribution {
    let mut dist = [0.0; NUM_SEEDS];
    dist[seed.index()] = 1.0;
    dist
}

/// Probabilistic game transformation.
///
/// Given the distributions of the two feeder slots, returns the
/// distribution of the winner's slot.
///
/// # Arguments
/// * `child1` - First feeder slot's occupancy distribution
/// * `child2` - Second feeder slot's occupancy distribution
/// * `table` - Completed win probability table
///
/// # Returns
/// Probability of each seed advancing out of this game
pub fn game_transform_prob(
    child1: &SlotDistribution,
    child2: &SlotDistribution,
    table: &WinProbabilityTable,
) -> SlotDistribution {
    let mut parent = [0.0; NUM_SEEDS];

    for seed1 in Seed::all() {
        let occ1 = child1[seed1.index()];
        if occ1 == 0.0 {
            continue;
        }
        for seed2 in Seed::all() {
            let occ2 = child2[seed2.index()];
            if occ2 == 0.0 || seed1 == seed2 {
                continue;
            }
            let game_prob = occ1 * occ2;
            let p1 = table.win_prob(seed1, seed2);

            parent[seed1.index()] += game_prob * p1;
            parent[seed2.index()] += game_prob * (1.0 - p1);
        }
    }

    parent
}

/// Monte Carlo game simulation.
///
/// Draws `u` in [0, 1) and awards the game to the better-ranked seed when
/// `u` falls below its win probability.
///
/// # Arguments
/// * `seed1`, `seed2` - The two seeds playing, in either order
/// * `table` - Completed win probability table
/// * `rng` - Random source for this game's draw
///
/// # Returns
/// The winning seed
pub fn game_transform_sim<R: Rng>(
    seed1: Seed,
    seed2: Seed,
    table: &WinProbabilityTable,
    rng: &mut R,
) -> Seed {
    let (lower, higher) = if seed1 < seed2 { (seed1, seed2) } else { (seed2, seed1) };
    let prob = table.probability_lower_seed_wins(lower, higher);
    if rng.gen::<f64>() < prob {
        lower
    } else {
        higher
    }
}
