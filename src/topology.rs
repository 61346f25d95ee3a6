use crate::constants::{NUM_ROUNDS, NUM_SEEDS, STANDARD_SEED_ORDER};
use crate::seed::Seed;

/// Fixed single-elimination tree for one 16-seed region.
///
/// Seeds sit in 16 slots. In every round slots `2k` and `2k + 1` play and
/// the winner takes slot `k` of the next round, so the pairing of later
/// rounds follows from the slot order alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BracketTopology {
    slots: [Seed; NUM_SEEDS],
}

impl BracketTopology {
    /// 1v16, 8v9, 5v12, 4v13, 6v11, 3v14, 7v10, 2v15.
    pub const fn standard() -> Self {
        let mut slots = [Seed::from_index(0); NUM_SEEDS];
        let mut i = 0;
        while i < NUM_SEEDS {
            slots[i] = Seed::from_index(STANDARD_SEED_ORDER[i] as usize - 1);
            i += 1;
        }
        BracketTopology { slots }
    }

    /// Seeds in slot order
    pub fn seeds_in_order(&self) -> &[Seed; NUM_SEEDS] {
        &self.slots
    }

    pub fn round_one_pairings(&self) -> Vec<(Seed, Seed)> {
        self.slots.chunks(2).map(|pair| (pair[0], pair[1])).collect()
    }

    /// Round-1 slot of `seed`.
    pub fn slot_of(&self, seed: Seed) -> usize {
        self.slots
            .iter()
            .position(|&s| s == seed)
            .unwrap_or_else(|| unreachable!("every seed has a slot"))
    }

    /// Seeds `seed` could face in `round` (1-based), assuming it got there.
    ///
    /// In round r the opponent comes from the sibling block of 2^(r-1)
    /// slots next to the seed's own block.
    pub fn potential_opponents(&self, seed: Seed, round: usize) -> Vec<Seed> {
        if round == 0 || round > NUM_ROUNDS {
            return Vec::new();
        }
        let block = 1usize << (round - 1);
        let own_block = self.slot_of(seed) / block;
        let sibling = own_block ^ 1;

        let mut opponents = self.slots[sibling * block..(sibling + 1) * block].to_vec();
        opponents.sort();
        opponents
    }
}

impl Default for BracketTopology {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(values: &[u8]) -> Vec<Seed> {
        values.iter().map(|&v| Seed::new(v as i64).unwrap()).collect()
    }

    #[test]
    fn test_round_one_pairings() {
        let topology = BracketTopology::standard();
        let pairs: Vec<(u8, u8)> = topology
            .round_one_pairings()
            .into_iter()
            .map(|(a, b)| (a.get(), b.get()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, 16), (8, 9), (5, 12), (4, 13), (6, 11), (3, 14), (7, 10), (2, 15)]
        );
    }

    #[test]
    fn test_slots_are_a_permutation() {
        let topology = BracketTopology::standard();
        let mut sorted = topology.seeds_in_order().to_vec();
        sorted.sort();
        assert_eq!(sorted, Seed::all().collect::<Vec<_>>());
    }

    #[test]
    fn test_potential_opponents_seed_one() {
        let topology = BracketTopology::standard();
        let one = Seed::new(1).unwrap();
        assert_eq!(topology.potential_opponents(one, 1), seeds(&[16]));
        assert_eq!(topology.potential_opponents(one, 2), seeds(&[8, 9]));
        assert_eq!(topology.potential_opponents(one, 3), seeds(&[4, 5, 12, 13]));
        assert_eq!(
            topology.potential_opponents(one, 4),
            seeds(&[2, 3, 6, 7, 10, 11, 14, 15])
        );
        assert!(topology.potential_opponents(one, 5).is_empty());
    }

    #[test]
    fn test_potential_opponents_seed_seven() {
        let topology = BracketTopology::standard();
        let seven = Seed::new(7).unwrap();
        assert_eq!(topology.potential_opponents(seven, 1), seeds(&[10]));
        assert_eq!(topology.potential_opponents(seven, 2), seeds(&[2, 15]));
        assert_eq!(topology.potential_opponents(seven, 3), seeds(&[3, 6, 11, 14]));
        assert_eq!(
            topology.potential_opponents(seven, 4),
            seeds(&[1, 4, 5, 8, 9, 12, 13, 16])
        );
    }
}
