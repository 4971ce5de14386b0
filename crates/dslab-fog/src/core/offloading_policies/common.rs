use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::core::slot::{ResourceSlot, SlotCatalog, SlotId};
use crate::core::task::Task;

/// Rule for choosing among equally scored slots.
#[derive(Clone, Debug)]
pub enum TieBreak {
    /// The first slot in catalog order wins.
    FirstInCatalog,
    /// A uniformly random slot wins. The generator is re-seeded on reset, so runs are reproducible.
    Random { seed: u64, rng: Pcg64 },
}

impl TieBreak {
    pub fn random(seed: u64) -> Self {
        TieBreak::Random {
            seed,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn reset(&mut self) {
        if let TieBreak::Random { seed, rng } = self {
            *rng = Pcg64::seed_from_u64(*seed);
        }
    }

    /// Returns the slot with the minimum score.
    pub fn pick_min<I: IntoIterator<Item = (SlotId, f64)>>(&mut self, scored: I) -> Option<SlotId> {
        let mut best: Vec<SlotId> = Vec::new();
        let mut best_score = f64::INFINITY;
        for (slot_id, score) in scored {
            if best.is_empty() || score < best_score {
                best_score = score;
                best.clear();
                best.push(slot_id);
            } else if score == best_score {
                best.push(slot_id);
            }
        }
        match self {
            TieBreak::FirstInCatalog => best.first().copied(),
            TieBreak::Random { rng, .. } => {
                if best.is_empty() {
                    None
                } else {
                    Some(best[rng.gen_range(0..best.len())])
                }
            }
        }
    }
}

/// Slots on which the task is allowed to run according to its tier affinity, in catalog order.
pub fn eligible_slots<'a>(task: &'a Task, catalog: &'a SlotCatalog) -> impl Iterator<Item = &'a ResourceSlot> {
    catalog.iter().filter(move |slot| task.accepts(slot.tier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_minimum_wins() {
        let mut tie_break = TieBreak::FirstInCatalog;
        assert_eq!(tie_break.pick_min([(3, 2.), (4, 1.), (5, 1.), (6, 7.)]), Some(4));
        assert_eq!(tie_break.pick_min([(1, f64::INFINITY), (2, f64::INFINITY)]), Some(1));
        assert_eq!(tie_break.pick_min(Vec::<(SlotId, f64)>::new()), None);
    }

    #[test]
    fn random_tie_break_is_reproducible() {
        let scored = [(0, 1.), (1, 1.), (2, 1.), (3, 5.)];
        let mut tie_break = TieBreak::random(42);
        let first: Vec<Option<SlotId>> = (0..20).map(|_| tie_break.pick_min(scored)).collect();
        assert!(first.iter().all(|s| matches!(s, Some(0..=2))));
        tie_break.reset();
        let second: Vec<Option<SlotId>> = (0..20).map(|_| tie_break.pick_min(scored)).collect();
        assert_eq!(first, second);
    }
}
