use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::iter;
use vrt_core::{Condition, ExperimentError};

/// Pre-shuffled, finite sequence of per-trial conditions. Built once, never refilled.
#[derive(Debug, Clone)]
pub struct TrialDeck {
    remaining: Vec<Condition>,
}

impl TrialDeck {
    /// Builds the multiset described by `counts` and shuffles it uniformly (Fisher-Yates).
    pub fn create<R: Rng + ?Sized>(counts: &BTreeMap<Condition, usize>, rng: &mut R) -> Self {
        let mut remaining: Vec<Condition> = counts
            .iter()
            .flat_map(|(&condition, &n)| iter::repeat_n(condition, n))
            .collect();
        remaining.shuffle(rng);
        Self { remaining }
    }

    pub fn pop(&mut self) -> Result<Condition, ExperimentError> {
        self.remaining.pop().ok_or(ExperimentError::EmptyDeck)
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn count(&self, condition: Condition) -> usize {
        self.remaining.iter().filter(|&&c| c == condition).count()
    }

    /// Remaining conditions; the next `pop` returns the last element.
    pub fn remaining(&self) -> &[Condition] {
        &self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExperimentConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn balanced() -> BTreeMap<Condition, usize> {
        ExperimentConfig::default().condition_counts
    }

    #[test]
    fn pops_every_condition_then_fails() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut deck = TrialDeck::create(&balanced(), &mut rng);
        let mut drawn = Vec::new();
        while !deck.is_empty() {
            drawn.push(deck.pop().unwrap());
            assert_eq!(deck.len(), 10 - drawn.len());
        }
        assert_eq!(drawn.iter().filter(|&&c| c == Condition::Left).count(), 5);
        assert_eq!(deck.pop(), Err(ExperimentError::EmptyDeck));
    }

    #[test]
    fn shuffle_reaches_many_orderings() {
        let mut rng = StdRng::seed_from_u64(11);
        let orders: HashSet<Vec<Condition>> = (0..200)
            .map(|_| TrialDeck::create(&balanced(), &mut rng).remaining().to_vec())
            .collect();
        // 252 distinct arrangements exist; a biased shuffle would collapse to a handful.
        assert!(orders.len() > 100, "only {} distinct orders", orders.len());
    }

    #[test]
    fn first_position_is_not_pinned() {
        let mut rng = StdRng::seed_from_u64(5);
        let lefts_on_top = (0..1_000)
            .filter(|_| {
                let mut deck = TrialDeck::create(&balanced(), &mut rng);
                deck.pop() == Ok(Condition::Left)
            })
            .count();
        assert!((350..=650).contains(&lefts_on_top), "{lefts_on_top}");
    }
}
