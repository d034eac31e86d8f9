use super::{Pick, Strategy};
use crate::group::{Group, PersonId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform choice among the eligible candidates.
#[derive(Debug, Clone)]
pub struct RandomPick<R = StdRng> {
    rng: R,
}

impl RandomPick<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomPick<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> RandomPick<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomPick { rng }
    }
}

impl<R: Rng + Send> Strategy for RandomPick<R> {
    fn name(&self) -> &'static str {
        "random"
    }

    fn wishlist_mode(&self) -> bool {
        false
    }

    fn next_person(&mut self, _group: &Group, pick: &Pick<'_>) -> PersonId {
        pick.eligible[self.rng.gen_range(0..pick.eligible.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::PickFixture;

    fn people(n: usize) -> (Group, Vec<PersonId>) {
        let mut group = Group::new();
        let ids = (0..n).map(|i| group.register(format!("S{:03}", i))).collect();
        (group, ids)
    }

    #[test]
    fn test_picks_only_eligible() {
        let (group, ids) = people(6);
        let fixture = PickFixture::new(&ids[2..5], &[]);
        let mut strategy = RandomPick::seeded(7);
        for _ in 0..100 {
            let picked = strategy.next_person(&group, &fixture.pick());
            assert!(fixture.eligible.contains(&picked));
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let (group, ids) = people(10);
        let fixture = PickFixture::new(&ids, &[]);
        let mut first = RandomPick::seeded(42);
        let mut second = RandomPick::seeded(42);
        for _ in 0..20 {
            assert_eq!(
                first.next_person(&group, &fixture.pick()),
                second.next_person(&group, &fixture.pick())
            );
        }
    }

    #[test]
    fn test_reaches_every_candidate() {
        let (group, ids) = people(4);
        let fixture = PickFixture::new(&ids, &[]);
        let mut strategy = RandomPick::seeded(1);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(strategy.next_person(&group, &fixture.pick()));
        }
        assert_eq!(seen.len(), 4);
    }
}
