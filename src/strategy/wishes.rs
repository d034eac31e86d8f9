use super::{remaining_wishes, Pick, Strategy};
use crate::group::{Group, PersonId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Greedily maximizes wish edges inside the subgroup being built.
///
/// Candidates are ranked by the number of wish edges (either direction)
/// they share with the current members. Ties go to the candidate with the
/// fewest wishes still pointing at unplaced persons, so that people with
/// more open options stay available for later subgroups. Remaining ties are
/// broken by the random source.
#[derive(Debug, Clone)]
pub struct WishMaximizing<R = StdRng> {
    rng: R,
}

impl WishMaximizing<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for WishMaximizing<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> WishMaximizing<R> {
    pub fn with_rng(rng: R) -> Self {
        WishMaximizing { rng }
    }
}

fn rank(group: &Group, pick: &Pick<'_>, candidate: PersonId) -> (usize, std::cmp::Reverse<usize>) {
    let links = pick
        .members
        .iter()
        .map(|&member| group.wish_links(candidate, member))
        .sum();
    let open = remaining_wishes(group, candidate, pick.unassigned);
    (links, std::cmp::Reverse(open))
}

impl<R: Rng + Send> Strategy for WishMaximizing<R> {
    fn name(&self) -> &'static str {
        "wishes"
    }

    fn next_person(&mut self, group: &Group, pick: &Pick<'_>) -> PersonId {
        let mut best = Vec::new();
        let mut best_rank = None;
        for &candidate in pick.eligible {
            let rank = rank(group, pick, candidate);
            match best_rank {
                Some(current) if rank < current => {}
                Some(current) if rank == current => best.push(candidate),
                _ => {
                    best_rank = Some(rank);
                    best.clear();
                    best.push(candidate);
                }
            }
        }
        best.choose(&mut self.rng)
            .copied()
            .unwrap_or(pick.eligible[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::PickFixture;

    #[test]
    fn test_prefers_most_wish_links() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        let d = group.register("D");
        group.add_wish(a, c).unwrap();
        group.add_wish(c, a).unwrap();
        group.add_wish(b, a).unwrap();

        let fixture = PickFixture::new(&[b, c, d], &[a]);
        let mut strategy = WishMaximizing::seeded(3);
        assert_eq!(strategy.next_person(&group, &fixture.pick()), c);
    }

    #[test]
    fn test_tie_goes_to_fewest_open_wishes() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        let d = group.register("D");
        group.add_wish(b, d).unwrap();
        group.add_wish(b, c).unwrap();
        group.add_wish(c, d).unwrap();

        // Nobody is linked to A; C has one open wish, B two, D none.
        let fixture = PickFixture::new(&[b, c, d], &[a]);
        for seed in 0..10 {
            let mut strategy = WishMaximizing::seeded(seed);
            assert_eq!(strategy.next_person(&group, &fixture.pick()), d);
        }
    }

    #[test]
    fn test_full_tie_is_randomized_within_tied_set() {
        let mut group = Group::new();
        let ids: Vec<_> = (0..5).map(|i| group.register(format!("S{:03}", i))).collect();
        let fixture = PickFixture::new(&ids, &[]);

        let mut seen = std::collections::BTreeSet::new();
        let mut strategy = WishMaximizing::seeded(11);
        for _ in 0..100 {
            seen.insert(strategy.next_person(&group, &fixture.pick()));
        }
        assert!(seen.len() > 1);
    }
}
