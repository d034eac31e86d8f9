use super::{scarcest, Level, Pick, Strategy};
use crate::group::{Group, PersonId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds each subgroup by following wishlists from person to person.
///
/// A subgroup opens with the eligible person who has the fewest remaining
/// wishes, since they have the fewest chances left to be satisfied. Every
/// further pick looks at the person placed last: first at whom they wished
/// for, then at who wished for them, and only when both come up empty at a
/// random eligible candidate. The only nondeterminism is that last step.
#[derive(Debug, Clone)]
pub struct WishlistFollowing<R = StdRng> {
    rng: R,
    start: Option<PersonId>,
}

impl WishlistFollowing<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for WishlistFollowing<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> WishlistFollowing<R> {
    pub fn with_rng(rng: R) -> Self {
        WishlistFollowing { rng, start: None }
    }

    /// Opens the very first subgroup with `start`. The seed is used once;
    /// with main groups it also lands in the first main group.
    pub fn starting_with(mut self, start: PersonId) -> Self {
        self.start = Some(start);
        self
    }

    pub fn pending_start(&self) -> Option<PersonId> {
        self.start
    }
}

impl<R: Rng + Send> Strategy for WishlistFollowing<R> {
    fn name(&self) -> &'static str {
        "wishlist"
    }

    fn next_person(&mut self, group: &Group, pick: &Pick<'_>) -> PersonId {
        if let Some(start) = self.start {
            if pick.index == 0 && pick.opens_subgroup() && pick.eligible.contains(&start) {
                if pick.level == Level::Subgroup {
                    self.start = None;
                }
                return start;
            }
            if pick.level == Level::Subgroup {
                self.start = None;
                tracing::debug!("Starting person {} is not eligible, ignoring", start);
            }
        }

        let last = match pick.members.last() {
            Some(&last) => last,
            None => {
                return scarcest(group, pick.eligible, pick.unassigned).unwrap_or(pick.eligible[0])
            }
        };

        let wished: Vec<PersonId> = group
            .wishes(last)
            .iter()
            .copied()
            .filter(|id| pick.eligible.contains(id))
            .collect();
        if let Some(id) = scarcest(group, &wished, pick.unassigned) {
            return id;
        }

        let admirers: Vec<PersonId> = pick
            .eligible
            .iter()
            .copied()
            .filter(|&id| group.wishes_for(id, last))
            .collect();
        if let Some(id) = scarcest(group, &admirers, pick.unassigned) {
            return id;
        }

        pick.eligible[self.rng.gen_range(0..pick.eligible.len())]
    }
}
