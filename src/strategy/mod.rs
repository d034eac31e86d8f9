//! Person-selection strategies plugged into the partition driver.
//!
//! The driver owns the loop, the constraint check and the bookkeeping; a
//! strategy only answers "who goes next" from a non-empty list of eligible
//! candidates.

mod random;
mod wishes;
mod wishlist;

pub use random::RandomPick;
pub use wishes::WishMaximizing;
pub use wishlist::WishlistFollowing;

use crate::group::{Group, PersonId};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which partition is being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    MainGroup,
    Subgroup,
}

/// Everything a strategy may look at when choosing the next person.
#[derive(Debug, Clone, Copy)]
pub struct Pick<'a> {
    /// Unplaced persons allowed to join `members`, ascending by id. Never empty.
    pub eligible: &'a [PersonId],
    /// All persons of the current scope not placed yet.
    pub unassigned: &'a BTreeSet<PersonId>,
    /// The subgroup built so far, in placement order.
    pub members: &'a [PersonId],
    /// Person placed by the previous pick, possibly in an earlier subgroup.
    pub last: Option<PersonId>,
    /// Index of the set being filled within its scope (a main group, or
    /// the whole population).
    pub index: usize,
    pub level: Level,
}

impl Pick<'_> {
    pub fn opens_subgroup(&self) -> bool {
        self.members.is_empty()
    }
}

pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// Whether results should be shown with wish decorations.
    fn wishlist_mode(&self) -> bool {
        true
    }

    /// Chooses one of `pick.eligible`.
    fn next_person(&mut self, group: &Group, pick: &Pick<'_>) -> PersonId;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn wishlist_mode(&self) -> bool {
        (**self).wishlist_mode()
    }

    fn next_person(&mut self, group: &Group, pick: &Pick<'_>) -> PersonId {
        (**self).next_person(group, pick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Random,
    Wishes,
    Wishlist,
}

/// A strategy selection as made by a caller, turned into a strategy
/// instance by [`StrategyChoice::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrategyChoice {
    pub kind: StrategyKind,
    /// Starting person for the wishlist-following strategy.
    pub start: Option<PersonId>,
    /// Seed for the random source; entropy when absent.
    pub seed: Option<u64>,
}

impl StrategyChoice {
    pub fn new(kind: StrategyKind) -> Self {
        StrategyChoice {
            kind,
            ..Self::default()
        }
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        match self.kind {
            StrategyKind::Random => Box::new(RandomPick::with_rng(rng)),
            StrategyKind::Wishes => Box::new(WishMaximizing::with_rng(rng)),
            StrategyKind::Wishlist => {
                let strategy = WishlistFollowing::with_rng(rng);
                match self.start {
                    Some(start) => Box::new(strategy.starting_with(start)),
                    None => Box::new(strategy),
                }
            }
        }
    }
}

/// Wishes of `id` that point at someone still unplaced.
pub(crate) fn remaining_wishes(group: &Group, id: PersonId, unassigned: &BTreeSet<PersonId>) -> usize {
    group
        .wishes(id)
        .iter()
        .filter(|w| unassigned.contains(w))
        .count()
}

/// First candidate with the fewest remaining wishes.
pub(crate) fn scarcest(
    group: &Group,
    candidates: &[PersonId],
    unassigned: &BTreeSet<PersonId>,
) -> Option<PersonId> {
    candidates
        .iter()
        .copied()
        .min_by_key(|&id| remaining_wishes(group, id, unassigned))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scarcest_prefers_fewest_open_wishes() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        group.add_wish(a, b).unwrap();
        group.add_wish(a, c).unwrap();
        group.add_wish(b, c).unwrap();

        let unassigned: BTreeSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(scarcest(&group, &[a, b, c], &unassigned), Some(c));
        assert_eq!(scarcest(&group, &[a, b], &unassigned), Some(b));

        let without_c: BTreeSet<_> = [a, b].into_iter().collect();
        assert_eq!(scarcest(&group, &[a, b], &without_c), Some(b));
        assert_eq!(remaining_wishes(&group, a, &without_c), 1);
    }

    #[test]
    fn test_choice_builds_named_strategies() {
        let random = StrategyChoice::new(StrategyKind::Random).build();
        assert_eq!(random.name(), "random");
        assert!(!random.wishlist_mode());

        let wishes = StrategyChoice::new(StrategyKind::Wishes).build();
        assert_eq!(wishes.name(), "wishes");
        assert!(wishes.wishlist_mode());

        let wishlist = StrategyChoice::new(StrategyKind::Wishlist).build();
        assert_eq!(wishlist.name(), "wishlist");
    }
}
