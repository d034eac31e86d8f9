use crate::group::{Group, PersonId};
use std::collections::BTreeSet;

/// Convert a group index (0-based) to a letter label: A..Z, then AA, AB, ...
pub fn group_index_to_letter(index: usize) -> String {
    const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(ALPHABET[n % 26]);
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgroup {
    label: Option<String>,
    members: Vec<PersonId>,
    main_group: Option<usize>,
    wishlist_mode: bool,
}

impl Subgroup {
    pub(crate) fn new(
        label: Option<String>,
        members: Vec<PersonId>,
        main_group: Option<usize>,
        wishlist_mode: bool,
    ) -> Self {
        Subgroup {
            label,
            members,
            main_group,
            wishlist_mode,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Members in placement order.
    pub fn members(&self) -> &[PersonId] {
        &self.members
    }

    /// Index of the main group this subgroup was carved from.
    pub fn main_group(&self) -> Option<usize> {
        self.main_group
    }

    /// Whether the UI should decorate members with their satisfied wishes.
    pub fn wishlist_mode(&self) -> bool {
        self.wishlist_mode
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.members.contains(&id)
    }
}

/// One proposed split of the population into subgroups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    subgroups: Vec<Subgroup>,
}

impl Partition {
    pub(crate) fn new(subgroups: Vec<Subgroup>) -> Self {
        Partition { subgroups }
    }

    pub fn subgroups(&self) -> &[Subgroup] {
        &self.subgroups
    }

    pub fn len(&self) -> usize {
        self.subgroups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subgroups.is_empty()
    }

    pub fn subgroup_of(&self, id: PersonId) -> Option<&Subgroup> {
        self.subgroups.iter().find(|s| s.contains(id))
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.subgroups.iter().map(Subgroup::len).collect()
    }

    /// Every person of `group` appears in exactly one subgroup.
    pub fn is_exact_partition_of(&self, group: &Group) -> bool {
        let mut seen = BTreeSet::new();
        for id in self.subgroups.iter().flat_map(|s| s.members.iter()) {
            if !seen.insert(*id) {
                return false;
            }
        }
        seen.len() == group.len() && group.ids().all(|id| seen.contains(&id))
    }

    /// Membership sets without order, for comparing two proposals.
    pub(crate) fn canonical(&self) -> Vec<BTreeSet<PersonId>> {
        let mut sets: Vec<BTreeSet<PersonId>> = self
            .subgroups
            .iter()
            .map(|s| s.members.iter().copied().collect())
            .collect();
        sets.sort();
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_index_to_letter() {
        assert_eq!(group_index_to_letter(0), "A");
        assert_eq!(group_index_to_letter(25), "Z");
        assert_eq!(group_index_to_letter(26), "AA");
        assert_eq!(group_index_to_letter(27), "AB");
        assert_eq!(group_index_to_letter(52), "BA");
        assert_eq!(group_index_to_letter(701), "ZZ");
        assert_eq!(group_index_to_letter(702), "AAA");
    }

    #[test]
    fn test_exact_partition_detects_duplicates_and_omissions() {
        let mut group = Group::new();
        let a = group.register("S001");
        let b = group.register("S002");
        let c = group.register("S003");

        let good = Partition::new(vec![
            Subgroup::new(None, vec![a, b], None, false),
            Subgroup::new(None, vec![c], None, false),
        ]);
        assert!(good.is_exact_partition_of(&group));
        assert_eq!(good.subgroup_of(c).map(Subgroup::len), Some(1));

        let duplicate = Partition::new(vec![
            Subgroup::new(None, vec![a, b], None, false),
            Subgroup::new(None, vec![b, c], None, false),
        ]);
        assert!(!duplicate.is_exact_partition_of(&group));

        let missing = Partition::new(vec![Subgroup::new(None, vec![a, b], None, false)]);
        assert!(!missing.is_exact_partition_of(&group));
    }

    #[test]
    fn test_canonical_ignores_order() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        let d = group.register("D");

        let first = Partition::new(vec![
            Subgroup::new(Some("A".into()), vec![a, b], None, true),
            Subgroup::new(Some("B".into()), vec![c, d], None, true),
        ]);
        let second = Partition::new(vec![
            Subgroup::new(Some("A".into()), vec![d, c], None, true),
            Subgroup::new(Some("B".into()), vec![b, a], None, true),
        ]);
        assert_eq!(first.canonical(), second.canonical());
    }
}
