use crate::group::{Group, PersonId};
use std::collections::BTreeSet;

/// Whether `candidate` may join a subgroup that already holds `members`.
/// A deny edge in either direction between the candidate and any member
/// rules the candidate out.
pub fn may_join(group: &Group, candidate: PersonId, members: &[PersonId]) -> bool {
    members
        .iter()
        .all(|&member| !group.denies(candidate, member) && !group.denies(member, candidate))
}

/// Members of `pool` that may join `members`, in ascending id order.
pub fn eligible(group: &Group, pool: &BTreeSet<PersonId>, members: &[PersonId]) -> Vec<PersonId> {
    pool.iter()
        .copied()
        .filter(|&candidate| may_join(group, candidate, members))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_candidate_cannot_join() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        group.add_deny(b, a).unwrap();

        assert!(!may_join(&group, a, &[b]));
        assert!(!may_join(&group, b, &[c, a]));
        assert!(may_join(&group, c, &[a, b]));
        assert!(may_join(&group, a, &[]));
    }

    #[test]
    fn test_eligible_filters_pool_in_id_order() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        let d = group.register("D");
        group.add_deny(a, c).unwrap();

        let pool: BTreeSet<_> = [d, c, b].into_iter().collect();
        assert_eq!(eligible(&group, &pool, &[a]), vec![b, d]);
    }
}
