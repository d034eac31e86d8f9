use crate::group::{Group, PersonId};
use crate::partition::Partition;

/// How well a partition honors the wishes of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishReport {
    /// Wish edges whose both ends share a subgroup.
    pub satisfied: usize,
    pub total_wishes: usize,
    /// Pairs wishing for each other that were placed together.
    pub mutual_pairs: usize,
    /// Persons with a non-empty wishlist of which nothing was satisfied.
    pub unsatisfied_persons: Vec<PersonId>,
}

impl WishReport {
    pub fn evaluate(group: &Group, partition: &Partition) -> Self {
        let mut report = WishReport {
            total_wishes: group.wish_edges().len(),
            ..Self::default()
        };

        for subgroup in partition.subgroups() {
            for &(from, to) in group.wish_edges() {
                if subgroup.contains(from) && subgroup.contains(to) {
                    report.satisfied += 1;
                    if from < to && group.wishes_for(to, from) {
                        report.mutual_pairs += 1;
                    }
                }
            }
        }

        report.unsatisfied_persons = group
            .persons()
            .filter(|p| !p.wishlist().is_empty())
            .filter(|p| satisfied_wishes(group, partition, p.id()).is_empty())
            .map(|p| p.id())
            .collect();
        report
    }

    pub fn ratio(&self) -> f64 {
        if self.total_wishes == 0 {
            return 1.0;
        }
        self.satisfied as f64 / self.total_wishes as f64
    }
}

/// Wishes of `id` that ended up in the same subgroup, in wishlist order.
pub fn satisfied_wishes(group: &Group, partition: &Partition, id: PersonId) -> Vec<PersonId> {
    match partition.subgroup_of(id) {
        Some(subgroup) => group
            .wishes(id)
            .iter()
            .copied()
            .filter(|&w| subgroup.contains(w))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Subgroup;

    #[test]
    fn test_counts_satisfied_and_mutual_wishes() {
        let mut group = Group::new();
        let a = group.register("A");
        let b = group.register("B");
        let c = group.register("C");
        let d = group.register("D");
        group.add_wish(a, b).unwrap();
        group.add_wish(b, a).unwrap();
        group.add_wish(c, a).unwrap();
        group.add_wish(d, c).unwrap();

        let partition = Partition::new(vec![
            Subgroup::new(None, vec![a, b], None, true),
            Subgroup::new(None, vec![c, d], None, true),
        ]);
        let report = WishReport::evaluate(&group, &partition);

        assert_eq!(report.satisfied, 3);
        assert_eq!(report.total_wishes, 4);
        assert_eq!(report.mutual_pairs, 1);
        assert_eq!(report.unsatisfied_persons, vec![c]);
        assert_eq!(satisfied_wishes(&group, &partition, d), vec![c]);
        assert!((report.ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_wishes_is_fully_satisfied() {
        let group = Group::new();
        let report = WishReport::evaluate(&group, &Partition::default());
        assert_eq!(report.satisfied, 0);
        assert_eq!(report.ratio(), 1.0);
    }
}
