//! The shared "pick next person, fill subgroup, repeat" loop.

use crate::constraint;
use crate::control::{CancelToken, GenerationState};
use crate::error::{GroupingError, Result};
use crate::group::{Group, PersonId};
use crate::partition::{group_index_to_letter, Partition, Subgroup};
use crate::progress::{ProgressBudget, ProgressSink};
use crate::score::WishReport;
use crate::settings::GenerationSettings;
use crate::strategy::{Level, Pick, Strategy};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::ops::Range;

/// Upper bound on the proposals of one call.
pub const MAX_PROPOSALS: usize = 100;

/// Splits `group` according to `settings`, asking `strategy` for every
/// placement. Returns one partition, or an empty list when `cancel` was
/// interrupted.
pub fn run_partition(
    group: &Group,
    settings: &GenerationSettings,
    strategy: &mut dyn Strategy,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<Vec<Partition>> {
    run_proposals(group, settings, strategy, sink, cancel, 1)
}

/// Runs the loop up to `proposals` times with the same strategy and returns
/// the distinct partitions, most satisfied wishes first.
///
/// Settings are validated before anything runs. An unsatisfiable attempt
/// aborts the whole call; retrying is up to the caller.
pub fn run_proposals(
    group: &Group,
    settings: &GenerationSettings,
    strategy: &mut dyn Strategy,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
    proposals: usize,
) -> Result<Vec<Partition>> {
    let layout = match settings.validate(group.len()).and_then(|_| settings.layout()) {
        Ok(layout) => layout,
        Err(e) => {
            tracing::error!("Rejected generation settings: {}", e);
            cancel.finish(GenerationState::Failed);
            return Err(e);
        }
    };
    let proposals = proposals.clamp(1, MAX_PROPOSALS);
    let mut budget =
        ProgressBudget::new(placements(settings, group.len()).saturating_mul(proposals));

    cancel.begin();
    tracing::info!(
        "Starting {} generation: {} persons into {} subgroups ({} proposal(s))",
        strategy.name(),
        group.len(),
        settings.subgroup_sizes().len(),
        proposals
    );

    let mut results: Vec<Partition> = Vec::new();
    for attempt in 0..proposals {
        let mut run = Run {
            group,
            strategy: &mut *strategy,
            sink,
            cancel,
            budget: &mut budget,
            last: None,
        };
        match run.partition(settings, &layout) {
            Ok(Some(partition)) => {
                if results.iter().any(|r| r.canonical() == partition.canonical()) {
                    tracing::debug!("Proposal {} duplicates an earlier one", attempt + 1);
                } else {
                    results.push(partition);
                }
            }
            Ok(None) => {
                tracing::info!("Generation cancelled during proposal {}", attempt + 1);
                cancel.finish(GenerationState::Cancelled);
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                cancel.finish(GenerationState::Failed);
                return Err(e);
            }
        }
    }

    results.sort_by_cached_key(|p| Reverse(WishReport::evaluate(group, p).satisfied));
    cancel.finish(GenerationState::Completed);
    tracing::info!("Generation finished with {} proposal(s)", results.len());
    Ok(results)
}

/// Placements one proposal performs; main groups are filled first and
/// count as a full pass of their own.
fn placements(settings: &GenerationSettings, population: usize) -> usize {
    if settings.use_main_groups() {
        population * 2
    } else {
        population
    }
}

struct Run<'a> {
    group: &'a Group,
    strategy: &'a mut dyn Strategy,
    sink: &'a dyn ProgressSink,
    cancel: &'a CancelToken,
    budget: &'a mut ProgressBudget,
    last: Option<PersonId>,
}

impl Run<'_> {
    fn partition(
        &mut self,
        settings: &GenerationSettings,
        layout: &[Range<usize>],
    ) -> Result<Option<Partition>> {
        if self.cancel.is_interrupted() {
            return Ok(None);
        }
        let wishlist_mode = self.strategy.wishlist_mode();
        let sizes = settings.subgroup_sizes();
        let mut everyone: BTreeSet<PersonId> = self.group.ids().collect();
        let mut subgroups = Vec::with_capacity(sizes.len());

        match settings.main_group_sizes() {
            None => {
                let labels: Vec<String> = (0..sizes.len()).map(group_index_to_letter).collect();
                let strict = vec![true; sizes.len()];
                let sets = match self.fill(&mut everyone, sizes, Level::Subgroup, &labels, &strict)? {
                    Some(sets) => sets,
                    None => return Ok(None),
                };
                for (members, label) in sets.into_iter().zip(labels) {
                    subgroups.push(Subgroup::new(Some(label), members, None, wishlist_mode));
                }
            }
            Some(main_sizes) => {
                let main_labels: Vec<String> =
                    (0..main_sizes.len()).map(group_index_to_letter).collect();
                // A main group holding a single subgroup is that subgroup, so
                // its deny pairs must already be kept apart here.
                let strict: Vec<bool> = layout.iter().map(|range| range.len() == 1).collect();
                let mains = match self.fill(
                    &mut everyone,
                    main_sizes,
                    Level::MainGroup,
                    &main_labels,
                    &strict,
                )? {
                    Some(mains) => mains,
                    None => return Ok(None),
                };
                for (m, (members, range)) in mains.into_iter().zip(layout).enumerate() {
                    let mut pool: BTreeSet<PersonId> = members.into_iter().collect();
                    let labels: Vec<String> = (1..=range.len())
                        .map(|j| format!("{}{}", main_labels[m], j))
                        .collect();
                    let strict = vec![true; range.len()];
                    let sets =
                        match self.fill(&mut pool, &sizes[range.clone()], Level::Subgroup, &labels, &strict)? {
                            Some(sets) => sets,
                            None => return Ok(None),
                        };
                    for (members, label) in sets.into_iter().zip(labels) {
                        subgroups.push(Subgroup::new(Some(label), members, Some(m), wishlist_mode));
                    }
                }
            }
        }

        Ok(Some(Partition::new(subgroups)))
    }

    /// Fills one set per entry of `sizes` from `pool`. `None` means the run
    /// was interrupted.
    fn fill(
        &mut self,
        pool: &mut BTreeSet<PersonId>,
        sizes: &[usize],
        level: Level,
        labels: &[String],
        strict: &[bool],
    ) -> Result<Option<Vec<Vec<PersonId>>>> {
        let mut sets = Vec::with_capacity(sizes.len());
        for (index, (&target, label)) in sizes.iter().zip(labels).enumerate() {
            let check_deny = strict.get(index).copied().unwrap_or(true);
            let mut members: Vec<PersonId> = Vec::with_capacity(target);
            while members.len() < target {
                if self.cancel.is_interrupted() {
                    return Ok(None);
                }

                // Main groups split further may hold both sides of a deny
                // pair; the subgroup pass separates them.
                let eligible = if check_deny {
                    constraint::eligible(self.group, pool, &members)
                } else {
                    pool.iter().copied().collect()
                };
                if eligible.is_empty() {
                    return Err(GroupingError::Unsatisfiable {
                        subgroup: label.clone(),
                        placed: members.len(),
                        target,
                    });
                }

                let pick = Pick {
                    eligible: &eligible,
                    unassigned: pool,
                    members: &members,
                    last: self.last,
                    index,
                    level,
                };
                let chosen = self.strategy.next_person(self.group, &pick);
                if eligible.binary_search(&chosen).is_err() {
                    return Err(GroupingError::invalid_argument(format!(
                        "strategy '{}' picked {} who may not join {}",
                        self.strategy.name(),
                        chosen,
                        label
                    )));
                }

                pool.remove(&chosen);
                members.push(chosen);
                self.last = Some(chosen);
                tracing::trace!("Placed {} in {}", self.group.name_of(chosen), label);
                self.sink.advance(self.budget.next_delta());
            }
            tracing::debug!("Filled {} with {} members", label, members.len());
            sets.push(members);
        }
        Ok(Some(sets))
    }
}
