use crate::error::{GroupingError, Result};
use std::ops::Range;

/// Target sizes for one generation request.
///
/// In hierarchical mode the subgroup sizes are consumed in order to fill
/// each main group: the first main group holds the first run of subgroups
/// whose sizes add up to its own size, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationSettings {
    subgroup_sizes: Vec<usize>,
    main_group_sizes: Option<Vec<usize>>,
}

impl GenerationSettings {
    pub fn new(subgroup_sizes: Vec<usize>) -> Self {
        GenerationSettings {
            subgroup_sizes,
            main_group_sizes: None,
        }
    }

    pub fn hierarchical(main_group_sizes: Vec<usize>, subgroup_sizes: Vec<usize>) -> Self {
        GenerationSettings {
            subgroup_sizes,
            main_group_sizes: Some(main_group_sizes),
        }
    }

    /// `count` subgroups whose sizes differ by at most one.
    pub fn balanced(total: usize, count: usize) -> Result<Self> {
        Ok(Self::new(balanced_sizes(total, count)?))
    }

    /// As few subgroups as possible with at most `preferred` members each,
    /// balanced so that 4 people become 2+2 rather than 3+1.
    pub fn about(total: usize, preferred: usize) -> Result<Self> {
        Ok(Self::new(sizes_about(total, preferred)?))
    }

    /// Like [`GenerationSettings::about`], applied inside each main group.
    pub fn about_within(main_group_sizes: Vec<usize>, preferred: usize) -> Result<Self> {
        let mut sizes = Vec::new();
        for &main in &main_group_sizes {
            sizes.extend(sizes_about(main, preferred)?);
        }
        Ok(Self::hierarchical(main_group_sizes, sizes))
    }

    pub fn use_main_groups(&self) -> bool {
        self.main_group_sizes.is_some()
    }

    pub fn subgroup_sizes(&self) -> &[usize] {
        &self.subgroup_sizes
    }

    pub fn main_group_sizes(&self) -> Option<&[usize]> {
        self.main_group_sizes.as_deref()
    }

    pub fn total(&self) -> usize {
        self.subgroup_sizes.iter().sum()
    }

    /// Checks the settings against a population of `population` persons.
    pub fn validate(&self, population: usize) -> Result<()> {
        if let Some(pos) = self.subgroup_sizes.iter().position(|&s| s == 0) {
            return Err(GroupingError::invalid_configuration(format!(
                "subgroup {} has size 0",
                pos + 1
            )));
        }
        let total = self.total();
        if total != population {
            return Err(GroupingError::invalid_configuration(format!(
                "subgroup sizes add up to {} but there are {} persons",
                total, population
            )));
        }
        if let Some(main) = &self.main_group_sizes {
            if main.contains(&0) {
                return Err(GroupingError::invalid_configuration(
                    "main group sizes must be positive",
                ));
            }
            let main_total: usize = main.iter().sum();
            if main_total != population {
                return Err(GroupingError::invalid_configuration(format!(
                    "main group sizes add up to {} but there are {} persons",
                    main_total, population
                )));
            }
        }
        self.layout().map(|_| ())
    }

    /// Range of subgroup indices belonging to each main group. Without main
    /// groups the whole list forms a single range.
    pub fn layout(&self) -> Result<Vec<Range<usize>>> {
        let main = match &self.main_group_sizes {
            Some(main) => main,
            None => return Ok(vec![0..self.subgroup_sizes.len()]),
        };

        let mut ranges = Vec::with_capacity(main.len());
        let mut idx = 0;
        for (m, &main_size) in main.iter().enumerate() {
            let start = idx;
            let mut filled = 0;
            while filled < main_size && idx < self.subgroup_sizes.len() {
                filled += self.subgroup_sizes[idx];
                idx += 1;
            }
            if filled != main_size {
                return Err(GroupingError::invalid_configuration(format!(
                    "subgroups do not line up with main group {} (size {})",
                    m + 1,
                    main_size
                )));
            }
            ranges.push(start..idx);
        }
        if idx != self.subgroup_sizes.len() {
            return Err(GroupingError::invalid_configuration(
                "more subgroups than the main groups can hold",
            ));
        }
        Ok(ranges)
    }
}

fn balanced_sizes(total: usize, count: usize) -> Result<Vec<usize>> {
    if count == 0 {
        if total == 0 {
            return Ok(Vec::new());
        }
        return Err(GroupingError::invalid_configuration(
            "cannot split persons into zero subgroups",
        ));
    }
    if count > total {
        return Err(GroupingError::invalid_configuration(format!(
            "{} subgroups requested for {} persons",
            count, total
        )));
    }
    let base = total / count;
    let extra = total % count;
    Ok((0..count).map(|i| base + usize::from(i < extra)).collect())
}

fn sizes_about(total: usize, preferred: usize) -> Result<Vec<usize>> {
    if preferred == 0 {
        return Err(GroupingError::invalid_configuration(
            "preferred subgroup size must be positive",
        ));
    }
    balanced_sizes(total, total.div_ceil(preferred))
}
