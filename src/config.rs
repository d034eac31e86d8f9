use crate::driver::MAX_PROPOSALS;
use crate::error::{GroupingError, Result};
use crate::group::{Group, PersonId};
use crate::settings::GenerationSettings;
use crate::strategy::{StrategyChoice, StrategyKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Subgroup size used when neither sizes nor a preferred size are given.
pub const DEFAULT_SUBGROUP_SIZE: usize = 3;

/// A population file:
///
/// ```toml
/// [generation]
/// strategy = "wishlist"
/// subgroup_size = 3
///
/// [[person]]
/// name = "S001"
/// wishes = ["S002"]
/// deny = ["S003"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default, rename = "person")]
    pub persons: Vec<PersonConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    pub subgroup_sizes: Option<Vec<usize>>,
    pub subgroup_size: Option<usize>,
    pub main_group_sizes: Option<Vec<usize>>,
    pub start: Option<String>,
    pub seed: Option<u64>,
    pub proposals: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonConfig {
    pub name: String,
    #[serde(default)]
    pub wishes: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

/// Everything needed to start a generation.
#[derive(Debug, Clone)]
pub struct Population {
    pub group: Group,
    pub settings: GenerationSettings,
    pub choice: StrategyChoice,
    pub proposals: usize,
}

impl PopulationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GroupingError::config(format!("TOML parsing error: {}", e)))
    }

    /// Persons without wishes or denials, e.g. names typed on stdin.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PopulationConfig {
            generation: GenerationConfig::default(),
            persons: names
                .into_iter()
                .map(|name| PersonConfig {
                    name: name.into(),
                    ..PersonConfig::default()
                })
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for person in &self.persons {
            if person.name.trim().is_empty() {
                return Err(GroupingError::config("person names cannot be empty"));
            }
            if !names.insert(person.name.as_str()) {
                return Err(GroupingError::config(format!(
                    "person '{}' is listed twice",
                    person.name
                )));
            }
        }

        for person in &self.persons {
            for other in person.wishes.iter().chain(&person.deny) {
                if !names.contains(other.as_str()) {
                    return Err(GroupingError::config(format!(
                        "'{}' refers to unknown person '{}'",
                        person.name, other
                    )));
                }
            }
        }

        let generation = &self.generation;
        if generation.subgroup_sizes.is_some() && generation.subgroup_size.is_some() {
            return Err(GroupingError::config(
                "set either generation.subgroup_sizes or generation.subgroup_size, not both",
            ));
        }
        match generation.proposals {
            Some(0) => {
                return Err(GroupingError::config("generation.proposals must be at least 1"));
            }
            Some(n) if n > MAX_PROPOSALS => {
                return Err(GroupingError::config(format!(
                    "generation.proposals must be at most {}, got {}",
                    MAX_PROPOSALS, n
                )));
            }
            _ => {}
        }
        if let Some(start) = &generation.start {
            if !names.contains(start.as_str()) {
                return Err(GroupingError::config(format!(
                    "starting person '{}' is not listed",
                    start
                )));
            }
        }
        Ok(())
    }

    /// Target sizes for `total` persons.
    pub fn settings_for(&self, total: usize) -> Result<GenerationSettings> {
        let generation = &self.generation;
        let preferred = generation.subgroup_size.unwrap_or(DEFAULT_SUBGROUP_SIZE);
        match (&generation.subgroup_sizes, &generation.main_group_sizes) {
            (Some(sizes), Some(main)) => Ok(GenerationSettings::hierarchical(main.clone(), sizes.clone())),
            (Some(sizes), None) => Ok(GenerationSettings::new(sizes.clone())),
            (None, Some(main)) => GenerationSettings::about_within(main.clone(), preferred),
            (None, None) => GenerationSettings::about(total, preferred),
        }
    }

    /// Registers every person, wires up wishes and denials by name, and
    /// checks the resulting settings against the population.
    pub fn build(&self) -> Result<Population> {
        self.validate()?;

        let mut group = Group::new();
        for person in &self.persons {
            group.register(person.name.clone());
        }
        for person in &self.persons {
            let id = self.resolve(&group, &person.name)?;
            for wish in &person.wishes {
                group.add_wish(id, self.resolve(&group, wish)?)?;
            }
            for denied in &person.deny {
                group.add_deny(id, self.resolve(&group, denied)?)?;
            }
        }

        let settings = self.settings_for(group.len())?;
        settings.validate(group.len())?;

        let start = match &self.generation.start {
            Some(name) => Some(self.resolve(&group, name)?),
            None => None,
        };
        let choice = StrategyChoice {
            kind: self.generation.strategy,
            start,
            seed: self.generation.seed,
        };

        tracing::debug!(
            "Loaded {} persons, {} wishes, {} deny pairs",
            group.len(),
            group.wish_edges().len(),
            group.deny_pairs().len()
        );

        Ok(Population {
            group,
            settings,
            choice,
            proposals: self.generation.proposals.unwrap_or(1),
        })
    }

    fn resolve(&self, group: &Group, name: &str) -> Result<PersonId> {
        group
            .find_by_name(name)
            .ok_or_else(|| GroupingError::config(format!("unknown person '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CLASS: &str = r#"
[generation]
strategy = "wishlist"
subgroup_size = 2
start = "S003"
seed = 7

[[person]]
name = "S001"
wishes = ["S002"]

[[person]]
name = "S002"
wishes = ["S001"]
deny = ["S003"]

[[person]]
name = "S003"

[[person]]
name = "S004"
"#;

    #[test]
    fn test_parse_and_build() {
        let config = PopulationConfig::from_toml_str(CLASS).unwrap();
        assert_eq!(config.persons.len(), 4);
        assert_eq!(config.generation.strategy, StrategyKind::Wishlist);

        let population = config.build().unwrap();
        let group = &population.group;
        let s001 = group.find_by_name("S001").unwrap();
        let s002 = group.find_by_name("S002").unwrap();
        let s003 = group.find_by_name("S003").unwrap();

        assert!(group.wishes_for(s001, s002));
        assert!(group.denies(s003, s002));
        assert_eq!(population.settings.subgroup_sizes(), &[2, 2]);
        assert_eq!(population.choice.start, Some(s003));
        assert_eq!(population.choice.seed, Some(7));
        assert_eq!(population.proposals, 1);
    }

    #[test]
    fn test_defaults_to_groups_of_three() {
        let config = PopulationConfig::from_names((1..=7).map(|i| format!("S{:03}", i)));
        let population = config.build().unwrap();
        assert_eq!(population.settings.subgroup_sizes(), &[3, 2, 2]);
        assert_eq!(population.choice.kind, StrategyKind::Random);
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let content = r#"
[[person]]
name = "S001"
wishes = ["S999"]
"#;
        let config = PopulationConfig::from_toml_str(content).unwrap();
        assert!(matches!(config.validate(), Err(GroupingError::Config { .. })));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let config = PopulationConfig::from_names(["S001", "S001"]);
        assert!(config.build().is_err());
    }

    #[test]
    fn test_mismatched_sizes_are_rejected() {
        let content = r#"
[generation]
subgroup_sizes = [2, 2]

[[person]]
name = "S001"

[[person]]
name = "S002"

[[person]]
name = "S003"
"#;
        let config = PopulationConfig::from_toml_str(content).unwrap();
        assert!(matches!(
            config.build(),
            Err(GroupingError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_main_groups_with_preferred_size() {
        let mut config = PopulationConfig::from_names((1..=10).map(|i| format!("S{:03}", i)));
        config.generation.main_group_sizes = Some(vec![6, 4]);
        let population = config.build().unwrap();
        assert!(population.settings.use_main_groups());
        assert_eq!(population.settings.subgroup_sizes(), &[3, 3, 2, 2]);
    }

    #[test]
    fn test_proposal_count_is_bounded() {
        let mut config = PopulationConfig::from_names(["S001", "S002"]);
        config.generation.proposals = Some(1000);
        assert!(matches!(config.validate(), Err(GroupingError::Config { .. })));

        config.generation.proposals = Some(MAX_PROPOSALS);
        assert_eq!(config.build().unwrap().proposals, MAX_PROPOSALS);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CLASS.as_bytes()).unwrap();

        let config = PopulationConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.persons[1].deny, vec!["S003".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            PopulationConfig::from_toml_str("[[person]\nname ="),
            Err(GroupingError::Config { .. })
        ));
    }
}
