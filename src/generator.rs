use crate::control::{CancelToken, GenerationState};
use crate::driver;
use crate::error::Result;
use crate::group::Group;
use crate::partition::Partition;
use crate::progress::ProgressSink;
use crate::settings::GenerationSettings;
use crate::strategy::{Strategy, StrategyChoice};

/// A strategy instance together with its cancellation token.
///
/// One generator runs one generation at a time. Its token can be cloned
/// and handed to other threads to interrupt the run.
pub struct Generator {
    strategy: Box<dyn Strategy>,
    cancel: CancelToken,
    proposals: usize,
}

impl Generator {
    pub fn new(strategy: impl Strategy + 'static) -> Self {
        Generator {
            strategy: Box::new(strategy),
            cancel: CancelToken::new(),
            proposals: 1,
        }
    }

    pub fn from_choice(choice: &StrategyChoice) -> Self {
        Generator {
            strategy: choice.build(),
            cancel: CancelToken::new(),
            proposals: 1,
        }
    }

    /// Number of runs whose distinct results are returned together, at
    /// most [`driver::MAX_PROPOSALS`].
    pub fn with_proposals(mut self, proposals: usize) -> Self {
        self.proposals = proposals.clamp(1, driver::MAX_PROPOSALS);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn interrupt(&self) {
        self.cancel.interrupt();
    }

    pub fn has_started(&self) -> bool {
        self.cancel.has_started()
    }

    pub fn state(&self) -> GenerationState {
        self.cancel.state()
    }

    /// Runs the strategy on the calling thread. An interrupted run returns
    /// an empty list.
    pub fn generate(
        &mut self,
        group: &Group,
        settings: &GenerationSettings,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Partition>> {
        driver::run_proposals(
            group,
            settings,
            self.strategy.as_mut(),
            sink,
            &self.cancel,
            self.proposals,
        )
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("strategy", &self.strategy.name())
            .field("proposals", &self.proposals)
            .field("state", &self.cancel.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::strategy::{RandomPick, StrategyKind};

    #[test]
    fn test_generator_runs_and_completes() {
        let mut group = Group::new();
        for i in 0..6 {
            group.register(format!("S{:03}", i));
        }
        let mut generator = Generator::new(RandomPick::seeded(5));
        assert!(!generator.has_started());

        let result = generator
            .generate(&group, &GenerationSettings::about(6, 3).unwrap(), &NoProgress)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_exact_partition_of(&group));
        assert_eq!(generator.state(), GenerationState::Completed);
    }

    #[test]
    fn test_random_proposals_are_distinct() {
        let mut group = Group::new();
        for i in 0..8 {
            group.register(format!("S{:03}", i));
        }
        let choice = StrategyChoice {
            kind: StrategyKind::Random,
            start: None,
            seed: Some(17),
        };
        let mut generator = Generator::from_choice(&choice).with_proposals(5);
        let result = generator
            .generate(&group, &GenerationSettings::about(8, 2).unwrap(), &NoProgress)
            .unwrap();

        assert!(!result.is_empty() && result.len() <= 5);
        for (i, first) in result.iter().enumerate() {
            for second in &result[i + 1..] {
                assert_ne!(first.canonical(), second.canonical());
            }
        }
    }
}
