//! Splits a population into subgroups of given sizes while following
//! wishes and never placing denied pairs together.

pub mod config;
pub mod constraint;
pub mod control;
pub mod driver;
pub mod error;
pub mod generator;
pub mod group;
pub mod logger;
pub mod partition;
pub mod progress;
pub mod score;
pub mod settings;
pub mod strategy;
pub mod worker;

pub use config::{Population, PopulationConfig};
pub use control::{CancelToken, GenerationState};
pub use driver::{run_partition, run_proposals, MAX_PROPOSALS};
pub use error::{GroupingError, Result};
pub use generator::Generator;
pub use group::{Group, Person, PersonId};
pub use partition::{group_index_to_letter, Partition, Subgroup};
pub use progress::{ChannelProgress, NoProgress, ProgressCounter, ProgressSink, PARTS_TOTAL};
pub use score::WishReport;
pub use settings::GenerationSettings;
pub use strategy::{
    RandomPick, Strategy, StrategyChoice, StrategyKind, WishMaximizing, WishlistFollowing,
};
pub use worker::{spawn_generation, GenerationHandle};
