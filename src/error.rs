use crate::group::PersonId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("Unknown person id: {0}")]
    UnknownPerson(PersonId),

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("No legal placement left for subgroup {subgroup} ({placed} of {target} placed)")]
    Unsatisfiable {
        subgroup: String,
        placed: usize,
        target: usize,
    },

    #[error("Generation worker panicked")]
    WorkerPanicked,

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GroupingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GroupingError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        GroupingError::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        GroupingError::Config {
            message: message.into(),
        }
    }

    /// True when the denylist left no legal placement. Callers may retry
    /// with a different strategy or relaxed constraints.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, GroupingError::Unsatisfiable { .. })
    }
}

pub type Result<T> = std::result::Result<T, GroupingError>;
