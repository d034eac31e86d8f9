use crate::control::{CancelToken, GenerationState};
use crate::error::{GroupingError, Result};
use crate::generator::Generator;
use crate::group::Group;
use crate::partition::Partition;
use crate::progress::ProgressSink;
use crate::settings::GenerationSettings;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A generation running on its own thread.
#[derive(Debug)]
pub struct GenerationHandle {
    cancel: CancelToken,
    thread: JoinHandle<Result<Vec<Partition>>>,
}

impl GenerationHandle {
    /// Asks the worker to stop; it returns an empty result at its next
    /// placement.
    pub fn interrupt(&self) {
        self.cancel.interrupt();
    }

    pub fn has_started(&self) -> bool {
        self.cancel.has_started()
    }

    pub fn wait_started(&self, timeout: Duration) -> bool {
        self.cancel.wait_started(timeout)
    }

    pub fn state(&self) -> GenerationState {
        self.cancel.state()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn join(self) -> Result<Vec<Partition>> {
        self.thread.join().map_err(|_| GroupingError::WorkerPanicked)?
    }
}

/// Runs `generator` on a dedicated worker thread. The group is shared
/// read-only with the worker for the whole run.
pub fn spawn_generation(
    group: Arc<Group>,
    settings: GenerationSettings,
    mut generator: Generator,
    sink: Arc<dyn ProgressSink>,
) -> Result<GenerationHandle> {
    let cancel = generator.cancel_token();
    let thread = thread::Builder::new()
        .name(format!("grouping-{}", generator.strategy_name()))
        .spawn(move || generator.generate(&group, &settings, sink.as_ref()))?;
    Ok(GenerationHandle { cancel, thread })
}
