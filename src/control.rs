use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Lifecycle of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl GenerationState {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            GenerationState::Completed | GenerationState::Cancelled | GenerationState::Failed
        )
    }
}

#[derive(Debug)]
struct Shared {
    interrupted: AtomicBool,
    state: Mutex<GenerationState>,
    changed: Condvar,
}

/// Cooperative cancellation flag plus the "has started" signal of a run.
///
/// Clones share the same flag, so one clone can be handed to another thread
/// (a Ctrl+C handler, a UI button) while the worker polls the other. An
/// interrupt issued before a run starts is honored on its first iteration.
/// An interrupt issued after a run finished leaves that run's result alone
/// and is carried over to the next run of the same token.
#[derive(Debug, Clone)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

impl Default for CancelToken {
    fn default() -> Self {
        CancelToken {
            shared: Arc::new(Shared {
                interrupted: AtomicBool::new(false),
                state: Mutex::new(GenerationState::NotStarted),
                changed: Condvar::new(),
            }),
        }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GenerationState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn interrupt(&self) {
        let mut state = self.lock();
        if state.is_finished() {
            *state = GenerationState::NotStarted;
        }
        self.shared.interrupted.store(true, Ordering::SeqCst);
        self.shared.changed.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        self.shared.interrupted.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> GenerationState {
        *self.lock()
    }

    pub fn has_started(&self) -> bool {
        self.state() != GenerationState::NotStarted
    }

    /// Blocks until the run has started or `timeout` elapses. Returns
    /// whether the run started.
    pub fn wait_started(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while *state == GenerationState::NotStarted {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .shared
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Moves to `Running`. A pending interrupt stays set.
    pub(crate) fn begin(&self) {
        let mut state = self.lock();
        *state = GenerationState::Running;
        self.shared.changed.notify_all();
    }

    /// Records the outcome and rearms the token; the interrupt belonged to
    /// the run that just ended.
    pub(crate) fn finish(&self, outcome: GenerationState) {
        let mut state = self.lock();
        *state = outcome;
        self.shared.interrupted.store(false, Ordering::SeqCst);
        self.shared.changed.notify_all();
    }
}
