use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

/// Progress of one full generation call, in parts per million.
pub const PARTS_TOTAL: u32 = 1_000_000;

/// Receives progress deltas from the worker thread. The deltas of one
/// generation call add up to exactly [`PARTS_TOTAL`].
pub trait ProgressSink: Send + Sync {
    fn advance(&self, parts: u32);
}

impl<F> ProgressSink for F
where
    F: Fn(u32) + Send + Sync,
{
    fn advance(&self, parts: u32) {
        self(parts)
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _parts: u32) {}
}

/// Running total clamped to `0..=PARTS_TOTAL`. Several generations may
/// report into the same counter.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    parts: Mutex<u32>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parts(&self) -> u32 {
        *self.parts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn percent(&self) -> f64 {
        f64::from(self.parts()) * 100.0 / f64::from(PARTS_TOTAL)
    }

    pub fn reset(&self) {
        *self.parts.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }
}

impl ProgressSink for ProgressCounter {
    fn advance(&self, parts: u32) {
        let mut total = self.parts.lock().unwrap_or_else(PoisonError::into_inner);
        *total = total.saturating_add(parts).min(PARTS_TOTAL);
    }
}

/// Forwards deltas over a channel so the receiving side can redraw on its
/// own schedule. Deltas are dropped once the receiver is gone.
#[derive(Debug)]
pub struct ChannelProgress {
    tx: Mutex<Sender<u32>>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<u32>) -> Self {
        ChannelProgress { tx: Mutex::new(tx) }
    }
}

impl ProgressSink for ChannelProgress {
    fn advance(&self, parts: u32) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = tx.send(parts);
    }
}

/// Splits [`PARTS_TOTAL`] over a known number of steps so that the deltas
/// sum to exactly the total whatever the step count.
#[derive(Debug, Clone)]
pub(crate) struct ProgressBudget {
    steps: u64,
    done: u64,
}

impl ProgressBudget {
    pub(crate) fn new(steps: usize) -> Self {
        ProgressBudget {
            steps: steps as u64,
            done: 0,
        }
    }

    fn emitted(&self, done: u64) -> u64 {
        if self.steps == 0 {
            return 0;
        }
        done * u64::from(PARTS_TOTAL) / self.steps
    }

    pub(crate) fn next_delta(&mut self) -> u32 {
        if self.done >= self.steps {
            return 0;
        }
        let before = self.emitted(self.done);
        self.done += 1;
        let delta = self.emitted(self.done) - before;
        u32::try_from(delta).unwrap_or(PARTS_TOTAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_budget_sums_to_total() {
        for steps in [1usize, 3, 7, 1000, 1_234_567] {
            let mut budget = ProgressBudget::new(steps);
            let sum: u64 = (0..steps).map(|_| u64::from(budget.next_delta())).sum();
            assert_eq!(sum, u64::from(PARTS_TOTAL), "steps = {}", steps);
            assert_eq!(budget.next_delta(), 0);
        }
    }

    #[test]
    fn test_counter_clamps() {
        let counter = ProgressCounter::new();
        counter.advance(PARTS_TOTAL - 10);
        counter.advance(500);
        assert_eq!(counter.parts(), PARTS_TOTAL);
        counter.reset();
        assert_eq!(counter.parts(), 0);
    }

    #[test]
    fn test_counter_survives_concurrent_deltas() {
        let counter = Arc::new(ProgressCounter::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.advance(10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.parts(), 40_000);
    }

    #[test]
    fn test_channel_forwards_deltas() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink = ChannelProgress::new(tx);
        sink.advance(3);
        sink.advance(4);
        drop(sink);
        assert_eq!(rx.iter().sum::<u32>(), 7);
    }
}
