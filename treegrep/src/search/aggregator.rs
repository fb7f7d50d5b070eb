use std::sync::{Mutex, PoisonError};

use crate::results::Tally;

/// Process-wide result of a parallel run.
///
/// Workers count into a local [`Tally`] and add it here once, after their
/// last file, so the lock is taken once per worker rather than once per file.
/// The value is read only after every worker has been joined.
#[derive(Debug, Default)]
pub struct MatchCounter {
    total: Mutex<Tally>,
}

impl MatchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one worker's tally to the shared total
    pub fn add(&self, tally: Tally) {
        // A panicking worker aborts the run at the join, so a poisoned
        // lock still holds a consistent sum of the workers that finished.
        let mut total = self.total.lock().unwrap_or_else(PoisonError::into_inner);
        *total += tally;
    }

    /// Consumes the counter after all workers have finished
    pub fn into_inner(self) -> Tally {
        self.total
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
