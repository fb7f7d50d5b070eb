//! Dynamic load balancing.
//!
//! All workers draw from one shared queue, one file at a time, so a worker
//! that lands on cheap files simply claims more of them.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, trace};

use super::aggregator::MatchCounter;
use super::searcher::FileSearcher;
use super::{worker_pool, SearchStrategy};
use crate::config::Strategy;
use crate::errors::SearchResult;
use crate::results::Tally;
use crate::walker::WorkQueue;

/// The file work of a dynamic run, shared by reference across workers.
///
/// Taking the head and removing it happen under one lock acquisition, so
/// each file is claimed by exactly one worker. This lock is separate from
/// the result counter's.
#[derive(Debug)]
pub struct SharedFileQueue {
    queue: Mutex<WorkQueue<PathBuf>>,
}

impl SharedFileQueue {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            queue: Mutex::new(WorkQueue::from(files)),
        }
    }

    /// Takes ownership of the next file, or `None` once the queue is drained.
    pub fn claim(&self) -> Option<PathBuf> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Runs a fixed pool of workers that pull files until none are left.
#[derive(Debug, Clone, Copy)]
pub struct DynamicScheduler {
    thread_count: NonZeroUsize,
}

impl DynamicScheduler {
    pub fn new(thread_count: NonZeroUsize) -> Self {
        Self { thread_count }
    }
}

impl SearchStrategy for DynamicScheduler {
    fn kind(&self) -> Strategy {
        Strategy::Dynamic
    }

    fn thread_count(&self) -> usize {
        self.thread_count.get()
    }

    fn run(&self, searcher: &FileSearcher, files: Vec<PathBuf>) -> SearchResult<Tally> {
        debug!(
            "Sharing {} files between {} workers",
            files.len(),
            self.thread_count
        );

        let pool = worker_pool(self.thread_count, "treegrep-dynamic")?;
        let queue = SharedFileQueue::new(files);
        let counter = MatchCounter::new();

        pool.broadcast(|ctx| {
            let mut local = Tally::new();
            // The queue guard is dropped before the file is opened.
            while let Some(path) = queue.claim() {
                local.record_file(searcher.search_file(&path));
            }

            trace!(
                "Dynamic worker {} searched {} files, {} matches",
                ctx.index(),
                local.files_searched,
                local.matches
            );
            counter.add(local);
        });

        Ok(counter.into_inner())
    }
}
