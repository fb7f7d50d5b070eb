use std::path::PathBuf;
use tracing::debug;

use super::searcher::FileSearcher;
use super::SearchStrategy;
use crate::config::Strategy;
use crate::errors::SearchResult;
use crate::results::Tally;

/// Searches every file on the calling thread, in discovery order.
///
/// This is the reference result the parallel strategies are checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialEngine;

impl SequentialEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SearchStrategy for SequentialEngine {
    fn kind(&self) -> Strategy {
        Strategy::Sequential
    }

    fn thread_count(&self) -> usize {
        1
    }

    fn run(&self, searcher: &FileSearcher, files: Vec<PathBuf>) -> SearchResult<Tally> {
        debug!("Searching {} files sequentially", files.len());
        let mut tally = Tally::new();
        for path in &files {
            tally.record_file(searcher.search_file(path));
        }
        Ok(tally)
    }
}
