//! Static load balancing.
//!
//! The file list is cut once, before any worker starts, into one contiguous
//! segment per worker. After dispatch the workers share nothing except the
//! final counter.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::path::PathBuf;
use tracing::{debug, trace};

use super::aggregator::MatchCounter;
use super::searcher::FileSearcher;
use super::{worker_pool, SearchStrategy};
use crate::config::Strategy;
use crate::errors::SearchResult;
use crate::results::Tally;

/// A worker's share of the file list, as indices into it.
pub type WorkSegment = Range<usize>;

/// Splits `len` items into `workers` contiguous segments, in order.
///
/// Every segment holds `len / workers` items; the first `len % workers`
/// segments hold one more, so no item is left out and no segment is larger
/// than `ceil(len / workers)`. Segments may be empty when there are more
/// workers than items.
pub fn partition(len: usize, workers: NonZeroUsize) -> Vec<WorkSegment> {
    let workers = workers.get();
    let base = len / workers;
    let remainder = len % workers;

    let mut start = 0;
    (0..workers)
        .map(|i| {
            let size = base + usize::from(i < remainder);
            let segment = start..start + size;
            start += size;
            segment
        })
        .collect()
}

/// Runs one worker per segment on a fixed pool.
#[derive(Debug, Clone, Copy)]
pub struct StaticScheduler {
    thread_count: NonZeroUsize,
}

impl StaticScheduler {
    pub fn new(thread_count: NonZeroUsize) -> Self {
        Self { thread_count }
    }
}

impl SearchStrategy for StaticScheduler {
    fn kind(&self) -> Strategy {
        Strategy::Static
    }

    fn thread_count(&self) -> usize {
        self.thread_count.get()
    }

    fn run(&self, searcher: &FileSearcher, files: Vec<PathBuf>) -> SearchResult<Tally> {
        let segments = partition(files.len(), self.thread_count);
        debug!(
            "Split {} files into {} segments of {}..={} files",
            files.len(),
            segments.len(),
            segments.last().map_or(0, |s| s.len()),
            segments.first().map_or(0, |s| s.len())
        );

        let pool = worker_pool(self.thread_count, "treegrep-static")?;
        let counter = MatchCounter::new();

        // broadcast runs the body once on every pool thread and returns after
        // all of them have finished, so thread i owns segment i exclusively.
        pool.broadcast(|ctx| {
            let Some(segment) = segments.get(ctx.index()) else {
                return;
            };

            let mut local = Tally::new();
            for path in &files[segment.clone()] {
                local.record_file(searcher.search_file(path));
            }

            trace!(
                "Static worker {} searched {} files, {} matches",
                ctx.index(),
                local.files_searched,
                local.matches
            );
            counter.add(local);
        });

        Ok(counter.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_partition_covers_every_item() {
        for len in 0..40 {
            for workers in 1..10 {
                let segments = partition(len, nz(workers));
                assert_eq!(segments.len(), workers);
                assert_eq!(segments.iter().map(|s| s.len()).sum::<usize>(), len);

                let ceil = len.div_ceil(workers);
                assert!(segments.iter().all(|s| s.len() <= ceil));

                // contiguous and in order
                let mut next = 0;
                for segment in &segments {
                    assert_eq!(segment.start, next);
                    next = segment.end;
                }
                assert_eq!(next, len);
            }
        }
    }

    #[test]
    fn test_remainder_goes_to_leading_workers() {
        let sizes: Vec<_> = partition(10, nz(4)).iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_more_workers_than_files() {
        let sizes: Vec<_> = partition(2, nz(5)).iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_remainder_files_are_searched() {
        let dir = tempdir().unwrap();
        let files: Vec<_> = (0..7)
            .map(|i| {
                let path = dir.path().join(format!("f{}.txt", i));
                fs::write(&path, "mark\n").unwrap();
                path
            })
            .collect();

        let searcher = FileSearcher::new("mark", 1024);
        let tally = StaticScheduler::new(nz(4)).run(&searcher, files).unwrap();

        assert_eq!(tally.matches, 7);
        assert_eq!(tally.files_searched, 7);
    }

    #[test]
    fn test_empty_file_list() {
        let searcher = FileSearcher::new("mark", 1024);
        let tally = StaticScheduler::new(nz(3)).run(&searcher, Vec::new()).unwrap();
        assert_eq!(tally, Tally::new());
    }
}
