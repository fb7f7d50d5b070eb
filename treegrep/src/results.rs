/// Result types shared by the three search strategies.
///
/// A [`Tally`] is what a worker accumulates locally and what the shared
/// counter accumulates across workers. Tallies combine by plain addition, so
/// the order in which workers report never changes the total.
use std::ops::{Add, AddAssign};
use std::time::Duration;

use crate::config::Strategy;
use crate::walker::WalkStats;

/// Match and file counts for some set of searched files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Tokens that contained the search string
    pub matches: usize,
    /// Files handed to the searcher, readable or not
    pub files_searched: usize,
    /// Files with at least one match
    pub files_with_matches: usize,
}

impl Tally {
    /// Creates an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one searched file that produced `matches` hits
    pub fn record_file(&mut self, matches: usize) {
        self.files_searched += 1;
        if matches > 0 {
            self.matches += matches;
            self.files_with_matches += 1;
        }
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(mut self, other: Tally) -> Tally {
        self += other;
        self
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        self.matches += other.matches;
        self.files_searched += other.files_searched;
        self.files_with_matches += other.files_with_matches;
    }
}

/// Outcome of one complete strategy run: walk, search and timing.
#[derive(Debug, Clone)]
pub struct SearchOutput {
    /// Strategy that produced the counts
    pub strategy: Strategy,
    /// Worker threads used; 1 for the sequential baseline
    pub thread_count: usize,
    /// Total number of matching tokens
    pub total_matches: usize,
    /// Total number of files searched
    pub files_searched: usize,
    /// Total number of files with matches
    pub files_with_matches: usize,
    /// What the tree walk found
    pub walk: WalkStats,
    /// Wall-clock time for walk plus search
    pub elapsed: Duration,
}

impl SearchOutput {
    pub fn new(
        strategy: Strategy,
        thread_count: usize,
        tally: Tally,
        walk: WalkStats,
        elapsed: Duration,
    ) -> Self {
        Self {
            strategy,
            thread_count,
            total_matches: tally.matches,
            files_searched: tally.files_searched,
            files_with_matches: tally.files_with_matches,
            walk,
            elapsed,
        }
    }

    #[cfg(test)]
    fn tally(&self) -> Tally {
        Tally {
            matches: self.total_matches,
            files_searched: self.files_searched,
            files_with_matches: self.files_with_matches,
        }
    }
}

/// The sequential baseline next to one parallel run over the same tree.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub baseline: SearchOutput,
    pub parallel: SearchOutput,
}

impl Comparison {
    /// Whether both runs counted the same number of matches
    pub fn totals_agree(&self) -> bool {
        self.baseline.total_matches == self.parallel.total_matches
    }
}
