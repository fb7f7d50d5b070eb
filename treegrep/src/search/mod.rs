/// Search phase: one file searcher and three ways of driving it.
///
/// Every run has the same two phases. First the [`TreeWalker`] expands the
/// root into a complete list of regular files on the calling thread. Only then
/// is the list handed to a [`SearchStrategy`]:
///
/// 1. **Sequential**: the calling thread searches each file in discovery order.
///    Its total is the reference for the other two.
/// 2. **Static**: the list is partitioned up front into one contiguous segment
///    per worker; workers never coordinate after dispatch.
/// 3. **Dynamic**: workers claim files one at a time from a single locked queue,
///    which evens out files of very different cost.
///
/// The parallel strategies run on a fixed [`rayon::ThreadPool`] of exactly
/// `thread_count` threads, built before any work starts and joined before the
/// total is read. Each worker adds its local tally to a shared
/// [`MatchCounter`] once. Because addition is commutative the total does not
/// depend on the strategy, the thread count or the order files were searched.
///
/// # Example
///
/// ```rust,no_run
/// use std::num::NonZeroUsize;
/// use treegrep::{search, SearchConfig, Strategy};
///
/// let config = SearchConfig::new("TODO", "src", NonZeroUsize::new(4).unwrap());
/// let output = search::run(&config, Strategy::Dynamic)?;
/// println!("{} matches in {} files", output.total_matches, output.files_with_matches);
/// # Ok::<(), treegrep::SearchError>(())
/// ```
pub mod aggregator;
pub mod dynamic_scheduler;
pub mod searcher;
pub mod sequential;
pub mod static_scheduler;

pub use aggregator::MatchCounter;
pub use dynamic_scheduler::{DynamicScheduler, SharedFileQueue};
pub use searcher::FileSearcher;
pub use sequential::SequentialEngine;
pub use static_scheduler::{partition, StaticScheduler, WorkSegment};

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{SearchConfig, Strategy};
use crate::errors::SearchResult;
use crate::results::{Comparison, SearchOutput, Tally};
use crate::walker::TreeWalker;

/// A way of searching an already discovered list of files.
pub trait SearchStrategy {
    /// Which strategy this is
    fn kind(&self) -> Strategy;

    /// Threads the strategy searches with
    fn thread_count(&self) -> usize;

    /// Searches every file in `files` and returns the combined tally.
    ///
    /// Fails only when worker threads cannot be started.
    fn run(&self, searcher: &FileSearcher, files: Vec<PathBuf>) -> SearchResult<Tally>;
}

/// Returns the implementation of `strategy` sized for `thread_count` workers.
pub fn strategy_for(strategy: Strategy, thread_count: NonZeroUsize) -> Box<dyn SearchStrategy> {
    match strategy {
        Strategy::Sequential => Box::new(SequentialEngine::new()),
        Strategy::Static => Box::new(StaticScheduler::new(thread_count)),
        Strategy::Dynamic => Box::new(DynamicScheduler::new(thread_count)),
    }
}

/// Builds the fixed pool a parallel strategy runs its workers on.
pub(crate) fn worker_pool(threads: NonZeroUsize, name: &'static str) -> SearchResult<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .thread_name(move |i| format!("{}-{}", name, i))
        .build()?;
    Ok(pool)
}

/// Walks `config.root_path` and searches it with `strategy`.
///
/// The elapsed time covers both the walk and the search.
pub fn run(config: &SearchConfig, strategy: Strategy) -> SearchResult<SearchOutput> {
    config.validate()?;

    info!(
        "Starting {} search for '{}' in {}",
        strategy,
        config.search_string,
        config.root_path.display()
    );
    let start = Instant::now();

    let walk = TreeWalker::new(&config.root_path).walk();
    let searcher = FileSearcher::from_config(config);
    let engine = strategy_for(strategy, config.thread_count);
    let tally = engine.run(&searcher, walk.files)?;

    let output = SearchOutput::new(
        engine.kind(),
        engine.thread_count(),
        tally,
        walk.stats,
        start.elapsed(),
    );

    info!(
        "{} search complete: {} matches in {} of {} files",
        strategy, output.total_matches, output.files_with_matches, output.files_searched
    );

    Ok(output)
}

/// Runs the sequential baseline, then the configured parallel strategy.
///
/// A configured `sequential` strategy is compared against itself.
pub fn compare(config: &SearchConfig) -> SearchResult<Comparison> {
    let baseline = run(config, Strategy::Sequential)?;
    let parallel = run(config, config.strategy)?;

    let comparison = Comparison { baseline, parallel };
    if !comparison.totals_agree() {
        warn!(
            "Sequential search found {} matches but {} search found {}",
            comparison.baseline.total_matches,
            comparison.parallel.strategy,
            comparison.parallel.total_matches
        );
    }

    Ok(comparison)
}
