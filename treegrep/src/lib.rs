pub mod config;
pub mod errors;
pub mod results;
pub mod search;
pub mod walker;

pub use config::{SearchConfig, Strategy};
pub use errors::{SearchError, SearchResult};
pub use results::{Comparison, SearchOutput, Tally};
pub use search::{FileSearcher, SearchStrategy};
pub use walker::{FileClassification, TreeWalker, WalkOutput, WalkStats, WorkQueue};
