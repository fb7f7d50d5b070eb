use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::errors::{SearchError, SearchResult};

/// Longest line chunk the searcher reads at once, newline included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// How the search phase is executed once the tree has been walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One thread, files in discovery order.
    Sequential,
    /// Files split up front into one contiguous segment per worker.
    #[default]
    Static,
    /// Workers claim files one at a time from a shared queue.
    Dynamic,
}

impl Strategy {
    /// Parses the load-balancing argument of the command line.
    ///
    /// Only the two parallel strategies are selectable there; the sequential
    /// baseline always runs first.
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg.to_ascii_lowercase().as_str() {
            "static" => Some(Self::Static),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }

    pub fn is_parallel(self) -> bool {
        !matches!(self, Self::Sequential)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        };
        f.write_str(name)
    }
}

/// Configuration for a search run.
///
/// # Configuration Locations
///
/// Values are layered from, lowest precedence first:
/// 1. Global `$HOME/.config/treegrep/config.yaml`
/// 2. Local `.treegrep.yaml` in the current directory
/// 3. A file passed with `--config`
///
/// Command-line arguments are applied last through [`SearchConfig::merge_with_cli`].
///
/// ```yaml
/// # Literal substring to count
/// search_string: "TODO"
///
/// # Where the walk starts
/// root_path: "."
///
/// # Worker threads for the parallel strategies (default: CPU cores)
/// thread_count: 4
///
/// # static or dynamic
/// strategy: "dynamic"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
///
/// # Longest line chunk read at once
/// max_line_length: 1024
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Literal substring to look for inside each token
    #[serde(default)]
    pub search_string: String,

    /// Root of the tree to walk
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Size of the worker pool for the parallel strategies
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Parallel strategy compared against the sequential baseline
    #[serde(default)]
    pub strategy: Strategy,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Longest line chunk, in bytes, handed to the tokenizer
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_string: String::new(),
            root_path: default_root_path(),
            thread_count: default_thread_count(),
            strategy: Strategy::default(),
            log_level: default_log_level(),
            max_line_length: default_max_line_length(),
        }
    }
}

impl SearchConfig {
    /// Builds a config for one search with every other field defaulted.
    pub fn new(
        search_string: impl Into<String>,
        root_path: impl Into<PathBuf>,
        thread_count: NonZeroUsize,
    ) -> Self {
        Self {
            search_string: search_string.into(),
            root_path: root_path.into(),
            thread_count,
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations plus an explicit file.
    ///
    /// The global and local files are optional; an explicit file must exist.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("treegrep/config.yaml")),
            Some(PathBuf::from(".treegrep.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no search can run with.
    pub fn validate(&self) -> SearchResult<()> {
        // One byte is reserved for the terminator the line reader stops short of.
        if self.max_line_length < 2 {
            return Err(SearchError::config_error(format!(
                "max_line_length must be at least 2, got {}",
                self.max_line_length
            )));
        }
        self.level()?;
        Ok(())
    }

    /// Parses `log_level` into the most verbose level to emit.
    pub fn level(&self) -> SearchResult<Level> {
        self.log_level.parse::<Level>().map_err(|_| {
            SearchError::config_error(format!(
                "log_level must be one of trace, debug, info, warn or error, got '{}'",
                self.log_level
            ))
        })
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        self.search_string = cli.search_string;
        self.root_path = cli.root_path;
        self.thread_count = cli.thread_count;
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(max) = cli.max_line_length {
            self.max_line_length = max;
        }
        self
    }
}

/// Values taken from the command line; `None` keeps the file value.
#[derive(Debug, Clone)]
pub struct CliOverrides {
    pub search_string: String,
    pub root_path: PathBuf,
    pub thread_count: NonZeroUsize,
    pub strategy: Option<Strategy>,
    pub log_level: Option<String>,
    pub max_line_length: Option<usize>,
}
