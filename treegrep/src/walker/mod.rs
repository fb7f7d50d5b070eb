//! Breadth-first discovery of the files to search.
//!
//! The walk is single-threaded and always finishes before any search begins.
//! It is iterative over an explicit [`WorkQueue`] frontier, so tree depth never
//! grows the call stack.

pub mod queue;

use std::fs::{self, FileType};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use crate::errors::SearchError;
pub use queue::WorkQueue;

/// What a directory entry is, judged without following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClassification {
    RegularFile,
    Directory,
    SymbolicLink,
    Other,
}

impl FileClassification {
    /// Classifies an `lstat`-style file type.
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::SymbolicLink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::RegularFile
        } else {
            Self::Other
        }
    }

    /// Reads the metadata of `path` without dereferencing a final symlink.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        fs::symlink_metadata(path).map(|meta| Self::from_file_type(meta.file_type()))
    }
}

/// Counters gathered while walking, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs_visited: usize,
    pub files_found: usize,
    pub symlinks_skipped: usize,
    pub others_skipped: usize,
    /// Entries dropped because their metadata or listing could not be read
    pub errors: usize,
}

/// Everything a walk produces: the file work and how it was found.
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Every regular file reachable from the root, in discovery order
    pub files: Vec<PathBuf>,
    pub stats: WalkStats,
}

/// Expands a directory tree into the list of regular files below it.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walks the tree breadth-first and collects its regular files.
    ///
    /// Symbolic links are never followed, and neither links nor special files
    /// end up in the output. A root that cannot be read yields an empty output
    /// rather than an error.
    pub fn walk(&self) -> WalkOutput {
        let mut frontier = WorkQueue::new();
        let mut files = WorkQueue::new();
        let mut stats = WalkStats::default();

        frontier.push(self.root.clone());

        while let Some(path) = frontier.pop() {
            let classification = match FileClassification::of(&path) {
                Ok(classification) => classification,
                Err(e) => {
                    warn!(
                        "Error obtaining stats for {}: {}",
                        path.display(),
                        SearchError::from_io(&path, e)
                    );
                    stats.errors += 1;
                    continue;
                }
            };

            match classification {
                FileClassification::Directory => {
                    info!("{} is a directory", path.display());
                    stats.dirs_visited += 1;
                    Self::expand(&path, &mut frontier, &mut stats);
                }
                FileClassification::RegularFile => {
                    info!("{} is a regular file", path.display());
                    stats.files_found += 1;
                    files.push(path);
                }
                FileClassification::SymbolicLink => {
                    debug!("Skipping symbolic link {}", path.display());
                    stats.symlinks_skipped += 1;
                }
                FileClassification::Other => {
                    info!("{} is of type other", path.display());
                    stats.others_skipped += 1;
                }
            }
        }

        debug!(
            "Walk of {} finished: {} directories, {} files",
            self.root.display(),
            stats.dirs_visited,
            stats.files_found
        );

        WalkOutput {
            files: files.into_vec(),
            stats,
        }
    }

    /// Pushes every child of `dir` onto the frontier in listing order.
    fn expand(dir: &Path, frontier: &mut WorkQueue<PathBuf>, stats: &mut WalkStats) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Unable to open directory {}: {}",
                    dir.display(),
                    SearchError::from_io(dir, e)
                );
                stats.errors += 1;
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // The listing is unusable past this point; keep what was read.
                    warn!("Unable to read directory {}: {}", dir.display(), e);
                    stats.errors += 1;
                    break;
                }
            };

            // read_dir never yields the pseudo-entries; the check pins the contract.
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }

            let child = dir.join(&name);
            trace!("Queueing {} ({} pending)", child.display(), frontier.len());
            frontier.push(child);
        }
    }
}
