use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, trace, warn};

use crate::config::SearchConfig;
use crate::errors::SearchError;

/// Bytes that separate tokens within a line.
pub const DELIMITERS: [u8; 4] = [b' ', b',', b'.', b'-'];

const BUFFER_CAPACITY: usize = 8192;

/// Counts the tokens of a file that contain a literal search string.
///
/// A file is read in line chunks of at most `max_line_length - 1` bytes, each
/// chunk is split on [`DELIMITERS`], and every non-empty token containing the
/// search string counts once. Matching is bytewise. The searcher holds no
/// shared state, so one instance is used by all workers at once.
#[derive(Debug, Clone)]
pub struct FileSearcher {
    search_string: String,
    max_line_length: usize,
}

impl FileSearcher {
    pub fn new(search_string: impl Into<String>, max_line_length: usize) -> Self {
        Self {
            search_string: search_string.into(),
            max_line_length: max_line_length.max(2),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.search_string.clone(), config.max_line_length)
    }

    /// Returns the number of matching tokens in the file at `path`.
    ///
    /// A file that cannot be opened counts zero. A read error part way
    /// through keeps the matches found before it.
    pub fn search_file(&self, path: &Path) -> usize {
        trace!("Searching file: {}", path.display());
        match File::open(path) {
            Ok(file) => self.search_reader(BufReader::with_capacity(BUFFER_CAPACITY, file), path),
            Err(e) => {
                warn!(
                    "Unable to open file {}: {}",
                    path.display(),
                    SearchError::from_io(path, e)
                );
                0
            }
        }
    }

    /// Scans already-open content; `path` is only used for log lines.
    pub fn search_reader<R: BufRead>(&self, mut reader: R, path: &Path) -> usize {
        let limit = (self.max_line_length - 1) as u64;
        let mut line = Vec::with_capacity(self.max_line_length);
        let mut matches = 0;

        loop {
            line.clear();
            match reader.by_ref().take(limit).read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    for _ in self.matching_tokens(&line) {
                        info!(
                            "Found string {} within file {}",
                            self.search_string,
                            path.display()
                        );
                        matches += 1;
                    }
                }
                Err(e) => {
                    warn!("Error reading file {}: {}", path.display(), e);
                    break;
                }
            }
        }

        matches
    }

    /// Counts the matching tokens of a single line.
    #[cfg(test)]
    pub fn count_line_matches(&self, line: &[u8]) -> usize {
        self.matching_tokens(line).count()
    }

    fn matching_tokens<'a>(&'a self, line: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        let needle = self.search_string.as_bytes();
        line.split(|b| DELIMITERS.contains(b))
            .filter(|token| !token.is_empty())
            .filter(move |token| contains(token, needle))
    }
}

/// Substring test; the empty needle is contained in everything.
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
