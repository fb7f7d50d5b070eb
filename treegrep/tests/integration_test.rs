use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::tempdir;
use treegrep::search::{self, partition, FileSearcher, SearchStrategy, StaticScheduler};
use treegrep::{SearchConfig, Strategy, TreeWalker};

const ALL_STRATEGIES: [Strategy; 3] = [Strategy::Sequential, Strategy::Static, Strategy::Dynamic];

fn threads(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

/// Builds an uneven tree: a few directories of very different fan-out and
/// files of very different length.
fn create_test_tree(root: &Path) -> Result<usize> {
    let mut expected = 0;
    for d in 0..4 {
        let dir = root.join(format!("dir_{}", d)).join(format!("sub_{}", d));
        fs::create_dir_all(&dir)?;
        for f in 0..(d * 3 + 1) {
            let mut file = File::create(dir.join(format!("file_{}.txt", f)))?;
            for line in 0..(f * 20 + 1) {
                writeln!(file, "Line {} TODO: fix, later-TODO.{} nothing", line, f)?;
                expected += 2;
            }
        }
    }
    fs::write(root.join("top.txt"), "TODO")?;
    expected += 1;
    Ok(expected)
}

#[test]
fn test_strategies_agree() -> Result<()> {
    let dir = tempdir()?;
    let expected = create_test_tree(dir.path())?;

    for n in [1, 2, 3, 7, 16] {
        let config = SearchConfig::new("TODO", dir.path(), threads(n));
        for strategy in ALL_STRATEGIES {
            let output = search::run(&config, strategy)?;
            assert_eq!(
                output.total_matches, expected,
                "{} with {} threads",
                strategy, n
            );
        }
    }
    Ok(())
}

#[test]
fn test_dynamic_is_thread_count_independent() -> Result<()> {
    let dir = tempdir()?;
    create_test_tree(dir.path())?;

    let one = search::run(&SearchConfig::new("fix", dir.path(), threads(1)), Strategy::Dynamic)?;
    let eight = search::run(&SearchConfig::new("fix", dir.path(), threads(8)), Strategy::Dynamic)?;

    assert_eq!(one.total_matches, eight.total_matches);
    assert_eq!(one.files_searched, eight.files_searched);
    assert!(one.total_matches > 0);
    Ok(())
}

#[test]
fn test_nonexistent_root() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing");

    for strategy in ALL_STRATEGIES {
        let config = SearchConfig::new("anything", &missing, threads(4));
        let output = search::run(&config, strategy)?;
        assert_eq!(output.total_matches, 0);
        assert_eq!(output.files_searched, 0);
        assert_eq!(output.walk.errors, 1);
    }
    Ok(())
}

#[test]
fn test_static_segments_cover_discovered_files() -> Result<()> {
    let dir = tempdir()?;
    create_test_tree(dir.path())?;

    let files = TreeWalker::new(dir.path()).walk().files;
    for n in 1..=files.len() + 2 {
        let segments = partition(files.len(), threads(n));
        assert_eq!(segments.iter().map(|s| s.len()).sum::<usize>(), files.len());

        let searcher = FileSearcher::new("TODO", 1024);
        let tally = StaticScheduler::new(threads(n)).run(&searcher, files.clone())?;
        assert_eq!(tally.files_searched, files.len());
    }
    Ok(())
}

#[test]
fn test_each_file_counted_exactly_once() -> Result<()> {
    let dir = tempdir()?;
    let file_count = 37;
    for i in 0..file_count {
        let sub = dir.path().join(format!("d{}", i % 5));
        fs::create_dir_all(&sub)?;
        fs::write(sub.join(format!("f{}.txt", i)), format!("tag{}z common\n", i))?;
    }

    let config = SearchConfig::new("common", dir.path(), threads(6));
    let output = search::run(&config, Strategy::Dynamic)?;
    assert_eq!(output.total_matches, file_count);
    assert_eq!(output.files_with_matches, file_count);

    for i in [0, 13, 36] {
        let config = SearchConfig::new(format!("tag{}z", i), dir.path(), threads(6));
        assert_eq!(search::run(&config, Strategy::Dynamic)?.total_matches, 1);
        assert_eq!(search::run(&config, Strategy::Static)?.total_matches, 1);
    }
    Ok(())
}

#[test]
fn test_delimiter_semantics_through_engine() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("sample.txt"), "alpha,beta-gamma alpha\n")?;

    for strategy in ALL_STRATEGIES {
        let config = SearchConfig::new("alpha", dir.path(), threads(2));
        assert_eq!(search::run(&config, strategy)?.total_matches, 2);

        let config = SearchConfig::new("beta-gamma", dir.path(), threads(2));
        assert_eq!(search::run(&config, strategy)?.total_matches, 0);
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinked_tree_is_not_searched() -> Result<()> {
    use std::os::unix::fs::symlink;

    let dir = tempdir()?;
    let outside = tempdir()?;
    fs::write(outside.path().join("secret.txt"), "needle needle needle")?;
    fs::write(dir.path().join("visible.txt"), "needle")?;
    symlink(outside.path(), dir.path().join("linked"))?;

    for strategy in ALL_STRATEGIES {
        let config = SearchConfig::new("needle", dir.path(), threads(3));
        let output = search::run(&config, strategy)?;
        assert_eq!(output.total_matches, 1);
        assert_eq!(output.walk.symlinks_skipped, 1);
    }
    Ok(())
}

#[test]
fn test_compare_reports_both_runs() -> Result<()> {
    let dir = tempdir()?;
    let expected = create_test_tree(dir.path())?;

    let mut config = SearchConfig::new("TODO", dir.path(), threads(4));
    config.strategy = Strategy::Dynamic;

    let comparison = search::compare(&config)?;
    assert!(comparison.totals_agree());
    assert_eq!(comparison.baseline.strategy, Strategy::Sequential);
    assert_eq!(comparison.parallel.strategy, Strategy::Dynamic);
    assert_eq!(comparison.parallel.total_matches, expected);
    Ok(())
}
