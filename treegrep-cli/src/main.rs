use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use treegrep::{
    config::CliOverrides, search, SearchConfig, SearchError, SearchOutput, Strategy,
};

type Result<T> = std::result::Result<T, SearchError>;

/// Count a literal string across a file tree, sequentially and in parallel
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// String to search for
    search_string: Option<String>,

    /// Directory (or file) to start from
    root: Option<PathBuf>,

    /// Number of worker threads for the parallel search
    threads: Option<NonZeroUsize>,

    /// Load balancing for the parallel search (static|dynamic)
    strategy: Option<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Longest line chunk read at once, in bytes
    #[arg(long)]
    max_line_length: Option<usize>,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let (Some(search_string), Some(root), Some(threads)) =
        (cli.search_string, cli.root, cli.threads)
    else {
        // Nothing to search for: show how to call us and leave cleanly.
        println!("{}", Cli::command().render_usage());
        return Ok(());
    };

    let strategy_arg = cli.strategy;
    let strategy = strategy_arg.as_deref().and_then(Strategy::from_arg);

    let mut config = SearchConfig::load_from(cli.config.as_deref())?.merge_with_cli(CliOverrides {
        search_string,
        root_path: root,
        thread_count: threads,
        strategy,
        log_level: cli.log_level,
        max_line_length: cli.max_line_length,
    });
    config.validate()?;

    init_tracing(config.level()?);

    if let Some(arg) = strategy_arg.as_deref().filter(|_| strategy.is_none()) {
        // Printed outside the log filter so a quiet level still shows it.
        eprintln!(
            "{}",
            format!(
                "Unknown load balancing option '{}'. Defaulting to static load balancing.",
                arg
            )
            .yellow()
        );
        config.strategy = Strategy::Static;
    } else if !config.strategy.is_parallel() {
        config.strategy = Strategy::Static;
    }

    let comparison = search::compare(&config)?;
    print_output(&config, &comparison.baseline);

    println!(
        "\n{}",
        format!(
            "Performing multi-threaded search using {} load balancing.",
            comparison.parallel.strategy
        )
        .blue()
    );
    print_output(&config, &comparison.parallel);

    Ok(())
}

/// Installs a stderr subscriber filtered at `level`.
///
/// The filter comes from configuration only; `RUST_LOG` is not consulted.
fn init_tracing(level: Level) {
    let filter = EnvFilter::default().add_directive(LevelFilter::from_level(level).into());
    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(false)
        .try_init();
}

fn print_output(config: &SearchConfig, output: &SearchOutput) {
    println!(
        "\nThe string {} was found {} times within the file system.",
        config.search_string.green(),
        output.total_matches
    );
    println!(
        "Overall execution time = {:.6}s.",
        output.elapsed.as_secs_f64()
    );
}
