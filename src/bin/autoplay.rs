//! Headless autoplay CLI.
//!
//! Plays random games against the resolution engine and writes one JSON
//! record per game.
//!
//! Usage:
//!   cargo run --release --bin autoplay -- [OPTIONS]
//!
//! Options:
//!   --games N     Number of games to play (default: 10)
//!   --moves N     Swaps per game (default: 100)
//!   --rows N      Board rows (default: 9)
//!   --cols N      Board columns (default: 9)
//!   --kinds N     Tile kinds, 3 to 8 (default: 6)
//!   --threads N   Number of parallel threads (default: 4)
//!   --seed N      Random seed, 0 for entropy (default: 0)
//!   --output FILE Output file path (default: stdout)
//!   --quiet       Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use matchboard::autoplay::{self, AutoplayConfig};

fn parse_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = AutoplayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => {
                i += 1;
                config.games = parse_value(&args, i, flag);
            }
            "--moves" => {
                i += 1;
                config.moves = parse_value(&args, i, flag);
            }
            "--rows" => {
                i += 1;
                config.rows = parse_value(&args, i, flag);
            }
            "--cols" => {
                i += 1;
                config.cols = parse_value(&args, i, flag);
            }
            "--kinds" => {
                i += 1;
                config.kinds = parse_value(&args, i, flag);
            }
            "--threads" => {
                i += 1;
                config.threads = parse_value(&args, i, flag);
            }
            "--seed" => {
                i += 1;
                config.seed = parse_value(&args, i, flag);
            }
            "--output" => {
                i += 1;
                output_path = Some(parse_value(&args, i, flag));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let default_level = if config.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if !config.quiet {
        eprintln!(
            "Autoplay: {} games, {} moves, {}x{} board, {} kinds, {} threads",
            config.games, config.moves, config.rows, config.cols, config.kinds, config.threads
        );
    }

    let start = Instant::now();
    let games = autoplay::run_autoplay(&config);
    let elapsed = start.elapsed().as_secs_f64();

    if !config.quiet {
        let summary = autoplay::summarize(&games);
        eprintln!("=== Autoplay Summary ===");
        eprintln!("Games: {} in {:.1}s", summary.games, elapsed);
        eprintln!("Failed: {}", summary.failed);
        eprintln!("Swaps: {} (reverted {})", summary.swaps, summary.reverts);
        eprintln!(
            "Cascades: {} ({:.2} per swap)",
            summary.cascades,
            summary.cascades_per_swap()
        );
        eprintln!("Tiles cleared: {}", summary.cleared);
        eprintln!("Motions: {}", summary.motions);
    }

    let written = match output_path {
        Some(path) => File::create(&path)
            .and_then(|file| autoplay::write_jsonl(&games, &mut BufWriter::new(file))),
        None => {
            let stdout = io::stdout();
            autoplay::write_jsonl(&games, &mut BufWriter::new(stdout.lock()))
        }
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }

    if games.iter().any(|g| g.error.is_some()) {
        process::exit(2);
    }
}

fn print_usage() {
    eprintln!("Usage: autoplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N      Number of games to play (default: 10)");
    eprintln!("  --moves N      Swaps per game (default: 100)");
    eprintln!("  --rows N       Board rows (default: 9)");
    eprintln!("  --cols N       Board columns (default: 9)");
    eprintln!("  --kinds N      Tile kinds, 3 to 8 (default: 6)");
    eprintln!("  --threads N    Number of parallel threads (default: 4)");
    eprintln!("  --seed N       Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE  Output file path (default: stdout)");
    eprintln!("  --quiet        Suppress progress and summary output");
    eprintln!("  --help         Show this help");
}
