//! Headless random play.
//!
//! Plays games without a view: each move touches a random tile and then one
//! of its neighbours, settles every motion the engine asks for, and checks
//! that the board is quiescent again. Used for soak testing the resolution
//! engine and for collecting cascade statistics as JSONL.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::board::{neighbours, Coord};
use crate::config::{GameConfig, DEFAULT_KINDS, DEFAULT_SIZE};
use crate::game::{Game, GameError, TouchOutcome, TurnStats};
use crate::protocol::layout::encode_layout;

/// Configuration for a batch of headless games.
#[derive(Debug, Clone)]
pub struct AutoplayConfig {
    /// Number of games to play.
    pub games: usize,
    /// Swaps attempted per game.
    pub moves: usize,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    pub rows: usize,
    pub cols: usize,
    pub kinds: u8,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        AutoplayConfig {
            games: 10,
            moves: 100,
            threads: 4,
            seed: 0,
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            kinds: DEFAULT_KINDS,
            quiet: false,
        }
    }
}

/// Outcome of one headless game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    /// Seed the game's tile factory was built with.
    pub seed: u64,
    pub rows: usize,
    pub cols: usize,
    pub kinds: u8,
    pub moves: usize,
    /// Motions completed on behalf of the view.
    pub motions: usize,
    pub stats: TurnStats,
    pub final_layout: String,
    /// First contract or invariant violation, which ends the game.
    pub error: Option<String>,
}

/// Aggregate figures over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub failed: usize,
    pub swaps: u64,
    pub reverts: u64,
    pub cascades: u64,
    pub cleared: u64,
    pub motions: u64,
}

impl Summary {
    /// Average cascade iterations per successful swap.
    pub fn cascades_per_swap(&self) -> f64 {
        self.cascades as f64 / self.swaps.max(1) as f64
    }
}

fn rng_for(seed: u64) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_entropy()
    }
}

/// Plays a single game, drawing moves and the game's own seed from `rng`.
pub fn play_game(config: &AutoplayConfig, game_id: usize, rng: &mut SmallRng) -> GameRecord {
    let game_config = GameConfig {
        rows: config.rows,
        cols: config.cols,
        kinds: config.kinds,
        seed: rng.gen_range(1..=u64::MAX),
    };
    let mut record = GameRecord {
        game_id,
        seed: game_config.seed,
        rows: config.rows,
        cols: config.cols,
        kinds: config.kinds,
        moves: 0,
        motions: 0,
        stats: TurnStats::default(),
        final_layout: String::new(),
        error: None,
    };

    let mut game = match Game::new(&game_config) {
        Ok(g) => g,
        Err(e) => {
            record.error = Some(e.to_string());
            return record;
        }
    };

    for _ in 0..config.moves {
        match play_move(&mut game, rng) {
            Ok(Some(motions)) => {
                record.moves += 1;
                record.motions += motions;
            }
            Ok(None) => break,
            Err(e) => {
                warn!(game_id, move_no = record.moves, "{}", e);
                record.error = Some(e.to_string());
                break;
            }
        }
    }

    record.stats = game.stats();
    record.final_layout = encode_layout(game.board());
    record
}

/// Makes one random adjacent swap and settles it. Returns `None` when the
/// board has no pair of neighbouring fields to swap.
fn play_move(game: &mut Game, rng: &mut SmallRng) -> Result<Option<usize>, GameError> {
    let board = game.board();
    let (rows, cols) = (board.rows(), board.cols());
    let from = Coord::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
    let Some(&to) = neighbours(from, rows, cols).choose(rng) else {
        return Ok(None);
    };

    game.touch_at(from)?;
    let outcome = game.touch_at(to)?;
    if !matches!(outcome, TouchOutcome::Swapping { .. }) {
        return Err(GameError::NotQuiescent(format!(
            "touching {} then {} did not start a swap",
            from, to
        )));
    }
    let motions = game.settle()?;
    game.check_quiescent()?;
    game.drain_effects();
    Ok(Some(motions))
}

/// Runs a batch of games, producing one record per game.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_autoplay(config: &AutoplayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.games);
    run_autoplay_with_callback(config, |game| {
        games.push(game);
    });
    games
}

/// Runs a batch of games, calling `on_game` with each finished record.
pub fn run_autoplay_with_callback<F>(config: &AutoplayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_parallel(config, on_game);
    } else {
        run_sequential(config, on_game);
    }
}

fn log_game(config: &AutoplayConfig, n: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    info!(
        game = n,
        of = config.games,
        swaps = game.stats.swaps,
        cascades = game.stats.cascades,
        failed = game.error.is_some(),
        secs = started.elapsed().as_secs_f64(),
        "game finished"
    );
}

fn run_sequential<F>(config: &AutoplayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    let mut rng = rng_for(config.seed);
    for i in 0..config.games {
        let started = Instant::now();
        let game = play_game(config, i, &mut rng);
        log_game(config, i + 1, &game, started);
        on_game(game);
    }
}

/// Plays games on a rayon pool; finished records reach the callback on the
/// calling thread through a channel.
fn run_parallel<F>(config: &AutoplayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            warn!("thread pool unavailable ({}), playing sequentially", e);
            return run_sequential(config, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.games).into_par_iter().for_each_with(tx, |tx, i| {
                    let seed = if config.seed != 0 {
                        config.seed.wrapping_add(i as u64)
                    } else {
                        0
                    };
                    let mut rng = rng_for(seed);
                    let started = Instant::now();
                    let game = play_game(config, i, &mut rng);
                    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    log_game(config, n, &game, started);
                    deliver(tx, game);
                });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
}

/// Hands a finished record to the collecting thread. Returns false, after
/// logging, when the receiver is gone and the record is lost.
fn deliver(tx: &std::sync::mpsc::Sender<GameRecord>, game: GameRecord) -> bool {
    match tx.send(game) {
        Ok(()) => true,
        Err(e) => {
            warn!(game_id = e.0.game_id, "record dropped, receiver gone");
            false
        }
    }
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Totals the statistics of a batch of games.
pub fn summarize(games: &[GameRecord]) -> Summary {
    games.iter().fold(Summary::default(), |mut s, g| {
        s.games += 1;
        s.failed += usize::from(g.error.is_some());
        s.swaps += u64::from(g.stats.swaps);
        s.reverts += u64::from(g.stats.reverts);
        s.cascades += u64::from(g.stats.cascades);
        s.cleared += u64::from(g.stats.cleared);
        s.motions += g.motions as u64;
        s
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(games: usize, threads: usize, seed: u64) -> AutoplayConfig {
        AutoplayConfig {
            games,
            moves: 20,
            threads,
            seed,
            rows: 6,
            cols: 6,
            kinds: 5,
            quiet: true,
        }
    }

    #[test]
    fn play_single_game_completes() {
        let config = small(1, 1, 42);
        let mut rng = SmallRng::seed_from_u64(42);
        let game = play_game(&config, 0, &mut rng);

        assert_eq!(game.error, None);
        assert_eq!(game.moves, 20);
        assert_eq!(game.stats.swaps + game.stats.reverts, 20);
        assert!(game.stats.cascades >= game.stats.swaps);
        // Every swap animates at least two motions, every revert four.
        assert!(game.motions >= 2 * game.stats.swaps as usize + 4 * game.stats.reverts as usize);
        assert_eq!(game.final_layout.split('/').count(), 6);
        assert!(!game.final_layout.contains('.'));
    }

    #[test]
    fn same_seed_same_game() {
        let config = small(1, 1, 5);
        let a = play_game(&config, 0, &mut SmallRng::seed_from_u64(5));
        let b = play_game(&config, 0, &mut SmallRng::seed_from_u64(5));
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.final_layout, b.final_layout);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn single_column_board_still_plays() {
        let config = AutoplayConfig {
            cols: 1,
            rows: 5,
            kinds: 3,
            ..small(1, 1, 9)
        };
        let game = play_game(&config, 0, &mut SmallRng::seed_from_u64(9));
        assert_eq!(game.error, None);
        assert_eq!(game.moves, 20);
    }

    #[test]
    fn one_field_board_has_no_moves() {
        let config = AutoplayConfig {
            cols: 1,
            rows: 1,
            ..small(1, 1, 3)
        };
        let game = play_game(&config, 0, &mut SmallRng::seed_from_u64(3));
        assert_eq!(game.error, None);
        assert_eq!(game.moves, 0);
    }

    #[test]
    fn invalid_config_is_recorded() {
        let config = AutoplayConfig {
            kinds: 2,
            ..small(1, 1, 3)
        };
        let game = play_game(&config, 0, &mut SmallRng::seed_from_u64(3));
        assert!(game.error.is_some());
        assert_eq!(game.moves, 0);
    }

    #[test]
    fn sequential_run_produces_correct_count() {
        let games = run_autoplay(&small(3, 1, 99));
        assert_eq!(games.len(), 3);
        assert!(games.iter().all(|g| g.error.is_none()));
    }

    #[test]
    fn parallel_run_produces_correct_count() {
        let games = run_autoplay(&small(4, 2, 77));
        assert_eq!(games.len(), 4);
        let mut ids: Vec<usize> = games.iter().map(|g| g.game_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn deliver_reports_a_closed_channel() {
        let mut rng = SmallRng::seed_from_u64(4);
        let config = small(1, 1, 4);
        let (tx, rx) = std::sync::mpsc::channel();
        assert!(deliver(&tx, play_game(&config, 0, &mut rng)));
        assert_eq!(rx.recv().unwrap().game_id, 0);
        drop(rx);
        assert!(!deliver(&tx, play_game(&config, 1, &mut rng)));
    }

    #[test]
    fn jsonl_output_is_valid() {
        let games = run_autoplay(&small(2, 1, 11));
        let mut buf = Vec::new();
        write_jsonl(&games, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["stats"]["swaps"].is_number());
            assert!(value["error"].is_null());
        }
    }

    #[test]
    fn summary_totals_records() {
        let games = run_autoplay(&small(3, 1, 21));
        let summary = summarize(&games);
        assert_eq!(summary.games, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.swaps + summary.reverts, 60);
        assert_eq!(
            summary.motions,
            games.iter().map(|g| g.motions as u64).sum::<u64>()
        );
    }
}
