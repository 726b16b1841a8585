//! Matchboard: a match-3 board engine driven over a line protocol.
//!
//! Reads commands from stdin and writes replies to stdout. Diagnostics go to
//! stderr through `tracing`, filtered by `RUST_LOG`.

use std::io::{self, BufRead};

use tracing::error;
use tracing_subscriber::EnvFilter;

use matchboard::engine::Engine;
use matchboard::protocol::parser::{parse_command, Command};

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => {
                engine.set_option(&name, &value);
            }
            Command::NewGame => engine.new_game(),
            Command::Position { layout } => {
                if let Err(e) = engine.set_position(&layout) {
                    error!("{}", e);
                }
            }
            Command::Touch { row, col } => engine.handle_touch(row, col, &mut out)?,
            Command::Effects => engine.handle_effects(&mut out)?,
            Command::Complete { motion } => engine.handle_complete(motion),
            Command::Settle => engine.handle_settle(&mut out)?,
            Command::Board => engine.handle_board(&mut out)?,
            Command::State => engine.handle_state(&mut out)?,
            Command::Snapshot => engine.handle_snapshot(&mut out)?,
            Command::Quit => break,
        }
    }
    Ok(())
}
