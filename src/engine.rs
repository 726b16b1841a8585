//! Engine state management.
//!
//! Holds the game options and the current game between protocol commands,
//! and renders replies for the main loop. Commands that need a game before
//! one exists, and contract violations reported by the game, are logged and
//! produce no reply.

use std::io::{self, Write};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::board::Coord;
use crate::config::GameConfig;
use crate::game::{Effect, Game, MotionId, TouchOutcome, TurnState, TurnStats};
use crate::protocol::layout::{encode_layout, parse_position};

/// Serializable view of a game for the `snapshot` command.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub kinds: u8,
    pub layout: String,
    pub state: &'static str,
    pub selected: Option<Coord>,
    pub disabled: bool,
    pub pending_motions: usize,
    pub stats: TurnStats,
}

impl Snapshot {
    pub fn of(game: &Game) -> Self {
        let board = game.board();
        Snapshot {
            rows: board.rows(),
            cols: board.cols(),
            kinds: board.kinds(),
            layout: encode_layout(board),
            state: state_name(game.state()),
            selected: game.selected().and_then(|t| board.position_of(t).ok()),
            disabled: game.is_disabled(),
            pending_motions: game.pending_motions(),
            stats: game.stats(),
        }
    }
}

fn state_name(state: TurnState) -> &'static str {
    match state {
        TurnState::Idle => "idle",
        TurnState::Selected(_) => "selected",
        TurnState::Resolving => "resolving",
    }
}

/// Holds the mutable state of the engine between commands.
#[derive(Debug, Default)]
pub struct Engine {
    pub options: GameConfig,
    pub game: Option<Game>,
}

impl Engine {
    /// Creates an engine with default options and no game.
    pub fn new() -> Self {
        Engine::default()
    }

    /// Sets a game option. Takes effect at the next `newgame` or `position`.
    pub fn set_option(&mut self, name: &str, value: &str) {
        if let Err(e) = self.options.set(name, value) {
            warn!("setoption: {}", e);
        }
    }

    /// Builds a fresh game from the current options.
    pub fn new_game(&mut self) {
        match Game::new(&self.options) {
            Ok(game) => {
                info!(
                    rows = self.options.rows,
                    cols = self.options.cols,
                    kinds = self.options.kinds,
                    "new game"
                );
                self.game = Some(game);
            }
            Err(e) => {
                error!("newgame: {}", e);
                self.game = None;
            }
        }
    }

    /// Loads a board from layout notation. Kinds and seed come from the options.
    pub fn set_position(&mut self, layout: &str) -> Result<(), String> {
        let board = parse_position(layout, self.options.kinds, self.options.seed)
            .map_err(|e| format!("failed to parse layout: {}", e))?;
        let game = Game::with_board(board).map_err(|e| format!("failed to load layout: {}", e))?;
        self.game = Some(game);
        Ok(())
    }

    fn game_mut(&mut self, command: &str) -> Option<&mut Game> {
        if self.game.is_none() {
            error!("{}: no game", command);
        }
        self.game.as_mut()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `touch <row> <col>`: replies with what the touch did.
    pub fn handle_touch<W: Write>(&mut self, row: usize, col: usize, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game_mut("touch") else {
            return Ok(());
        };
        match game.touch_at(Coord::new(row, col)) {
            Ok(TouchOutcome::Ignored) => writeln!(out, "touch ignored")?,
            Ok(TouchOutcome::Selected(at)) => writeln!(out, "touch selected {} {}", at.row, at.col)?,
            Ok(TouchOutcome::Reselected { to, .. }) => {
                writeln!(out, "touch reselected {} {}", to.row, to.col)?
            }
            Ok(TouchOutcome::Swapping { from, to }) => writeln!(
                out,
                "touch swap {} {} {} {}",
                from.row, from.col, to.row, to.col
            )?,
            Err(e) => error!("touch {} {}: {}", row, col, e),
        }
        out.flush()
    }

    /// Handles `effects`: one line per effect emitted since the last listing.
    pub fn handle_effects<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game_mut("effects") else {
            return Ok(());
        };
        for effect in game.drain_effects() {
            match effect {
                Effect::Move(m) => writeln!(
                    out,
                    "move {} tile {} {} to {} {} duration {:.2} delay {:.2}",
                    m.id,
                    m.tile,
                    m.kind.name(),
                    m.to.row,
                    m.to.col,
                    m.duration,
                    m.delay
                )?,
                Effect::Remove(tile) => writeln!(out, "remove {}", tile)?,
                Effect::Select(at) => writeln!(out, "select {} {}", at.row, at.col)?,
                Effect::Unselect(at) => writeln!(out, "unselect {} {}", at.row, at.col)?,
            }
        }
        writeln!(out, "effectsok")?;
        out.flush()
    }

    /// Handles `complete <motion>`.
    pub fn handle_complete(&mut self, motion: u64) {
        if let Some(game) = self.game_mut("complete") {
            if let Err(e) = game.complete(MotionId(motion)) {
                error!("complete {}: {}", motion, e);
            }
        }
    }

    /// Handles `settle`: finishes every outstanding motion headlessly and
    /// discards the effects it produced.
    pub fn handle_settle<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game_mut("settle") else {
            return Ok(());
        };
        match game.settle() {
            Ok(n) => {
                game.drain_effects();
                writeln!(out, "settled {}", n)?;
            }
            Err(e) => error!("settle: {}", e),
        }
        out.flush()
    }

    /// Handles `board`.
    pub fn handle_board<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game_mut("board") else {
            return Ok(());
        };
        writeln!(out, "board {}", encode_layout(game.board()))?;
        out.flush()
    }

    /// Handles `state`.
    pub fn handle_state<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game_mut("state") else {
            return Ok(());
        };
        match game.selected().map(|t| game.board().position_of(t)) {
            Some(Ok(at)) => writeln!(out, "state selected {} {}", at.row, at.col)?,
            Some(Err(e)) => error!("state: {}", e),
            None => writeln!(out, "state {}", state_name(game.state()))?,
        }
        out.flush()
    }

    /// Handles `snapshot`.
    pub fn handle_snapshot<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game_mut("snapshot") else {
            return Ok(());
        };
        let snapshot = Snapshot::of(game);
        match serde_json::to_string(&snapshot) {
            Ok(json) => writeln!(out, "snapshot {}", json)?,
            Err(e) => error!("snapshot: {}", e),
        }
        out.flush()
    }
}
