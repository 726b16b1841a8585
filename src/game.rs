//! Resolution engine.
//!
//! Drives player intent through the turn state machine:
//!
//! - `Idle`: accepting input, nothing selected.
//! - `Selected`: one tile highlighted, waiting for the second pick.
//! - `Resolving`: a swap or cascade is in flight; every touch is ignored.
//!
//! The engine does no I/O. Visual work is requested by pushing [`Effect`]s to
//! an outbox the view drains. A [`Motion`] is awaitable: the view reports its
//! completion with [`Game::complete`], exactly once, after the transition
//! finishes. Passes are joined on a counted barrier of pending motions; the
//! next pass starts only once every motion of the current one has completed.
//! The board is mutated when a pass starts, so the model is always ahead of
//! (or equal to) what is on screen.

use std::collections::BTreeSet;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::board::{Board, BoardError, Coord, TileFactory, TileId};
use crate::config::{ConfigError, GameConfig};
use crate::resolve::{clear_start_matches, collapse, find_matches, refill, remove_matches, Match};

/// Duration of each half of a swap, in relative animation units.
pub const SWAP_DURATION: f32 = 0.2;

/// Duration of a gravity fall or a refill drop.
pub const FALL_DURATION: f32 = 0.5;

/// Errors surfaced by the engine. All are contract violations by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("motion {0} is not pending")]
    UnknownMotion(MotionId),

    #[error("board is not quiescent: {0}")]
    NotQuiescent(String),
}

/// Identity of one requested tile motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MotionId(pub u64);

impl std::fmt::Display for MotionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a tile is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotionKind {
    /// Half of a swap (or of its revert).
    Swap,
    /// Gravity drop into a field emptied by removal.
    Fall,
    /// A new tile dropping in from above the board.
    Spawn,
}

impl MotionKind {
    pub const fn name(self) -> &'static str {
        match self {
            MotionKind::Swap => "swap",
            MotionKind::Fall => "fall",
            MotionKind::Spawn => "spawn",
        }
    }
}

/// A request to animate `tile` to the field at `to`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Motion {
    pub id: MotionId,
    pub tile: TileId,
    pub kind: MotionKind,
    pub to: Coord,
    pub duration: f32,
    pub delay: f32,
}

/// Work requested from the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    /// Animate a tile; must be acknowledged with [`Game::complete`].
    Move(Motion),
    /// Tear down a removed tile's visual. Never awaited.
    Remove(TileId),
    /// Highlight a field.
    Select(Coord),
    /// Clear a field's highlight.
    Unselect(Coord),
}

/// Externally visible turn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnState {
    Idle,
    Selected(TileId),
    Resolving,
}

/// What a touch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// Input is disabled; nothing changed.
    Ignored,
    /// The tile became the selection.
    Selected(Coord),
    /// The previous selection was dropped for this non-adjacent tile.
    Reselected { from: Coord, to: Coord },
    /// Adjacent pick: the swap-and-check protocol started.
    Swapping { from: Coord, to: Coord },
}

/// Counters for the game so far. Not a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TurnStats {
    /// Swaps that produced a match.
    pub swaps: u32,
    /// Swaps that produced no match and were reverted.
    pub reverts: u32,
    /// Remove/fall/refill iterations.
    pub cascades: u32,
    /// Tiles removed by matches.
    pub cleared: u32,
}

/// Pass gated by the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Swap {
        first: TileId,
        second: TileId,
        reverse: bool,
    },
    Fall,
    Refill,
}

/// Counted-completion join over pending motions.
#[derive(Debug, Default)]
struct Barrier {
    pending: BTreeSet<MotionId>,
}

impl Barrier {
    fn arm(&mut self, id: MotionId) {
        self.pending.insert(id);
    }

    /// Marks one motion done. Returns true when it was the last one pending.
    fn release(&mut self, id: MotionId) -> Result<bool, GameError> {
        if !self.pending.remove(&id) {
            return Err(GameError::UnknownMotion(id));
        }
        Ok(self.pending.is_empty())
    }

    fn len(&self) -> usize {
        self.pending.len()
    }
}

/// The board plus the turn state machine around it.
#[derive(Debug)]
pub struct Game {
    board: Board,
    state: TurnState,
    stage: Option<Stage>,
    barrier: Barrier,
    effects: Vec<Effect>,
    next_motion: u64,
    stats: TurnStats,
}

impl Game {
    /// Builds a game from a validated configuration. The starting board
    /// never presents a ready-made match.
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let factory = TileFactory::new(config.kinds, config.seed);
        let mut board = Board::new(config.rows, config.cols, factory);
        let rounds = clear_start_matches(&mut board)?;
        debug!(
            rows = config.rows,
            cols = config.cols,
            kinds = config.kinds,
            rounds,
            "new game"
        );
        Game::with_board(board)
    }

    /// Wraps an existing board in `Idle`. Empty fields are filled first
    /// (gravity, then refill) without emitting motions, so the game starts
    /// full. Ready-made matches are kept; the first accepted swap resolves them.
    pub fn with_board(mut board: Board) -> Result<Self, GameError> {
        if !board.is_full() {
            let falls = collapse(&mut board)?;
            let spawns = refill(&mut board)?;
            debug!(
                falls = falls.len(),
                spawns = spawns.len(),
                "filled loaded board"
            );
        }
        Ok(Game {
            board,
            state: TurnState::Idle,
            stage: None,
            barrier: Barrier::default(),
            effects: Vec::new(),
            next_motion: 1,
            stats: TurnStats::default(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// True while a swap or cascade is in flight and input is ignored.
    pub fn is_disabled(&self) -> bool {
        self.state == TurnState::Resolving
    }

    pub fn selected(&self) -> Option<TileId> {
        match self.state {
            TurnState::Selected(id) => Some(id),
            _ => None,
        }
    }

    pub fn stats(&self) -> TurnStats {
        self.stats
    }

    /// Number of motions the current pass is still waiting on.
    pub fn pending_motions(&self) -> usize {
        self.barrier.len()
    }

    /// Effects emitted since the last drain.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Takes every effect emitted since the last drain, in emission order.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Handles a "tile touched" event.
    #[instrument(level = "debug", skip(self), fields(state = ?self.state))]
    pub fn touch(&mut self, tile: TileId) -> Result<TouchOutcome, GameError> {
        if self.is_disabled() {
            trace!("input disabled, touch ignored");
            return Ok(TouchOutcome::Ignored);
        }
        let at = self.board.position_of(tile)?;

        match self.state {
            TurnState::Selected(current) => {
                let from = self.board.position_of(current)?;
                if self.board.is_neighbour(current, tile)? {
                    self.clear_selection()?;
                    self.begin_swap(current, tile, false)?;
                    Ok(TouchOutcome::Swapping { from, to: at })
                } else {
                    self.clear_selection()?;
                    self.select_tile(tile, at)?;
                    Ok(TouchOutcome::Reselected { from, to: at })
                }
            }
            _ => {
                self.select_tile(tile, at)?;
                Ok(TouchOutcome::Selected(at))
            }
        }
    }

    /// Touches whatever tile occupies `coord`.
    pub fn touch_at(&mut self, coord: Coord) -> Result<TouchOutcome, GameError> {
        if self.is_disabled() {
            return Ok(TouchOutcome::Ignored);
        }
        let field = self.board.field(coord).ok_or(BoardError::OutOfRange {
            row: coord.row,
            col: coord.col,
        })?;
        let tile = field.tile().ok_or(BoardError::FieldEmpty(coord))?;
        self.touch(tile)
    }

    /// Reports that a motion finished. When it was the last one the current
    /// pass waited on, the engine advances to the next pass.
    #[instrument(level = "trace", skip(self))]
    pub fn complete(&mut self, motion: MotionId) -> Result<(), GameError> {
        let last = match self.barrier.release(motion) {
            Ok(last) => last,
            Err(e) => {
                warn!(%motion, "completion for a motion that is not pending");
                return Err(e);
            }
        };
        if last {
            self.advance()?;
        }
        Ok(())
    }

    /// Completes every outstanding motion, in id order, until the engine is
    /// no longer waiting. Returns how many motions were completed.
    pub fn settle(&mut self) -> Result<usize, GameError> {
        let mut completed = 0;
        loop {
            let pending: Vec<MotionId> = self.barrier.pending.iter().copied().collect();
            if pending.is_empty() {
                break;
            }
            for id in pending {
                self.complete(id)?;
                completed += 1;
            }
        }
        Ok(completed)
    }

    /// Checks the quiescent invariants: not resolving, board full and mutually
    /// consistent, no matches on the board.
    pub fn check_quiescent(&self) -> Result<(), GameError> {
        if self.is_disabled() {
            return Err(GameError::NotQuiescent("resolution in progress".into()));
        }
        self.board.check_consistency()?;
        if !self.board.is_full() {
            return Err(GameError::NotQuiescent(format!(
                "{} empty fields",
                self.board.empty_fields().len()
            )));
        }
        let matches = find_matches(&self.board);
        if !matches.is_empty() {
            return Err(GameError::NotQuiescent(format!(
                "{} matches left on the board",
                matches.len()
            )));
        }
        Ok(())
    }

    fn select_tile(&mut self, tile: TileId, at: Coord) -> Result<(), GameError> {
        self.board.select(at)?;
        self.state = TurnState::Selected(tile);
        self.effects.push(Effect::Select(at));
        debug!(%tile, %at, "selected");
        Ok(())
    }

    fn clear_selection(&mut self) -> Result<(), GameError> {
        if let TurnState::Selected(tile) = self.state {
            let at = self.board.position_of(tile)?;
            self.board.unselect(at)?;
            self.effects.push(Effect::Unselect(at));
            self.state = TurnState::Idle;
        }
        Ok(())
    }

    fn request_motion(&mut self, tile: TileId, kind: MotionKind, to: Coord, duration: f32, delay: f32) {
        let id = MotionId(self.next_motion);
        self.next_motion += 1;
        self.barrier.arm(id);
        self.effects.push(Effect::Move(Motion {
            id,
            tile,
            kind,
            to,
            duration,
            delay,
        }));
    }

    /// Starts both halves of a swap. The model swaps only once both are done.
    fn begin_swap(&mut self, first: TileId, second: TileId, reverse: bool) -> Result<(), GameError> {
        let a = self.board.position_of(first)?;
        let b = self.board.position_of(second)?;
        self.state = TurnState::Resolving;
        self.stage = Some(Stage::Swap {
            first,
            second,
            reverse,
        });
        self.request_motion(first, MotionKind::Swap, b, SWAP_DURATION, 0.0);
        self.request_motion(second, MotionKind::Swap, a, SWAP_DURATION, 0.0);
        debug!(%a, %b, reverse, "swap started");
        Ok(())
    }

    fn advance(&mut self) -> Result<(), GameError> {
        let Some(stage) = self.stage.take() else {
            return Ok(());
        };
        match stage {
            Stage::Swap {
                first,
                second,
                reverse,
            } => {
                self.board.swap(first, second)?;
                if reverse {
                    debug!("swap reverted");
                    self.finish();
                    return Ok(());
                }
                let matches = find_matches(&self.board);
                if matches.is_empty() {
                    self.stats.reverts += 1;
                    debug!("no match, reverting");
                    self.begin_swap(second, first, true)
                } else {
                    self.stats.swaps += 1;
                    self.cascade(matches)
                }
            }
            Stage::Fall => self.refill_pass(),
            Stage::Refill => self.recheck(),
        }
    }

    /// One cascade iteration: remove, then gravity.
    fn cascade(&mut self, matches: Vec<Match>) -> Result<(), GameError> {
        self.stats.cascades += 1;
        let removed = remove_matches(&mut self.board, &matches)?;
        self.stats.cleared += removed.len() as u32;
        debug!(
            matches = matches.len(),
            removed = removed.len(),
            iteration = self.stats.cascades,
            "cascade"
        );
        self.effects.extend(removed.into_iter().map(Effect::Remove));
        self.gravity_pass()
    }

    fn gravity_pass(&mut self) -> Result<(), GameError> {
        let falls = collapse(&mut self.board)?;
        if falls.is_empty() {
            return self.refill_pass();
        }
        self.stage = Some(Stage::Fall);
        for fall in falls {
            self.request_motion(fall.tile, MotionKind::Fall, fall.to, FALL_DURATION, 0.0);
        }
        Ok(())
    }

    fn refill_pass(&mut self) -> Result<(), GameError> {
        let spawns = refill(&mut self.board)?;
        if spawns.is_empty() {
            return self.recheck();
        }
        self.stage = Some(Stage::Refill);
        for spawn in spawns {
            let delay = stagger_delay(self.board.factory_mut(), spawn.to.row);
            self.request_motion(spawn.tile, MotionKind::Spawn, spawn.to, FALL_DURATION, delay);
        }
        Ok(())
    }

    fn recheck(&mut self) -> Result<(), GameError> {
        let matches = find_matches(&self.board);
        if matches.is_empty() {
            self.finish();
            Ok(())
        } else {
            self.cascade(matches)
        }
    }

    fn finish(&mut self) {
        self.stage = None;
        self.state = TurnState::Idle;
        debug!(stats = ?self.stats, "board quiescent, input enabled");
    }
}

/// Cosmetic per-row delay for refill drops: lower rows start sooner.
fn stagger_delay(factory: &mut TileFactory, row: usize) -> f32 {
    factory.rng().gen_range(0.0..0.2) + 0.3 / (row as f32 + 1.0)
}
