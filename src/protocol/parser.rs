//! Command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the main loop can dispatch on.

use tracing::warn;

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set a game option: `setoption name <Rows|Cols|Kinds|Seed> value <n>`.
    SetOption { name: String, value: String },

    /// Build a new game from the current options.
    NewGame,

    /// Load a board from layout notation, as-is.
    Position { layout: String },

    /// Deliver a "tile touched" event for the tile at a field.
    Touch { row: usize, col: usize },

    /// List the effects emitted since the last listing.
    Effects,

    /// Report one motion as finished.
    Complete { motion: u64 },

    /// Finish every outstanding motion.
    Settle,

    /// Print the board in layout notation.
    Board,

    /// Print the turn state.
    State,

    /// Print a JSON snapshot of the game.
    Snapshot,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();

    match tokens[0] {
        "isready" => Some(Command::IsReady),
        "newgame" => Some(Command::NewGame),
        "effects" => Some(Command::Effects),
        "settle" => Some(Command::Settle),
        "board" => Some(Command::Board),
        "state" => Some(Command::State),
        "snapshot" => Some(Command::Snapshot),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(&tokens),
        "position" => parse_position(&tokens),
        "touch" => parse_touch(&tokens),
        "complete" => parse_complete(&tokens),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

/// Option names `setoption` accepts, matched case-insensitively.
const OPTION_NAMES: [&str; 4] = ["rows", "cols", "kinds", "seed"];

/// Parses `setoption name <option> value <n>`. Every option is a single
/// unsigned number; range checks happen when the game is built.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    let [_, "name", name, "value", value] = tokens else {
        warn!("malformed setoption: expected 'setoption name <option> value <n>'");
        return None;
    };
    if !OPTION_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        warn!("unknown option: {}", name);
        return None;
    }
    if value.parse::<u64>().is_err() {
        warn!("invalid value for {}: '{}'", name, value);
        return None;
    }
    Some(Command::SetOption {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parses `position <layout>`.
fn parse_position(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed position: expected 'position <layout>'");
        return None;
    }
    Some(Command::Position {
        layout: tokens[1].to_string(),
    })
}

/// Parses `touch <row> <col>`.
fn parse_touch(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed touch: expected 'touch <row> <col>'");
        return None;
    }
    match (tokens[1].parse::<usize>(), tokens[2].parse::<usize>()) {
        (Ok(row), Ok(col)) => Some(Command::Touch { row, col }),
        _ => {
            warn!("invalid touch coordinates: '{} {}'", tokens[1], tokens[2]);
            None
        }
    }
}

/// Parses `complete <motion>`.
fn parse_complete(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed complete: expected 'complete <motion>'");
        return None;
    }
    match tokens[1].parse::<u64>() {
        Ok(motion) => Some(Command::Complete { motion }),
        Err(_) => {
            warn!("invalid motion id: '{}'", tokens[1]);
            None
        }
    }
}
