//! Text protocol handling.
//!
//! Layout notation for boards and the line-command parser used by the
//! engine's main loop.

pub mod layout;
pub mod parser;

pub use layout::{encode_layout, parse_layout, parse_position, LayoutError};
pub use parser::{parse_command, Command};
