//! Match resolution.
//!
//! Detects same-kind runs and applies the board passes of a cascade:
//! removal, gravity, and refill.

pub mod cascade;
pub mod matches;

pub use cascade::{clear_start_matches, collapse, refill, remove_matches, Fall, Spawn};
pub use matches::{find_matches, has_matches, Axis, Match, MIN_RUN};
