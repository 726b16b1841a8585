//! Matchboard: the core of a match-3 tile puzzle.
//!
//! Exposes the board model, combination detection, the resolution state
//! machine, and the text protocol used by the binary entry point and the
//! integration tests.

pub mod autoplay;
pub mod board;
pub mod config;
pub mod engine;
pub mod game;
pub mod protocol;
pub mod resolve;
