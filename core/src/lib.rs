//! arcade-core — deterministic game engines for the Lunchbreak Arcade.
//!
//! Four mini-games (weighted slot reel, sliding puzzle, snake, math
//! challenge) run under one session driver. Every session is seeded,
//! every state change lands in a SQLite event log, and the same seed
//! with the same commands always replays to the same log.

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod math_game;
pub mod puzzle_game;
pub mod reel_game;
pub mod rng;
pub mod session;
pub mod snake_game;
pub mod snapshot;
pub mod store;
pub mod types;
