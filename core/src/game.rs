//! Game trait and session setup descriptors.
//!
//! RULE: Every engine implements ArcadeGame.
//! The session drives a game only through apply() and tick(); games
//! never see the store or the clock, and they own no timing of their
//! own — the host schedules every heartbeat.

use crate::{
    command::GameCommand,
    error::ArcadeResult,
    event::GameEvent,
    math_game::{Difficulty, MathOperation},
    rng::{GameKind, GameRng},
    types::Tick,
};
use std::any::Any;

/// The contract every mini-game must fulfill.
pub trait ArcadeGame: Send {
    /// Which stable RNG slot this game draws from.
    fn kind(&self) -> GameKind;

    /// Apply one player command at the given tick.
    ///
    /// Routine illegal inputs (a blocked tile, a reversal turn) are
    /// silent no-ops. Commands the game does not recognise at all are
    /// a host wiring bug and come back as CommandNotSupported.
    fn apply(
        &mut self,
        tick: Tick,
        command: &GameCommand,
        rng: &mut GameRng,
    ) -> ArcadeResult<Vec<GameEvent>>;

    /// Advance one host heartbeat. Games that do not consume ticks
    /// return no events.
    fn tick(&mut self, tick: Tick, rng: &mut GameRng) -> ArcadeResult<Vec<GameEvent>>;

    /// The complete render-ready state, as hosts consume it.
    fn state(&self) -> ArcadeResult<serde_json::Value>;

    /// For downcasting in tests and tooling only.
    /// Production session code never uses this.
    fn as_any(&self) -> &dyn Any;
}

/// Per-game parameters chosen by the host at session start.
#[derive(Debug, Clone)]
pub enum GameSetup {
    Slot {
        theme: String,
        initial_credits: f64,
    },
    Puzzle {
        grid_size: usize,
    },
    Snake,
    Math {
        difficulty: Difficulty,
        operation: MathOperation,
    },
}

impl GameSetup {
    pub fn kind(&self) -> GameKind {
        match self {
            Self::Slot { .. } => GameKind::Slot,
            Self::Puzzle { .. } => GameKind::Puzzle,
            Self::Snake => GameKind::Snake,
            Self::Math { .. } => GameKind::Math,
        }
    }
}
