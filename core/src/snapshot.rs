//! Snapshot serialization — full session state to JSON.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL ticks.
//! It captures the complete state needed to resume a session
//! from that tick without replaying from tick 0.

use crate::{
    clock::SessionClock,
    rng::GameKind,
    types::{SessionId, Tick},
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_INTERVAL: Tick = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub tick: Tick,
    pub clock: SessionClock,
    pub game: GameKind,
    /// The running game's own state, as produced by `ArcadeGame::state`.
    pub state: serde_json::Value,
}
