use crate::snake_game::Direction;
use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// Variants added per game — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum GameCommand {
    // ── Slot ──────────────────────────────────────
    Spin,
    AdjustBet { delta: i64 },
    SetAutoPlay { enabled: bool },

    // ── Puzzle ────────────────────────────────────
    Shuffle,
    MoveTile { row: usize, col: usize },

    // ── Snake ─────────────────────────────────────
    Start,
    Pause,
    Resume,
    Reset,
    SetDirection { direction: Direction },

    // ── Math ──────────────────────────────────────
    SubmitAnswer { input: String },
}

impl GameCommand {
    /// The logged command_type, matching the serde tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::AdjustBet { .. } => "adjust_bet",
            Self::SetAutoPlay { .. } => "set_auto_play",
            Self::Shuffle => "shuffle",
            Self::MoveTile { .. } => "move_tile",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Reset => "reset",
            Self::SetDirection { .. } => "set_direction",
            Self::SubmitAnswer { .. } => "submit_answer",
        }
    }
}
