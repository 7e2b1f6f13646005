//! The event log vocabulary — everything a game may tell the outside
//! world.
//!
//! RULE: Hosts observe games ONLY through events and serialized state.
//! A host may never reach into an engine's internals, and an engine
//! may never talk to the store directly — score submission is itself
//! an event the session settles.

use crate::math_game::MathOperator;
use crate::reel_game::SymbolId;
use crate::snake_game::{Direction, SnakePhase};
use crate::types::{SessionId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during a session.
/// Variants are added per game — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session events ─────────────────────────────
    SessionStarted {
        session_id: SessionId,
        game: String,
        seed: u64,
    },
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    CommandReceived {
        tick: Tick,
        command_id: String,
        command_type: String,
    },
    /// Emitted by a game when a run of play produced a final score.
    ScoreSubmitted {
        tick: Tick,
        key: String,
        value: i64,
        direction: ScoreDirection,
    },
    /// Emitted by the session when a submitted score beat the record.
    HighScoreUpdated {
        tick: Tick,
        key: String,
        value: i64,
        previous: Option<i64>,
    },

    // ── Slot events ────────────────────────────────
    ReelsSpun {
        tick: Tick,
        bet: i64,
        payline: Vec<SymbolId>,
        credits: f64,
    },
    PaylineHit {
        tick: Tick,
        symbol: SymbolId,
        count: u8, // 3 = full line, 2 = adjacent pair
        payout: f64,
    },
    BonusRoundWon {
        tick: Tick,
        multiplier: i64,
        payout: f64,
    },
    BetChanged {
        tick: Tick,
        bet: i64,
    },
    AutoPlayChanged {
        tick: Tick,
        enabled: bool,
        reason: String, // "requested" | "insufficient_credits"
    },

    // ── Puzzle events ──────────────────────────────
    PuzzleShuffled {
        tick: Tick,
        grid_size: usize,
        steps: u64,
    },
    TileMoved {
        tick: Tick,
        value: u16,
        row: usize,
        col: usize,
        moves: u64,
    },
    PuzzleSolved {
        tick: Tick,
        moves: u64,
    },

    // ── Snake events ───────────────────────────────
    SnakePhaseChanged {
        tick: Tick,
        phase: SnakePhase,
    },
    DirectionChanged {
        tick: Tick,
        direction: Direction,
    },
    FoodEaten {
        tick: Tick,
        x: i32,
        y: i32,
        special: bool,
        score: i64,
    },
    FoodSpawned {
        tick: Tick,
        x: i32,
        y: i32,
        special: bool,
    },
    SpeedIncreased {
        tick: Tick,
        interval_ms: u32,
    },
    SnakeCrashed {
        tick: Tick,
        score: i64,
        length: usize,
    },

    // ── Math events ────────────────────────────────
    QuestionPosed {
        tick: Tick,
        number: u32,
        operand_a: i64,
        operand_b: i64,
        operator: MathOperator,
    },
    AnswerAccepted {
        tick: Tick,
        answer: i64,
        points: i64,
        streak: u32,
        time_remaining: u32,
    },
    AnswerRejected {
        tick: Tick,
        given: i64,
        correct: i64,
    },
    StreakMilestone {
        tick: Tick,
        streak: u32,
    },
    MathSessionEnded {
        tick: Tick,
        score: i64,
        questions_answered: u32,
    },
}

impl GameEvent {
    /// The persisted event_type column, matching the serde tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::TickStarted { .. } => "tick_started",
            Self::TickCompleted { .. } => "tick_completed",
            Self::CommandReceived { .. } => "command_received",
            Self::ScoreSubmitted { .. } => "score_submitted",
            Self::HighScoreUpdated { .. } => "high_score_updated",
            Self::ReelsSpun { .. } => "reels_spun",
            Self::PaylineHit { .. } => "payline_hit",
            Self::BonusRoundWon { .. } => "bonus_round_won",
            Self::BetChanged { .. } => "bet_changed",
            Self::AutoPlayChanged { .. } => "auto_play_changed",
            Self::PuzzleShuffled { .. } => "puzzle_shuffled",
            Self::TileMoved { .. } => "tile_moved",
            Self::PuzzleSolved { .. } => "puzzle_solved",
            Self::SnakePhaseChanged { .. } => "snake_phase_changed",
            Self::DirectionChanged { .. } => "direction_changed",
            Self::FoodEaten { .. } => "food_eaten",
            Self::FoodSpawned { .. } => "food_spawned",
            Self::SpeedIncreased { .. } => "speed_increased",
            Self::SnakeCrashed { .. } => "snake_crashed",
            Self::QuestionPosed { .. } => "question_posed",
            Self::AnswerAccepted { .. } => "answer_accepted",
            Self::AnswerRejected { .. } => "answer_rejected",
            Self::StreakMilestone { .. } => "streak_milestone",
            Self::MathSessionEnded { .. } => "math_session_ended",
        }
    }
}

/// Which way a high-score comparison points. Puzzle records count
/// moves, so fewer is better; snake and math count points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDirection {
    HigherIsBetter,
    LowerIsBetter,
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub session_id: SessionId,
    pub tick: Tick,
    pub game: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized GameEvent
}
