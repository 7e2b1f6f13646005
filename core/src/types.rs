//! Shared primitive types used across the entire arcade.

/// A session tick. One tick = one host heartbeat; each game attaches
/// its own meaning (snake: one movement step, math: one second of the
/// countdown, slot: one auto-play opportunity).
pub type Tick = u64;

/// The canonical session identifier.
pub type SessionId = String;
