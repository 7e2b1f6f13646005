//! Session clock — owns tick state and pause. The host schedules the
//! real-time cadence; the clock only counts heartbeats it is handed.

use crate::types::{SessionId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClock {
    pub session_id:   SessionId,
    pub current_tick: Tick,
    pub paused:       bool,
}

impl SessionClock {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            current_tick: 0,
            paused: true,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called while paused — callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }
}
