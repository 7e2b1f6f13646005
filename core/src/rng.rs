//! Deterministic random number generation.
//!
//! RULE: Nothing in the engines may call any platform RNG.
//! All randomness flows through GameRng streams derived from
//! the single master seed stored on the session record.
//!
//! Each game gets its own stream per tick, seeded deterministically
//! from (master_seed, game slot, tick). This means:
//!   - Adding a new game never changes existing games' streams.
//!   - Any single tick's draws are reproducible without replaying
//!     the whole session, which keeps snapshots honest.
//!
//! Tests substitute GameRng::scripted(..) to force exact outcomes.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::types::Tick;

/// Stable game slot assignments for stream derivation.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every game's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u64)]
pub enum GameKind {
    Slot = 0,
    Puzzle = 1,
    Snake = 2,
    Math = 3,
    // Add new games here — append only.
}

impl GameKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slot => "slot",
            Self::Puzzle => "puzzle",
            Self::Snake => "snake",
            Self::Math => "math",
        }
    }
}

enum RngSource {
    Seeded(Pcg64Mcg),
    Scripted { values: Vec<f64>, cursor: usize },
}

/// A named, deterministic RNG for a single game at a single tick.
pub struct GameRng {
    pub name: &'static str,
    source: RngSource,
}

impl GameRng {
    /// Derive the stream for one game at one tick. The two mixing
    /// constants are distinct odd numbers so (slot, tick) pairs land
    /// on distinct seeds.
    pub fn for_game_at_tick(master_seed: u64, kind: GameKind, tick: Tick) -> Self {
        let derived_seed = master_seed
            ^ (kind as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ tick.wrapping_mul(0xd1b5_4a32_d192_ed03);
        Self {
            name: kind.name(),
            source: RngSource::Seeded(Pcg64Mcg::seed_from_u64(derived_seed)),
        }
    }

    /// A fixed sequence of [0, 1) values. Panics when exhausted, so a
    /// test that scripts too few draws fails loudly instead of passing
    /// on garbage.
    pub fn scripted(values: Vec<f64>) -> Self {
        Self {
            name: "scripted",
            source: RngSource::Scripted { values, cursor: 0 },
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        match &mut self.source {
            RngSource::Seeded(inner) => {
                use rand::RngCore;
                let bits = inner.next_u64();
                (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
            }
            RngSource::Scripted { values, cursor } => {
                assert!(
                    *cursor < values.len(),
                    "scripted rng exhausted after {} draws",
                    values.len()
                );
                let value = values[*cursor];
                *cursor += 1;
                value
            }
        }
    }

    /// Roll an index in [0, n). Derived from next_f64 so scripted and
    /// seeded streams behave identically.
    pub fn next_index(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        let raw = (self.next_f64() * n as f64) as usize;
        // Guards the f ~ 1.0 edge from sloppy scripted values.
        raw.min(n - 1)
    }

    /// Roll an integer in [lo, hi], both ends inclusive.
    pub fn next_range_i64(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "range [{lo}, {hi}] is empty");
        lo + self.next_index((hi - lo + 1) as usize) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
