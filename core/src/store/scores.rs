//! High score table access.
//!
//! Scores are keyed per game variant (for example `puzzle-4x4` or
//! `math-easy-addition`) so each variant keeps its own record.

use super::ScoreStore;
use crate::{error::ArcadeResult, types::Tick};
use rusqlite::{params, OptionalExtension};

impl ScoreStore {
    /// Best recorded value for a score key, or `None` if never set.
    pub fn load_score(&self, key: &str) -> ArcadeResult<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM high_score WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Record a new best. Caller decides whether the value beats the
    /// old one; the store just overwrites.
    pub fn save_score(
        &self,
        key: &str,
        value: i64,
        session_id: &str,
        tick: Tick,
    ) -> ArcadeResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO high_score (key, value, session_id, updated_tick)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, session_id, tick as i64],
        )?;
        Ok(())
    }

    pub fn all_high_scores(&self) -> ArcadeResult<Vec<(String, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM high_score ORDER BY key ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
