//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The session and the runner call store methods — they never execute
//! SQL directly, and games never see the store at all.

use crate::{error::ArcadeResult, event::EventLogEntry, types::Tick};
use rusqlite::{params, Connection};

mod scores;

pub struct ScoreStore {
    conn: Connection,
}

impl ScoreStore {
    pub fn open(path: &str) -> ArcadeResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ArcadeResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ArcadeResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_high_scores.sql"))?;
        Ok(())
    }

    // ── Session registry ───────────────────────────────────────

    pub fn insert_session(
        &self,
        session_id: &str,
        game: &str,
        seed: u64,
        version: &str,
    ) -> ArcadeResult<()> {
        self.conn.execute(
            "INSERT INTO session (session_id, game, seed, version, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, game, seed as i64, version, 0i64],
        )?;
        Ok(())
    }

    pub fn session_seed(&self, session_id: &str) -> ArcadeResult<u64> {
        let seed: i64 = self.conn.query_row(
            "SELECT seed FROM session WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(seed as u64)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> ArcadeResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, tick, game, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.session_id,
                entry.tick as i64,
                entry.game,
                entry.event_type,
                entry.payload,
                entry.tick as i64,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_tick(
        &self,
        session_id: &str,
        tick: Tick,
    ) -> ArcadeResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, tick, game, event_type, payload
             FROM event_log WHERE session_id = ?1 AND tick = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id, tick as i64], event_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn events_of_type(
        &self,
        session_id: &str,
        event_type: &str,
    ) -> ArcadeResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, tick, game, event_type, payload
             FROM event_log WHERE session_id = ?1 AND event_type = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id, event_type], event_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, session_id: &str) -> ArcadeResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(
        &self,
        session_id: &str,
        tick: Tick,
        state_json: &str,
    ) -> ArcadeResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot (session_id, tick, state_json) VALUES (?1, ?2, ?3)",
            params![session_id, tick as i64, state_json],
        )?;
        Ok(())
    }

    pub fn latest_snapshot_before(
        &self,
        session_id: &str,
        tick: Tick,
    ) -> ArcadeResult<Option<(Tick, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT tick, state_json FROM snapshot
             WHERE session_id = ?1 AND tick <= ?2
             ORDER BY tick DESC LIMIT 1",
        )?;
        let result = stmt
            .query_row(params![session_id, tick as i64], |row| {
                Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?))
            })
            .ok();
        Ok(result)
    }
}

fn event_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventLogEntry> {
    Ok(EventLogEntry {
        id: Some(row.get(0)?),
        session_id: row.get(1)?,
        tick: row.get::<_, i64>(2)? as u64,
        game: row.get(3)?,
        event_type: row.get(4)?,
        payload: row.get(5)?,
    })
}
