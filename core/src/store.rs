//! SQLite persistence layer for runs, yearly history and snapshots.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never touches SQL; callers persist what the engine returns.

use rusqlite::{params, Connection, OptionalExtension};
use crate::{
    engine::HistoryEntry,
    error::SimResult,
    snapshot::Snapshot,
    types::{Seed, Year},
};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: Seed, stochastic: bool, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, stochastic, version, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                seed as i64,
                stochastic,
                version,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ── History ────────────────────────────────────────────────

    /// Persist history entries. Re-appending a year replaces it.
    pub fn append_history(&self, run_id: &str, entries: &[HistoryEntry]) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO history
                 (run_id, year, calendar_year, total_score, succession_score, total_population, entry_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    run_id,
                    entry.year as i64,
                    entry.calendar_year as i64,
                    entry.total_score,
                    entry.succession_score,
                    entry.total_population as i64,
                    serde_json::to_string(entry)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn history_for_run(&self, run_id: &str) -> SimResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_json FROM history WHERE run_id = ?1 ORDER BY year ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut entries = Vec::with_capacity(rows.len());
        for json in rows {
            entries.push(serde_json::from_str(&json)?);
        }
        Ok(entries)
    }

    /// (year, total_score) pairs, cheaper than loading full entries.
    pub fn score_series(&self, run_id: &str) -> SimResult<Vec<(Year, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, total_score FROM history WHERE run_id = ?1 ORDER BY year ASC",
        )?;
        let series = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, i64>(0)? as Year, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(series)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, snapshot: &Snapshot) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot (run_id, year, checksum, snapshot_json) VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                snapshot.state.year as i64,
                snapshot.checksum,
                snapshot.to_json()?,
            ],
        )?;
        Ok(())
    }

    /// Most recent snapshot JSON for the run, as stored.
    pub fn latest_snapshot(&self, run_id: &str) -> SimResult<Option<(Year, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT year, snapshot_json FROM snapshot
                 WHERE run_id = ?1
                 ORDER BY year DESC, id DESC LIMIT 1",
                params![run_id],
                |row| Ok((row.get::<_, i64>(0)? as Year, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}
