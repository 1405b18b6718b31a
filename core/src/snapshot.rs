//! Snapshot serialization — full simulation state and history to/from JSON.
//!
//! A snapshot is versioned and checksummed. The checksum covers the
//! `state` and `history` payload only (never the checksum field itself)
//! and is computed over the canonical JSON form (sorted keys), so a
//! snapshot survives re-formatting by other tools.
//!
//! Import rejects payloads without a version, `state` or `history`.
//! A checksum mismatch is reported and logged but not fatal.

use crate::{
    engine::{HistoryEntry, SimState},
    error::{SimError, SimResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::hash::Hasher;

pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version:     u64,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    pub checksum:    String,
    pub state:       SimState,
    pub history:     Vec<HistoryEntry>,
}

/// Result of an import. `checksum_valid` is false when the stored
/// checksum is missing or does not match the payload.
#[derive(Debug, Clone)]
pub struct ImportedSnapshot {
    pub snapshot:       Snapshot,
    pub checksum_valid: bool,
}

impl Snapshot {
    pub fn capture(state: SimState, history: Vec<HistoryEntry>) -> SimResult<Self> {
        let payload = json!({
            "state":   serde_json::to_value(&state)?,
            "history": serde_json::to_value(&history)?,
        });
        Ok(Self {
            version: SNAPSHOT_VERSION,
            exported_at: Some(Utc::now()),
            checksum: checksum(&payload)?,
            state,
            history,
        })
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and verify a snapshot produced by `to_json` (or a compatible tool).
    pub fn import(json_text: &str) -> SimResult<ImportedSnapshot> {
        let value: Value = serde_json::from_str(json_text)?;
        let obj = value.as_object().ok_or_else(|| SimError::InvalidSnapshot {
            reason: "snapshot must be a JSON object".into(),
        })?;

        let version = obj
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| SimError::InvalidSnapshot { reason: "missing version".into() })?;
        if version > SNAPSHOT_VERSION {
            return Err(SimError::UnsupportedSnapshotVersion { found: version });
        }

        let state_value = obj
            .get("state")
            .ok_or_else(|| SimError::InvalidSnapshot { reason: "missing state".into() })?;
        let history_value = obj
            .get("history")
            .ok_or_else(|| SimError::InvalidSnapshot { reason: "missing history".into() })?;

        let expected = checksum(&json!({
            "state":   state_value,
            "history": history_value,
        }))?;
        let stored = obj.get("checksum").and_then(Value::as_str);
        let checksum_valid = stored == Some(expected.as_str());
        if !checksum_valid {
            log::warn!(
                "snapshot checksum mismatch: stored={} computed={expected}",
                stored.unwrap_or("<none>")
            );
        }

        let exported_at = obj
            .get("exported_at")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());
        let snapshot = Snapshot {
            version,
            exported_at,
            checksum: expected,
            state: serde_json::from_value(state_value.clone())?,
            history: serde_json::from_value(history_value.clone())?,
        };
        Ok(ImportedSnapshot { snapshot, checksum_valid })
    }
}

/// FNV-1a 64 over the canonical JSON text of `payload`, as 16 hex digits.
pub fn checksum(payload: &Value) -> SimResult<String> {
    let text = serde_json::to_string(payload)?;
    let mut hasher = FnvHasher::new();
    hasher.write(text.as_bytes());
    Ok(format!("{:016x}", hasher.finish()))
}

/// Deterministic FNV-1a 64-bit hasher.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    pub fn new() -> Self {
        Self { state: Self::OFFSET_BASIS }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}
