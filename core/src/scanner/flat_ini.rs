//! Format A: single-user flat achievement files
//!
//! ```ini
//! [ACH_FIRST_BLOOD]
//! Achieved=1
//! UnlockTime=1546300800
//!
//! ```
//!
//! A `[name]` line opens a record, an `UnlockTime` line with a nonzero value
//! marks it unlocked, and a blank line closes it. Only closed records with a
//! timestamp are emitted; a record still open at end of file is dropped,
//! matching the files these tools actually produce.

use chrono::{TimeZone, Utc};

use super::RawUnlock;

/// Per-record parse state. `Idle` until a `[name]` line opens a record.
enum RecordState {
    Idle,
    InRecord {
        key: String,
        unlock_time: Option<i64>,
    },
}

impl RecordState {
    /// Close the current record, emitting it if a timestamp was seen.
    fn finish(&mut self, out: &mut Vec<RawUnlock>) {
        if let RecordState::InRecord {
            key,
            unlock_time: Some(secs),
        } = self
            && let Some(ts) = Utc.timestamp_opt(*secs, 0).single()
        {
            out.push(RawUnlock {
                key: std::mem::take(key),
                unlocked_at: Some(ts),
            });
        }
        *self = RecordState::Idle;
    }
}

/// Parse a Format A achievements file into raw unlocks.
pub fn parse_flat_ini(content: &str) -> Vec<RawUnlock> {
    let mut out = Vec::new();
    let mut state = RecordState::Idle;

    for line in content.lines() {
        if line.contains('[') {
            // A new header implicitly abandons any unterminated record.
            state = RecordState::InRecord {
                key: line.replace(['[', ']'], "").trim().to_string(),
                unlock_time: None,
            };
            continue;
        }

        if line.contains("UnlockTime")
            && !line.to_lowercase().eq("unlocktime=0")
            && let RecordState::InRecord { unlock_time, .. } = &mut state
        {
            match line.trim().trim_start_matches("UnlockTime=").parse::<i64>() {
                Ok(secs) => *unlock_time = Some(secs),
                Err(_) => tracing::debug!("unparseable UnlockTime line: {line:?}"),
            }
        }

        if line.trim().is_empty() {
            state.finish(&mut out);
        }
    }

    // A record without a terminating blank line is discarded here, not
    // emitted. Vendor files always end records with a blank line.

    out
}
