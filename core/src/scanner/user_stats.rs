//! Format B: per-user achievement stat files
//!
//! ```ini
//! [ACH_FIRST_BLOOD]
//! State = 0100000000
//! Time = 002f685900
//! ```
//!
//! Field values are 4-byte little-endian integers written as hex text (the
//! fifth byte, when present, is padding). A record is unlocked once a
//! nonzero `State` and a nonzero `Time`/`CurProgress` timestamp have both
//! been seen; there is no blank-line terminator in this format. The `Steam`
//! block holds tool bookkeeping, never an achievement.

use chrono::{TimeZone, Utc};

use super::RawUnlock;

enum RecordState {
    Idle,
    InRecord {
        key: String,
        unlocked: bool,
        unlock_time: i32,
    },
}

/// Parse a Format B achievements file into raw unlocks.
pub fn parse_user_stats(content: &str) -> Vec<RawUnlock> {
    let mut out = Vec::new();
    let mut state = RecordState::Idle;

    for line in content.lines() {
        if line.contains('[') {
            state = RecordState::InRecord {
                key: line.replace(['[', ']'], "").trim().to_string(),
                unlocked: false,
                unlock_time: 0,
            };
            continue;
        }

        let RecordState::InRecord {
            key,
            unlocked,
            unlock_time,
        } = &mut state
        else {
            continue;
        };

        if key.as_str() == "Steam" {
            continue;
        }

        let lower = line.to_lowercase();

        if line.contains("State") && lower != "state = 0000000000" {
            *unlocked = true;
        }

        if line.contains("Time")
            && lower != "time = 0000000000"
            && let Some(secs) = decode_hex_le(field_value(line))
        {
            *unlock_time = secs;
        }
        if line.contains("CurProgress")
            && lower != "curprogress = 0000000000"
            && let Some(secs) = decode_hex_le(field_value(line))
        {
            *unlock_time = secs;
        }

        // Emission is condition-triggered, not terminator-triggered.
        if *unlock_time != 0
            && *unlocked
            && let Some(ts) = Utc.timestamp_opt(*unlock_time as i64, 0).single()
        {
            out.push(RawUnlock {
                key: std::mem::take(key),
                unlocked_at: Some(ts),
            });
            state = RecordState::Idle;
        }
    }

    out
}

/// The text after `=`, trimmed; the whole line if there is no `=`.
fn field_value(line: &str) -> &str {
    match line.split_once('=') {
        Some((_, value)) => value.trim(),
        None => line.trim(),
    }
}

/// Decode a hex-encoded little-endian 4-byte integer. Returns `None` for
/// values that are not valid hex or carry fewer than 4 bytes.
fn decode_hex_le(hex: &str) -> Option<i32> {
    if hex.len() < 8 || !hex.len().is_multiple_of(2) {
        return None;
    }

    let mut bytes = [0u8; 4];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(i32::from_le_bytes(bytes))
}
