//! Remote achievement schema and reconciliation with local unlocks
//!
//! The schema endpoint is the authority on which achievements a game has and
//! how to display them. Local files only contribute unlock timestamps; every
//! display field comes from the schema, and a local unlock the schema does
//! not know about is discarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{FetchError, TextFetcher};
use crate::scanner::RawUnlock;

/// Steam per-game achievement schema endpoint.
pub const DEFAULT_SCHEMA_URL: &str =
    "https://api.steampowered.com/ISteamUserStats/GetSchemaForGame/v2/";

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("schema payload malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One achievement definition from the remote schema.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaAchievement {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub icon: String,
    pub icongray: String,
}

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    game: SchemaGame,
}

#[derive(Debug, Deserialize)]
struct SchemaGame {
    #[serde(rename = "availableGameStats")]
    available_game_stats: AvailableGameStats,
}

#[derive(Debug, Deserialize)]
struct AvailableGameStats {
    achievements: Vec<SchemaAchievement>,
}

/// A display-ready achievement: schema metadata plus the local unlock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub api_key: String,
    pub display_name: String,
    pub description: String,
    pub icon_unlocked: String,
    pub icon_locked: String,
    pub unlocked_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Fetch the achievement schema for `app_id` in `language`.
///
/// Absence of the expected nested fields is a parse failure; a game without
/// achievements typically omits `availableGameStats` entirely.
pub fn fetch_schema(
    fetcher: &dyn TextFetcher,
    schema_url: &str,
    app_id: u32,
    language: &str,
    api_key: &str,
) -> Result<Vec<SchemaAchievement>, SchemaError> {
    let url = format!("{schema_url}?key={api_key}&appid={app_id}&l={language}");
    let body = fetcher.fetch_text(&url)?;
    let response: SchemaResponse = serde_json::from_str(&body)?;
    Ok(response.game.available_game_stats.achievements)
}

/// Merge local raw unlocks into the schema's achievement list.
///
/// The join key is the schema entry's internal name matched case-insensitively
/// against the raw unlock key; each raw record is consumed by at most one
/// schema entry. Output order follows the schema array. Raw records with no
/// schema match are dropped.
pub fn reconcile(schema: &[SchemaAchievement], raw: &[RawUnlock]) -> Vec<AchievementRecord> {
    let mut consumed = vec![false; raw.len()];

    schema
        .iter()
        .map(|entry| {
            let entry_key = entry.name.to_lowercase();
            let matched = raw
                .iter()
                .enumerate()
                .find(|(i, unlock)| !consumed[*i] && unlock.key.to_lowercase() == entry_key);

            let unlocked_at = match matched {
                Some((i, unlock)) => {
                    consumed[i] = true;
                    unlock.unlocked_at
                }
                None => None,
            };

            AchievementRecord {
                api_key: entry.name.clone(),
                display_name: entry.display_name.clone(),
                description: entry.description.clone(),
                icon_unlocked: entry.icon.clone(),
                icon_locked: entry.icongray.clone(),
                unlocked_at,
            }
        })
        .collect()
}
