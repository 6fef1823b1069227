//! Local achievement-file discovery
//!
//! Third-party distribution tools drop per-game achievement state under a
//! handful of well-known directories, in two incompatible encodings. Each
//! scan root is tagged with its format so dispatch is a typed match, not a
//! string comparison on the path.

mod flat_ini;
mod user_stats;

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

pub use flat_ini::parse_flat_ini;
pub use user_stats::parse_user_stats;

/// A locally-derived unlock: the vendor-reported achievement identifier and
/// when it was unlocked. Carries no display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnlock {
    pub key: String,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// On-disk encoding of an achievement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementFormat {
    /// Single-user flat layout: `<root>/<app_id>/achievements.ini`.
    FlatIni,
    /// Multi-user layout: `<root>/<user>/<app_id>/stats/achievements.ini`.
    UserStats,
}

/// A candidate directory to scan, with `%VAR%` environment tokens unexpanded.
#[derive(Debug, Clone)]
pub struct ScanRoot {
    pub path: String,
    pub format: AchievementFormat,
}

impl ScanRoot {
    pub fn new(path: impl Into<String>, format: AchievementFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

/// The directories the covered distribution tools are known to write to.
pub fn default_scan_roots() -> Vec<ScanRoot> {
    vec![
        ScanRoot::new(
            "%PUBLIC%/Documents/Steam/CODEX",
            AchievementFormat::FlatIni,
        ),
        ScanRoot::new("%APPDATA%/Steam/CODEX", AchievementFormat::FlatIni),
        ScanRoot::new("%PROGRAMDATA%/Steam", AchievementFormat::UserStats),
    ]
}

/// Scan every root for achievement files belonging to `app_id`.
///
/// Roots whose environment tokens cannot be expanded or whose directories do
/// not exist are skipped silently. Results keep root declaration order and
/// are not de-duplicated across roots.
pub fn scan(roots: &[ScanRoot], app_id: u32) -> Vec<RawUnlock> {
    let mut unlocks = Vec::new();

    for root in roots {
        let Some(root_path) = expand_env_tokens(&root.path) else {
            tracing::debug!("skipping root with unexpandable tokens: {}", root.path);
            continue;
        };

        match root.format {
            AchievementFormat::FlatIni => {
                let file = root_path.join(app_id.to_string()).join("achievements.ini");
                if let Ok(content) = fs::read_to_string(&file) {
                    tracing::debug!("parsing {}", file.display());
                    unlocks.extend(parse_flat_ini(&content));
                }
            }
            AchievementFormat::UserStats => {
                let Ok(entries) = fs::read_dir(&root_path) else {
                    continue;
                };
                for entry in entries.flatten() {
                    let user_dir = entry.path();
                    if !user_dir.is_dir() {
                        continue;
                    }
                    let file = user_dir
                        .join(app_id.to_string())
                        .join("stats")
                        .join("achievements.ini");
                    if let Ok(content) = fs::read_to_string(&file) {
                        tracing::debug!("parsing {}", file.display());
                        unlocks.extend(parse_user_stats(&content));
                    }
                }
            }
        }
    }

    if unlocks.is_empty() {
        tracing::debug!("no local achievement data for app {app_id}");
    }

    unlocks
}

/// Expand `%VAR%` tokens from the process environment.
///
/// Tries the token's exact name, then its uppercase form (Windows variable
/// names are case-insensitive; the rest of the path is left as-is). Returns
/// `None` if any token has no value.
fn expand_env_tokens(path: &str) -> Option<PathBuf> {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('%')?;
        let name = &after[..end];
        let value =
            std::env::var(name).or_else(|_| std::env::var(name.to_uppercase()))
                .ok()?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Some(PathBuf::from(out))
}
