//! Achievement resolution facade
//!
//! The single entry point hosts call: title in, `GameAchievementSummary`
//! out. Each stage absorbs its own failures, so a resolution never errors —
//! the worst case is a summary with `has_achievements = false`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogResolver, DEFAULT_CACHE_TTL, DEFAULT_LISTING_URL};
use crate::fetch::{HttpTextFetcher, TextFetcher};
use crate::norm::{TitleTransform, default_title_transforms};
use crate::scanner::{self, ScanRoot, default_scan_roots};
use crate::schema::{self, AchievementRecord, DEFAULT_SCHEMA_URL};

/// Configuration for an [`AchievementResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory holding the catalog cache file.
    pub cache_dir: PathBuf,
    /// Full catalog listing endpoint.
    pub listing_url: String,
    /// Per-game achievement schema endpoint.
    pub schema_url: String,
    /// Catalog cache freshness window.
    pub cache_ttl: Duration,
    /// Local directories to scan, in order.
    pub scan_roots: Vec<ScanRoot>,
    /// Title mutations tried when the catalog has no match.
    pub title_transforms: Vec<TitleTransform>,
    /// Language code for schema display strings, as mapped by the host.
    pub language: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let cache_dir = directories::ProjectDirs::from("io.achievescan", "", "achievescan")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            cache_dir,
            listing_url: DEFAULT_LISTING_URL.to_string(),
            schema_url: DEFAULT_SCHEMA_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            scan_roots: default_scan_roots(),
            title_transforms: default_title_transforms(),
            language: "english".to_string(),
        }
    }
}

/// The outcome of one resolution: counts plus the display-ready list.
///
/// Serializable so hosts can persist it; this crate never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAchievementSummary {
    pub game_name: String,
    pub has_achievements: bool,
    pub total: usize,
    pub unlocked: usize,
    pub locked: usize,
    pub progression_percent: u32,
    pub achievements: Vec<AchievementRecord>,
}

impl GameAchievementSummary {
    fn empty(game_name: &str) -> Self {
        Self {
            game_name: game_name.to_string(),
            has_achievements: false,
            total: 0,
            unlocked: 0,
            locked: 0,
            progression_percent: 0,
            achievements: Vec::new(),
        }
    }

    fn from_records(game_name: &str, achievements: Vec<AchievementRecord>) -> Self {
        let total = achievements.len();
        let unlocked = achievements
            .iter()
            .filter(|a| a.unlocked_at.is_some())
            .count();

        Self {
            game_name: game_name.to_string(),
            has_achievements: total > 0,
            total,
            unlocked,
            locked: total - unlocked,
            progression_percent: if total == 0 {
                0
            } else {
                ((unlocked * 100) as u32).div_ceil(total as u32)
            },
            achievements,
        }
    }
}

/// Resolves a game's achievement progress from local files and the remote
/// catalog service.
pub struct AchievementResolver {
    config: ResolverConfig,
    catalog: CatalogResolver,
    fetcher: Box<dyn TextFetcher>,
}

impl AchievementResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_fetcher(config, Box::new(HttpTextFetcher))
    }

    /// Construct with a custom fetcher; tests use this to avoid the network.
    pub fn with_fetcher(config: ResolverConfig, fetcher: Box<dyn TextFetcher>) -> Self {
        let catalog = CatalogResolver::new(
            config.cache_dir.clone(),
            config.listing_url.clone(),
            config.cache_ttl,
            config.title_transforms.clone(),
        );
        Self {
            config,
            catalog,
            fetcher,
        }
    }

    /// Resolve `game_name` to its achievement summary.
    ///
    /// Never fails: any stage degrading produces a summary with fewer (or
    /// zero) achievements rather than an error.
    pub fn resolve(&self, game_name: &str, api_key: &str) -> GameAchievementSummary {
        let Some(app_id) = self.catalog.resolve(self.fetcher.as_ref(), game_name) else {
            return GameAchievementSummary::empty(game_name);
        };
        tracing::debug!("resolved '{game_name}' to app {app_id}");

        let raw = scanner::scan(&self.config.scan_roots, app_id);
        tracing::debug!("found {} local unlock(s) for app {app_id}", raw.len());

        let records = match schema::fetch_schema(
            self.fetcher.as_ref(),
            &self.config.schema_url,
            app_id,
            &self.config.language,
            api_key,
        ) {
            Ok(schema) => schema::reconcile(&schema, &raw),
            Err(e) => {
                tracing::warn!("achievement schema unavailable for app {app_id}: {e}");
                Vec::new()
            }
        };

        GameAchievementSummary::from_records(game_name, records)
    }
}
