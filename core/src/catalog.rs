//! Title-to-app-ID resolution against the remote catalog listing
//!
//! The full app list is large and changes slowly, so it is cached on disk
//! and refreshed synchronously when the cache is older than the TTL. A
//! failed or empty refresh never touches the cache file and degrades to an
//! empty in-memory catalog; resolution failures surface as `None`, never as
//! errors.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fetch::TextFetcher;
use crate::norm::{TitleTransform, normalize_game_name};

/// Steam full app list endpoint.
pub const DEFAULT_LISTING_URL: &str = "https://api.steampowered.com/ISteamApps/GetAppList/v2/";

/// The listing barely changes day to day; three days keeps refresh traffic low.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

const CACHE_FILE_NAME: &str = "SteamListApp.json";

/// One entry of the remote catalog listing, verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "appid")]
    pub app_id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AppListResponse {
    applist: AppList,
}

#[derive(Debug, Deserialize)]
struct AppList {
    apps: Vec<CatalogEntry>,
}

/// Resolves game titles to numeric app IDs using the cached catalog listing.
pub struct CatalogResolver {
    cache_dir: PathBuf,
    listing_url: String,
    ttl: Duration,
    transforms: Vec<TitleTransform>,
}

impl CatalogResolver {
    pub fn new(
        cache_dir: PathBuf,
        listing_url: String,
        ttl: Duration,
        transforms: Vec<TitleTransform>,
    ) -> Self {
        Self {
            cache_dir,
            listing_url,
            ttl,
            transforms,
        }
    }

    /// Resolve a title to its app ID. `None` means "not found", whether
    /// because the catalog has no matching entry or because the catalog
    /// itself was unavailable.
    pub fn resolve(&self, fetcher: &dyn TextFetcher, title: &str) -> Option<u32> {
        let catalog = self.load_catalog(fetcher);
        if catalog.is_empty() {
            tracing::warn!("catalog is empty, cannot resolve '{title}'");
            return None;
        }

        if let Some(id) = find_in_catalog(&catalog, title) {
            return Some(id);
        }

        // Bounded fallback: retry with each configured title mutation.
        for transform in &self.transforms {
            let mutated = transform.apply(title);
            if let Some(id) = find_in_catalog(&catalog, &mutated) {
                tracing::info!("resolved '{title}' via fallback {transform:?}");
                return Some(id);
            }
        }

        tracing::warn!("no app ID found for '{title}'");
        None
    }

    /// Load the catalog from the cache file if fresh, refreshing it from the
    /// listing endpoint otherwise. Returns an empty list on any failure.
    fn load_catalog(&self, fetcher: &dyn TextFetcher) -> Vec<CatalogEntry> {
        if let Err(e) = fs::create_dir_all(&self.cache_dir) {
            tracing::warn!("cannot create cache directory: {e}");
            return Vec::new();
        }

        let cache_path = self.cache_dir.join(CACHE_FILE_NAME);
        if cache_is_fresh(&cache_path, self.ttl)
            && let Some(apps) = read_cached_catalog(&cache_path)
        {
            tracing::debug!("loaded catalog from cache ({} entries)", apps.len());
            return apps;
        }

        self.refresh_catalog(fetcher, &cache_path)
    }

    /// Fetch the catalog listing and replace the cache file. Empty or
    /// malformed payloads leave the cache untouched.
    fn refresh_catalog(&self, fetcher: &dyn TextFetcher, cache_path: &Path) -> Vec<CatalogEntry> {
        let body = match fetcher.fetch_text(&self.listing_url) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("catalog fetch failed: {e}");
                return Vec::new();
            }
        };

        let apps = match serde_json::from_str::<AppListResponse>(&body) {
            Ok(response) => response.applist.apps,
            Err(e) => {
                tracing::warn!("catalog payload malformed: {e}");
                return Vec::new();
            }
        };

        if apps.is_empty() {
            tracing::warn!("catalog listing returned no entries");
            return Vec::new();
        }

        if let Err(e) = write_atomically(cache_path, body.as_bytes()) {
            tracing::warn!("failed to write catalog cache: {e:#}");
        } else {
            tracing::info!("refreshed catalog cache ({} entries)", apps.len());
        }

        apps
    }
}

fn find_in_catalog(catalog: &[CatalogEntry], title: &str) -> Option<u32> {
    let wanted = normalize_game_name(title);
    catalog
        .iter()
        .find(|entry| normalize_game_name(&entry.name) == wanted)
        .map(|entry| entry.app_id)
}

fn cache_is_fresh(path: &Path, ttl: Duration) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    match modified.elapsed() {
        Ok(age) => age < ttl,
        // Modified in the future; treat as fresh.
        Err(_) => true,
    }
}

fn read_cached_catalog(path: &Path) -> Option<Vec<CatalogEntry>> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<AppListResponse>(&content) {
        Ok(response) => Some(response.applist.apps),
        Err(e) => {
            tracing::warn!("cached catalog is malformed, refetching: {e}");
            None
        }
    }
}

/// Write via a temp file and rename so concurrent refreshes can only race to
/// a complete file, never a partial one.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = match path.file_name() {
        Some(name) => {
            let mut tmp_name = OsString::from(name);
            tmp_name.push(".tmp");
            path.with_file_name(tmp_name)
        }
        None => anyhow::bail!("cache path has no file name"),
    };

    {
        let mut f = fs::File::create(&tmp_path)
            .with_context(|| format!("create {}", tmp_path.display()))?;
        f.write_all(bytes).context("write cache contents")?;
        f.sync_all().context("sync cache contents")?;
    }

    #[cfg(windows)]
    {
        if path.exists() {
            // Windows rename fails if destination exists.
            fs::remove_file(path).context("remove previous cache file")?;
        }
    }

    fs::rename(&tmp_path, path).context("replace cache file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_support::{FailingFetcher, StaticFetcher};
    use crate::norm::default_title_transforms;
    use tempfile::TempDir;

    fn listing_json(entries: &[(u32, &str)]) -> String {
        let apps: Vec<String> = entries
            .iter()
            .map(|(id, name)| format!(r#"{{"appid":{id},"name":"{name}"}}"#))
            .collect();
        format!(r#"{{"applist":{{"apps":[{}]}}}}"#, apps.join(","))
    }

    fn resolver(dir: &TempDir, ttl: Duration) -> CatalogResolver {
        CatalogResolver::new(
            dir.path().to_path_buf(),
            DEFAULT_LISTING_URL.to_string(),
            ttl,
            default_title_transforms(),
        )
    }

    #[test]
    fn resolves_single_matching_entry() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            "GetAppList",
            &listing_json(&[(400, "Portal"), (620, "Portal 2")]),
        );

        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Portal 2"), Some(620));
    }

    #[test]
    fn resolution_is_normalization_insensitive() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            "GetAppList",
            &listing_json(&[(292030, "The Witcher\u{00ae} 3: Wild Hunt")]),
        );

        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(
            resolver.resolve(&fetcher, "the witcher 3 wild hunt"),
            Some(292030)
        );
    }

    #[test]
    fn unknown_title_returns_none() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with("GetAppList", &listing_json(&[(400, "Portal")]));

        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Not A Real Game"), None);
    }

    #[test]
    fn empty_catalog_returns_none() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with("GetAppList", &listing_json(&[]));

        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Portal"), None);
    }

    #[test]
    fn fetch_failure_degrades_to_none() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&FailingFetcher, "Portal"), None);
    }

    #[test]
    fn malformed_payload_degrades_to_none() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with("GetAppList", "not json at all {{{");

        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Portal"), None);
    }

    #[test]
    fn successful_fetch_writes_cache_file() {
        let dir = TempDir::new().unwrap();
        let body = listing_json(&[(400, "Portal")]);
        let fetcher = StaticFetcher::new().with("GetAppList", &body);

        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        resolver.resolve(&fetcher, "Portal");

        let cached = fs::read_to_string(dir.path().join(CACHE_FILE_NAME)).unwrap();
        assert_eq!(cached, body);
        // No leftover temp file from the atomic replace.
        assert!(!dir.path().join(format!("{CACHE_FILE_NAME}.tmp")).exists());
    }

    #[test]
    fn empty_payload_does_not_touch_cache() {
        let dir = TempDir::new().unwrap();
        let good = listing_json(&[(400, "Portal")]);
        fs::write(dir.path().join(CACHE_FILE_NAME), &good).unwrap();

        // Expired TTL forces a refresh, which returns an empty listing.
        let fetcher = StaticFetcher::new().with("GetAppList", &listing_json(&[]));
        let resolver = resolver(&dir, Duration::ZERO);
        assert_eq!(resolver.resolve(&fetcher, "Portal"), None);

        // The previous cache contents survived the failed refresh.
        let cached = fs::read_to_string(dir.path().join(CACHE_FILE_NAME)).unwrap();
        assert_eq!(cached, good);
    }

    #[test]
    fn fresh_cache_is_used_without_fetching() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CACHE_FILE_NAME),
            listing_json(&[(400, "Portal")]),
        )
        .unwrap();

        // Any fetch attempt would fail; the fresh cache must satisfy the call.
        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&FailingFetcher, "Portal"), Some(400));
    }

    #[test]
    fn expired_cache_is_refreshed() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CACHE_FILE_NAME),
            listing_json(&[(1, "Old Entry")]),
        )
        .unwrap();

        let fetcher = StaticFetcher::new().with("GetAppList", &listing_json(&[(2, "New Entry")]));
        let resolver = resolver(&dir, Duration::ZERO);

        assert_eq!(resolver.resolve(&fetcher, "New Entry"), Some(2));
        assert_eq!(resolver.resolve(&fetcher, "Old Entry"), None);
    }

    #[test]
    fn malformed_cache_falls_back_to_fetch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CACHE_FILE_NAME), "garbage").unwrap();

        let fetcher = StaticFetcher::new().with("GetAppList", &listing_json(&[(400, "Portal")]));
        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Portal"), Some(400));
    }

    #[test]
    fn fallback_transforms_terminate_on_unresolvable_title() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with("GetAppList", &listing_json(&[(400, "Portal")]));

        // Every configured transform is tried once; the call still returns.
        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Game: That Does Not Exist"), None);
    }

    #[test]
    fn first_match_wins_on_duplicate_normalized_names() {
        let dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            "GetAppList",
            &listing_json(&[(10, "Half_Life"), (20, "Half.Life")]),
        );

        // Both entries normalize to "halflife"; the earlier one wins.
        let resolver = resolver(&dir, DEFAULT_CACHE_TTL);
        assert_eq!(resolver.resolve(&fetcher, "Half-Life"), Some(10));
    }
}
