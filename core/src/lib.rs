//! Achievement resolution for games installed outside the Steam client
//!
//! DRM-free and repack installs never talk to the Steam client, but the
//! distribution tools they ship with still write unlock state to local
//! files. This crate resolves that state into a display-ready achievement
//! list in three stages:
//!
//! 1. Title → numeric app ID against the cached full catalog listing
//!    ([`catalog`]).
//! 2. Local achievement-file discovery and parsing across the two known
//!    on-disk formats ([`scanner`]).
//! 3. Reconciliation with the remote achievement schema, which contributes
//!    every display field ([`schema`]).
//!
//! [`AchievementResolver`] orchestrates the stages and always returns a
//! [`GameAchievementSummary`]; failures degrade to empty results with a log
//! line instead of propagating. Host applications own the `tracing`
//! subscriber and any persistence of the summary.

pub mod catalog;
pub mod fetch;
pub mod norm;
pub mod resolver;
pub mod scanner;
pub mod schema;

pub use catalog::{CatalogEntry, CatalogResolver};
pub use fetch::{FetchError, HttpTextFetcher, TextFetcher};
pub use norm::{TitleTransform, normalize_game_name};
pub use resolver::{AchievementResolver, GameAchievementSummary, ResolverConfig};
pub use scanner::{AchievementFormat, RawUnlock, ScanRoot, default_scan_roots};
pub use schema::AchievementRecord;
