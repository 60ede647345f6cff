use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    aggregate::aggregator::AggregationMode,
    catalog::retry::RetryPolicy,
    catalog::source::DEFAULT_CATALOG_HOSTS,
    foundation::core::Point,
    foundation::error::{IcebergError, IcebergResult},
    layout::solver::{LayoutParams, TierAnchors},
    tiering::table::{TierThresholdTable, overrides_from_json},
};

/// Default album cap per render.
pub const DEFAULT_MAX_ALBUMS: usize = 100;
/// Default background canvas file.
pub const DEFAULT_BASE_CANVAS: &str = "iceberg_base.png";
/// Default per-cover fetch timeout, in seconds.
pub const DEFAULT_COVER_TIMEOUT_SECS: u64 = 10;

/// Render settings, loadable from JSON. Every field has a default.
///
/// Credentials are never part of the config; they come from the environment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IcebergConfig {
    /// Full threshold table in tier order (tier 1 first); replaces the 8-tier default and
    /// fixes the number of tiers.
    pub tiers: Option<Vec<i64>>,
    /// Threshold edits applied on top of the table, keyed by tier number (`{"1": 70}`).
    pub thresholds: serde_json::Map<String, serde_json::Value>,
    /// Most distinct albums admitted per render.
    pub max_albums: usize,
    /// How per-track samples combine.
    pub aggregation: AggregationMode,
    /// Explicit `[x, y]` anchor per tier; defaults are used when absent.
    pub anchors: Option<Vec<[f64; 2]>>,
    /// Slot sizes and spacing.
    pub layout: LayoutParams,
    /// Background image every render starts from.
    pub base_canvas: PathBuf,
    /// Directory for covers referenced by relative path.
    pub cover_root: Option<PathBuf>,
    /// Hosts accepted in playlist links.
    pub catalog_hosts: Vec<String>,
    /// Retry budget for catalog calls.
    pub retry: RetryPolicy,
    /// Per-cover fetch timeout.
    pub cover_timeout_secs: u64,
}

impl Default for IcebergConfig {
    fn default() -> Self {
        Self {
            tiers: None,
            thresholds: serde_json::Map::new(),
            max_albums: DEFAULT_MAX_ALBUMS,
            aggregation: AggregationMode::default(),
            anchors: None,
            layout: LayoutParams::default(),
            base_canvas: PathBuf::from(DEFAULT_BASE_CANVAS),
            cover_root: None,
            catalog_hosts: DEFAULT_CATALOG_HOSTS.iter().map(|h| h.to_string()).collect(),
            retry: RetryPolicy::default(),
            cover_timeout_secs: DEFAULT_COVER_TIMEOUT_SECS,
        }
    }
}

impl IcebergConfig {
    /// Parse a config from JSON.
    pub fn from_reader<R: Read>(reader: R) -> IcebergResult<Self> {
        serde_json::from_reader(reader).map_err(|e| IcebergError::serde(format!("config: {e}")))
    }

    /// Load a config file.
    pub fn from_path(path: &Path) -> IcebergResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            IcebergError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// The configured table (or the default) with this config's edits applied.
    pub fn threshold_table(&self) -> IcebergResult<TierThresholdTable> {
        let base = match &self.tiers {
            Some(values) => TierThresholdTable::new(values)?,
            None => TierThresholdTable::default(),
        };
        let overrides = overrides_from_json(&self.thresholds)?;
        base.with_overrides(&overrides)
    }

    /// Anchors for every tier of `table`.
    pub fn tier_anchors(&self, table: &TierThresholdTable) -> IcebergResult<TierAnchors> {
        let anchors = match &self.anchors {
            Some(points) => TierAnchors::new(points.iter().map(|&[x, y]| Point::new(x, y)).collect())?,
            None => TierAnchors::default_for(table.len()),
        };
        anchors.ensure_covers(table)?;
        Ok(anchors)
    }

    /// Validated retry policy.
    pub fn retry_policy(&self) -> IcebergResult<RetryPolicy> {
        self.retry.validate()?;
        Ok(self.retry.clone())
    }

    /// Per-cover fetch timeout.
    pub fn cover_timeout(&self) -> Duration {
        Duration::from_secs(self.cover_timeout_secs)
    }

    /// Check the fields no typed constructor covers.
    pub fn validate(&self) -> IcebergResult<()> {
        if self.max_albums == 0 {
            return Err(IcebergError::validation("max_albums must be > 0"));
        }
        if self.catalog_hosts.is_empty() {
            return Err(IcebergError::validation(
                "catalog_hosts must list at least one host",
            ));
        }
        if self.cover_timeout_secs == 0 {
            return Err(IcebergError::validation("cover_timeout_secs must be > 0"));
        }
        self.layout.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
