//! playlist-iceberg renders an "iceberg" chart of a playlist's albums.
//!
//! Album covers are grouped into popularity tiers and composited onto a fixed background image,
//! the most popular albums at the tip and the obscure ones at the bottom.
//!
//! # Pipeline overview
//!
//! 1. **Fetch**: `SourceId -> Vec<AlbumSample>` through a [`CatalogClient`] (Spotify or snapshot)
//! 2. **Aggregate**: `samples -> AlbumSet` (dedupe by album identity, mean or direct score, cap)
//! 3. **Classify**: `AlbumSet + TierThresholdTable -> tiers` (first tier whose bound is met)
//! 4. **Layout**: `TierGroups + TierAnchors -> Vec<LayoutSlot>` (3 large + 8 small slots per tier)
//! 5. **Draw**: covers fetched through a [`CoverSource`] and composited by a [`RasterBackend`]
//!
//! Every step before drawing is pure and deterministic for a given input. A single cover that
//! fails to load leaves its slot empty; every other failure aborts the render with a typed
//! [`IcebergError`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod assets;
mod catalog;
mod foundation;
mod layout;
mod render;
mod report;
mod session;
mod tiering;

pub use aggregate::aggregator::{
    AggregationMode, AlbumKey, AlbumRecord, AlbumSample, AlbumSet, aggregate,
};
pub use assets::covers::{
    CoverSource, DEFAULT_COVER_TIMEOUT, FsCoverSource, HttpCoverSource, RoutedCoverSource,
    normalize_rel_path,
};
pub use assets::decode::decode_image;
pub use catalog::client::{ALBUM_BATCH_LIMIT, AlbumMeta, CatalogClient, TrackItem, TracksPage};
pub use catalog::fetch::{collect_samples, list_all_tracks};
pub use catalog::offline::SnapshotCatalog;
pub use catalog::retry::RetryPolicy;
pub use catalog::source::{DEFAULT_CATALOG_HOSTS, SourceId};
pub use catalog::spotify::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, SpotifyClient, SpotifyCredentials, map_status,
};
pub use foundation::core::{POPULARITY_MAX, POPULARITY_MIN, Point, Rect, Size, Tier};
pub use foundation::error::{IcebergError, IcebergResult};
pub use layout::solver::{
    LayoutParams, LayoutSlot, MAX_COORDINATE, MAX_SLOT_SIZE, MAX_VISIBLE_PER_TIER, TierAnchors,
    layout, slot_rect,
};
pub use render::draw::{DrawStats, draw_slots};
pub use render::raster::{CpuRaster, RasterBackend, RasterImage};
pub use report::table::{AlbumRow, album_table, format_table};
pub use session::cache::{DEFAULT_CACHE_CAPACITY, RenderCache, RenderKey};
pub use session::config::{
    DEFAULT_BASE_CANVAS, DEFAULT_COVER_TIMEOUT_SECS, DEFAULT_MAX_ALBUMS, IcebergConfig,
};
pub use session::pipeline::{IcebergOutput, IcebergPipeline, RenderRequest, RenderStats};
pub use tiering::classify::{assign_tiers, classify};
pub use tiering::groups::{TierGroups, group_by_tier};
pub use tiering::table::{
    DEFAULT_THRESHOLDS, TierThresholdTable, overrides_from_json, parse_overrides, parse_table,
    validate_thresholds,
};
