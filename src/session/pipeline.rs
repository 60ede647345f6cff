use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    aggregate::aggregator::{AggregationMode, aggregate},
    assets::covers::CoverSource,
    catalog::client::CatalogClient,
    catalog::fetch::collect_samples,
    catalog::retry::RetryPolicy,
    catalog::source::SourceId,
    foundation::error::{IcebergError, IcebergResult},
    layout::solver::{LayoutParams, TierAnchors, layout},
    render::draw::draw_slots,
    render::raster::{RasterBackend, RasterImage},
    report::table::{AlbumRow, album_table},
    session::cache::{RenderCache, RenderKey},
    session::config::IcebergConfig,
    tiering::classify::assign_tiers,
    tiering::groups::group_by_tier,
    tiering::table::TierThresholdTable,
};

/// Fully validated inputs for one render.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Playlist to render.
    pub source: SourceId,
    /// Tier thresholds.
    pub table: TierThresholdTable,
    /// Most distinct albums admitted.
    pub max_albums: usize,
    /// How samples combine.
    pub mode: AggregationMode,
    /// Anchor per tier, covering every tier of `table`.
    pub anchors: TierAnchors,
    /// Slot sizes and spacing.
    pub params: LayoutParams,
    /// Background image.
    pub base_canvas: PathBuf,
    /// Retry budget for catalog calls.
    pub retry: RetryPolicy,
}

impl RenderRequest {
    /// Validate `source` and `config` into a request. Nothing touches the network here.
    pub fn new(source: &str, config: &IcebergConfig) -> IcebergResult<Self> {
        config.validate()?;
        let source = SourceId::parse(source, &config.catalog_hosts)?;
        let table = config.threshold_table()?;
        let anchors = config.tier_anchors(&table)?;
        Ok(Self {
            source,
            table,
            max_albums: config.max_albums,
            mode: config.aggregation,
            anchors,
            params: config.layout,
            base_canvas: config.base_canvas.clone(),
            retry: config.retry_policy()?,
        })
    }
}

/// Counts describing one render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Samples returned by the catalog.
    pub samples: usize,
    /// Distinct albums after aggregation.
    pub albums: usize,
    /// Tiers holding at least one album.
    pub tiers_used: usize,
    /// Slots produced by layout.
    pub slots: usize,
    /// Covers composited.
    pub covers_drawn: usize,
    /// Covers skipped after a fetch or decode failure.
    pub covers_failed: usize,
}

/// Result of a render.
#[derive(Clone, Debug)]
pub struct IcebergOutput {
    /// Composited chart.
    pub image: RasterImage,
    /// Companion album table, most popular first.
    pub table: Vec<AlbumRow>,
    /// Counts.
    pub stats: RenderStats,
}

/// Runs renders against a catalog, a cover source and a raster backend, memoizing results.
pub struct IcebergPipeline<'a> {
    catalog: &'a dyn CatalogClient,
    covers: &'a dyn CoverSource,
    raster: &'a dyn RasterBackend,
    cache: RenderCache,
}

impl<'a> IcebergPipeline<'a> {
    /// Pipeline with an empty cache.
    pub fn new(
        catalog: &'a dyn CatalogClient,
        covers: &'a dyn CoverSource,
        raster: &'a dyn RasterBackend,
    ) -> Self {
        Self {
            catalog,
            covers,
            raster,
            cache: RenderCache::new(),
        }
    }

    /// Replace the cache, e.g. with one of a different capacity.
    pub fn with_cache(mut self, cache: RenderCache) -> Self {
        self.cache = cache;
        self
    }

    /// Memoized renders.
    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Validate `source` against `config`, then render.
    pub fn render_source(
        &self,
        source: &str,
        config: &IcebergConfig,
    ) -> IcebergResult<Arc<IcebergOutput>> {
        let req = RenderRequest::new(source, config)?;
        self.render(&req)
    }

    /// Render `req`, reusing a cached result for identical inputs.
    pub fn render(&self, req: &RenderRequest) -> IcebergResult<Arc<IcebergOutput>> {
        let key = RenderKey::from_request(req);
        self.cache
            .get_or_try_insert_with(key, || self.render_uncached(req))
    }

    #[tracing::instrument(skip_all, fields(playlist = %req.source, mode = req.mode.as_str()))]
    fn render_uncached(&self, req: &RenderRequest) -> IcebergResult<IcebergOutput> {
        let mut canvas = self.raster.load_base_canvas(&req.base_canvas)?;

        let samples = collect_samples(
            self.catalog,
            &req.source,
            req.mode,
            req.max_albums,
            &req.retry,
        )?;
        let sample_count = samples.len();

        let mut albums = aggregate(samples, req.max_albums, req.mode)?;
        if albums.is_empty() {
            return Err(IcebergError::empty_result(format!(
                "playlist {} yielded no albums with a popularity score",
                req.source
            )));
        }
        assign_tiers(&mut albums, &req.table)?;

        let (stats, table) = {
            let groups = group_by_tier(&albums)?;
            let slots = layout(&groups, &req.anchors, &req.params)?;
            let drawn = draw_slots(&mut canvas, &slots, self.covers, self.raster);
            let stats = RenderStats {
                samples: sample_count,
                albums: albums.len(),
                tiers_used: groups.iter().filter(|(_, g)| !g.is_empty()).count(),
                slots: slots.len(),
                covers_drawn: drawn.drawn,
                covers_failed: drawn.failed,
            };
            (stats, album_table(&albums))
        };

        tracing::info!(
            albums = stats.albums,
            slots = stats.slots,
            covers_failed = stats.covers_failed,
            "iceberg rendered"
        );

        Ok(IcebergOutput {
            image: canvas,
            table,
            stats,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
