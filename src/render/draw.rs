use std::collections::HashMap;

use crate::{
    assets::covers::CoverSource,
    foundation::error::{IcebergError, IcebergResult},
    layout::solver::LayoutSlot,
    render::raster::{RasterBackend, RasterImage},
};

/// Outcome counts for one drawing pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DrawStats {
    /// Slots handed to the drawer.
    pub slots: usize,
    /// Slots whose cover was composited.
    pub drawn: usize,
    /// Slots skipped because their cover could not be fetched, decoded or resized.
    pub failed: usize,
}

/// Composite every slot's cover onto `canvas`.
///
/// A failing cover is logged and its slot left empty; it never aborts the pass. Covers shared by
/// several slots are fetched and decoded once.
#[tracing::instrument(skip_all, fields(slots = slots.len()))]
pub fn draw_slots(
    canvas: &mut RasterImage,
    slots: &[LayoutSlot<'_>],
    covers: &dyn CoverSource,
    raster: &dyn RasterBackend,
) -> DrawStats {
    let mut stats = DrawStats {
        slots: slots.len(),
        ..DrawStats::default()
    };
    let mut decoded: HashMap<&str, Result<RasterImage, String>> = HashMap::new();

    for slot in slots {
        let Some(image_ref) = slot.album.image_ref.as_deref() else {
            continue;
        };

        let source = decoded.entry(image_ref).or_insert_with(|| {
            covers
                .fetch(image_ref)
                .and_then(|bytes| raster.load_image(&bytes))
                .map_err(|e| e.to_string())
        });

        let result = match source {
            Ok(img) => place(canvas, slot, img, raster),
            Err(msg) => Err(IcebergError::image(msg.clone())),
        };

        match result {
            Ok(()) => stats.drawn += 1,
            Err(err) => {
                stats.failed += 1;
                tracing::warn!(
                    album = %slot.album.key,
                    tier = slot.tier,
                    index = slot.index,
                    error = %err,
                    "skipping album cover"
                );
            }
        }
    }

    tracing::debug!(drawn = stats.drawn, failed = stats.failed, "slots drawn");
    stats
}

fn place(
    canvas: &mut RasterImage,
    slot: &LayoutSlot<'_>,
    cover: &RasterImage,
    raster: &dyn RasterBackend,
) -> IcebergResult<()> {
    let (w, h) = slot.size_px();
    let (x, y) = slot.origin_px();
    let sized = raster.resize(cover, w, h)?;
    raster.composite_at(canvas, &sized, x, y);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
