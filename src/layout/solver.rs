use crate::{
    aggregate::aggregator::AlbumRecord,
    foundation::core::{Point, Rect, Tier, pixel_origin, pixel_size},
    foundation::error::{IcebergError, IcebergResult},
    tiering::groups::TierGroups,
    tiering::table::TierThresholdTable,
};

/// Most albums placed per tier. Not user-configurable.
pub const MAX_VISIBLE_PER_TIER: usize = 11;

/// Tiers with at most this many visible albums use a single row of standard slots.
const SPARSE_TIER_MAX: usize = 5;
/// Standard slots in a dense tier before switching to half-size blocks.
const DENSE_STANDARD_SLOTS: usize = 3;
/// Albums per 2x2 half-size block.
const BLOCK_SLOTS: usize = 4;

const DEFAULT_ANCHORS: [(f64, f64); 8] = [
    (30.0, 50.0),
    (30.0, 300.0),
    (30.0, 600.0),
    (30.0, 900.0),
    (30.0, 1200.0),
    (30.0, 1450.0),
    (30.0, 1750.0),
    (30.0, 2000.0),
];
const EXTRA_TIER_STEP_Y: f64 = 300.0;

/// Largest absolute anchor coordinate or spacing accepted, in canvas pixels.
pub const MAX_COORDINATE: f64 = 1_000_000.0;
/// Largest slot side accepted, in canvas pixels.
pub const MAX_SLOT_SIZE: f64 = 4096.0;

/// Slot sizes and spacing, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutParams {
    /// Side of a standard (large) square slot.
    pub standard_size: f64,
    /// Side of a half-size square slot.
    pub half_size: f64,
    /// Horizontal step between consecutive standard slots.
    pub x_increment: f64,
    /// Gap between half-size slots in a 2x2 block.
    pub gap: f64,
}

impl LayoutParams {
    /// Fail unless every size is finite and within pixel bounds.
    pub fn validate(&self) -> IcebergResult<()> {
        let sides = [("standard_size", self.standard_size), ("half_size", self.half_size)];
        for (name, v) in sides {
            if !(1.0..=MAX_SLOT_SIZE).contains(&v) {
                return Err(IcebergError::validation(format!(
                    "layout {name} must be in [1, {MAX_SLOT_SIZE}], got {v}"
                )));
            }
        }
        let spacing = [("x_increment", self.x_increment), ("gap", self.gap)];
        for (name, v) in spacing {
            if !(0.0..=MAX_COORDINATE).contains(&v) {
                return Err(IcebergError::validation(format!(
                    "layout {name} must be in [0, {MAX_COORDINATE}], got {v}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            standard_size: 200.0,
            half_size: 100.0,
            x_increment: 250.0,
            gap: 10.0,
        }
    }
}

/// Per-tier anchor points; each tier's slots are placed relative to its anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct TierAnchors {
    // index 0 holds tier 1
    anchors: Vec<Point>,
}

impl TierAnchors {
    /// Build from explicit anchors listed in tier order.
    pub fn new(anchors: Vec<Point>) -> IcebergResult<Self> {
        if anchors.is_empty() {
            return Err(IcebergError::validation("at least one tier anchor is required"));
        }
        let in_range = |v: f64| v.is_finite() && v.abs() <= MAX_COORDINATE;
        if let Some(bad) = anchors.iter().position(|p| !in_range(p.x) || !in_range(p.y)) {
            return Err(IcebergError::validation(format!(
                "anchor for tier {} must be finite and within +/-{MAX_COORDINATE}",
                bad + 1
            )));
        }
        Ok(Self { anchors })
    }

    /// Default anchors for `tiers` tiers; tiers past the eighth continue downwards.
    pub fn default_for(tiers: usize) -> Self {
        let mut anchors: Vec<Point> = DEFAULT_ANCHORS
            .iter()
            .take(tiers)
            .map(|&p| Point::from(p))
            .collect();
        while anchors.len() < tiers {
            let last = anchors
                .last()
                .copied()
                .unwrap_or_else(|| Point::from(DEFAULT_ANCHORS[0]));
            anchors.push(Point::new(last.x, last.y + EXTRA_TIER_STEP_Y));
        }
        Self { anchors }
    }

    /// Anchor for `tier`, if present.
    pub fn get(&self, tier: Tier) -> Option<Point> {
        let idx = tier.checked_sub(1)? as usize;
        self.anchors.get(idx).copied()
    }

    /// Number of anchored tiers.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// `true` when no tier is anchored.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchors in tier order.
    pub fn points(&self) -> &[Point] {
        &self.anchors
    }

    /// Fail unless every tier of `table` has an anchor.
    pub fn ensure_covers(&self, table: &TierThresholdTable) -> IcebergResult<()> {
        if self.anchors.len() < table.len() {
            return Err(IcebergError::validation(format!(
                "{} tier anchors configured but the threshold table has {} tiers",
                self.anchors.len(),
                table.len()
            )));
        }
        Ok(())
    }
}

/// One album placed on the canvas.
#[derive(Clone, Debug)]
pub struct LayoutSlot<'a> {
    /// Album drawn into this slot.
    pub album: &'a AlbumRecord,
    /// Tier the slot belongs to.
    pub tier: Tier,
    /// Index in the tier's sorted sequence.
    pub index: usize,
    /// Target rectangle in canvas pixels.
    pub rect: Rect,
}

impl LayoutSlot<'_> {
    /// Rounded top-left corner in canvas pixels.
    pub fn origin_px(&self) -> (i64, i64) {
        pixel_origin(self.rect)
    }

    /// Rounded `(width, height)` in pixels.
    pub fn size_px(&self) -> (u32, u32) {
        pixel_size(self.rect)
    }
}

/// Rectangle for the album at `index` in a tier holding `count` albums.
///
/// Sparse tiers (`count <= 5`) get one row of standard slots. Dense tiers get three standard
/// slots followed by two 2x2 blocks of half-size slots placed to the right of the row. Returns
/// `None` for indices that are not placed.
pub fn slot_rect(index: usize, count: usize, anchor: Point, params: &LayoutParams) -> Option<Rect> {
    let count = count.min(MAX_VISIBLE_PER_TIER);
    if index >= count {
        return None;
    }

    if count <= SPARSE_TIER_MAX || index < DENSE_STANDARD_SLOTS {
        let x = anchor.x + index as f64 * params.x_increment;
        return Some(Rect::from_origin_size(
            (x, anchor.y),
            (params.standard_size, params.standard_size),
        ));
    }

    let rel = index - DENSE_STANDARD_SLOTS;
    let block = rel / BLOCK_SLOTS;
    let within = rel % BLOCK_SLOTS;
    let (col, row) = (within % 2, within / 2);
    let pitch = params.half_size + params.gap;

    let row_end_x = anchor.x + DENSE_STANDARD_SLOTS as f64 * params.x_increment;
    let x = row_end_x + block as f64 * params.x_increment + col as f64 * pitch;
    let y = anchor.y + row as f64 * pitch;
    Some(Rect::from_origin_size(
        (x, y),
        (params.half_size, params.half_size),
    ))
}

/// Compute slots for every tier.
///
/// Only the first [`MAX_VISIBLE_PER_TIER`] albums of a tier are placed. Albums without a cover
/// reference get no slot but still occupy their index, so positions depend only on sort order.
#[tracing::instrument(skip_all, fields(tiers = groups.len()))]
pub fn layout<'a>(
    groups: &TierGroups<'a>,
    anchors: &TierAnchors,
    params: &LayoutParams,
) -> IcebergResult<Vec<LayoutSlot<'a>>> {
    let mut slots = Vec::new();
    for (tier, albums) in groups.iter() {
        if albums.is_empty() {
            continue;
        }
        let anchor = anchors.get(tier).ok_or_else(|| {
            IcebergError::validation(format!("no anchor configured for tier {tier}"))
        })?;

        let count = albums.len().min(MAX_VISIBLE_PER_TIER);
        if albums.len() > count {
            tracing::debug!(
                tier,
                hidden = albums.len() - count,
                "tier exceeds visible slots"
            );
        }

        for (index, &album) in albums.iter().take(count).enumerate() {
            if album.image_ref.is_none() {
                continue;
            }
            let Some(rect) = slot_rect(index, count, anchor, params) else {
                continue;
            };
            slots.push(LayoutSlot {
                album,
                tier,
                index,
                rect,
            });
        }
    }
    Ok(slots)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/solver.rs"]
mod tests;
