pub use kurbo::{Point, Rect, Size};

/// 1-based tier number; tier 1 is the most popular band.
pub type Tier = u32;

/// Lowest valid popularity score.
pub const POPULARITY_MIN: f64 = 0.0;
/// Highest valid popularity score.
pub const POPULARITY_MAX: f64 = 100.0;

/// Clamp a raw popularity value into `[0, 100]`.
///
/// Returns `None` for NaN or infinite input, which carries no usable score.
pub fn clamp_popularity(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some(value.clamp(POPULARITY_MIN, POPULARITY_MAX))
}

/// Integer pixel origin of a rectangle, rounded to the nearest pixel.
pub fn pixel_origin(rect: Rect) -> (i64, i64) {
    (rect.x0.round() as i64, rect.y0.round() as i64)
}

/// Integer pixel size of a rectangle, at least one pixel per side.
pub fn pixel_size(rect: Rect) -> (u32, u32) {
    let w = rect.width().round().max(1.0) as u32;
    let h = rect.height().round().max(1.0) as u32;
    (w, h)
}
