use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    aggregate::aggregator::AggregationMode,
    foundation::error::IcebergResult,
    foundation::math::Fnv1a64,
    session::pipeline::{IcebergOutput, RenderRequest},
};

/// Normalized identity of a render: every input that changes the output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderKey {
    playlist: String,
    thresholds: Vec<u8>,
    max_albums: usize,
    mode: AggregationMode,
    // f64 bit patterns, so the key stays `Eq + Hash`
    anchors: Vec<[u64; 2]>,
    layout: [u64; 4],
    base_canvas: PathBuf,
}

impl RenderKey {
    /// Key for `req`.
    pub fn from_request(req: &RenderRequest) -> Self {
        let p = &req.params;
        Self {
            playlist: req.source.as_str().to_string(),
            thresholds: req.table.values().to_vec(),
            max_albums: req.max_albums,
            mode: req.mode,
            anchors: req
                .anchors
                .points()
                .iter()
                .map(|pt| [norm_bits(pt.x), norm_bits(pt.y)])
                .collect(),
            layout: [
                norm_bits(p.standard_size),
                norm_bits(p.half_size),
                norm_bits(p.x_increment),
                norm_bits(p.gap),
            ],
            base_canvas: req.base_canvas.clone(),
        }
    }

    /// Stable 64-bit fingerprint, for logging.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_str(&self.playlist);
        h.write_bytes(&self.thresholds);
        h.write_u64(self.max_albums as u64);
        h.write_str(self.mode.as_str());
        h.write_u64(self.anchors.len() as u64);
        for [x, y] in &self.anchors {
            h.write_u64(*x);
            h.write_u64(*y);
        }
        for v in self.layout {
            h.write_u64(v);
        }
        h.write_str(&self.base_canvas.to_string_lossy());
        h.finish()
    }
}

// -0.0 and 0.0 must produce the same key
fn norm_bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

/// Renders kept by [`RenderCache::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// In-process memo of finished renders, bounded by entry count.
///
/// When full, inserting evicts the oldest entry.
#[derive(Debug)]
pub struct RenderCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<RenderKey, Arc<IcebergOutput>>,
    // insertion order, oldest first
    order: VecDeque<RenderKey>,
}

impl Entries {
    fn insert(&mut self, key: RenderKey, output: Arc<IcebergOutput>, capacity: usize) {
        if self.map.insert(key.clone(), output).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.map.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
            tracing::debug!(fingerprint = oldest.fingerprint(), "render cache eviction");
        }
    }

    fn remove(&mut self, key: &RenderKey) -> bool {
        let existed = self.map.remove(key).is_some();
        if existed {
            self.order.retain(|k| k != key);
        }
        existed
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl RenderCache {
    /// Empty cache holding up to [`DEFAULT_CACHE_CAPACITY`] renders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache holding up to `capacity` renders (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Most renders kept at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cached output for `key`.
    pub fn get(&self, key: &RenderKey) -> Option<Arc<IcebergOutput>> {
        self.lock().map.get(key).cloned()
    }

    /// Store `output` under `key`, replacing any previous entry.
    pub fn insert(&self, key: RenderKey, output: Arc<IcebergOutput>) {
        self.lock().insert(key, output, self.capacity);
    }

    /// Return the cached output for `key`, or compute, store and return it.
    ///
    /// The lock is not held while `compute` runs; failures are not cached.
    pub fn get_or_try_insert_with(
        &self,
        key: RenderKey,
        compute: impl FnOnce() -> IcebergResult<IcebergOutput>,
    ) -> IcebergResult<Arc<IcebergOutput>> {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(fingerprint = key.fingerprint(), "render cache hit");
            return Ok(hit);
        }
        let output = Arc::new(compute()?);
        let mut entries = self.lock();
        if let Some(existing) = entries.map.get(&key) {
            return Ok(Arc::clone(existing));
        }
        entries.insert(key, Arc::clone(&output), self.capacity);
        Ok(output)
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &RenderKey) -> bool {
        self.lock().remove(key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.map.clear();
        entries.order.clear();
    }

    /// Number of cached renders.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/cache.rs"]
mod tests;
