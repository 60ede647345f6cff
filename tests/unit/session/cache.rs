use std::cell::Cell;

use super::*;
use crate::{
    foundation::error::IcebergError,
    render::raster::RasterImage,
    session::config::IcebergConfig,
    session::pipeline::RenderStats,
};

fn key(url: &str) -> RenderKey {
    RenderKey::from_request(&RenderRequest::new(url, &IcebergConfig::default()).unwrap())
}

fn output() -> IcebergOutput {
    IcebergOutput {
        image: RasterImage::new(1, 1),
        table: vec![],
        stats: RenderStats::default(),
    }
}

#[test]
fn compute_runs_once_per_key() {
    let cache = RenderCache::new();
    let calls = Cell::new(0);
    let k = key("https://open.spotify.com/playlist/a1");

    for _ in 0..3 {
        cache
            .get_or_try_insert_with(k.clone(), || {
                calls.set(calls.get() + 1);
                Ok(output())
            })
            .unwrap();
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.len(), 1);

    cache
        .get_or_try_insert_with(key("https://open.spotify.com/playlist/b2"), || {
            calls.set(calls.get() + 1);
            Ok(output())
        })
        .unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn failures_are_not_cached() {
    let cache = RenderCache::new();
    let k = key("https://open.spotify.com/playlist/a1");
    let err = cache
        .get_or_try_insert_with(k.clone(), || Err(IcebergError::transient("down")))
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(cache.is_empty());
    assert!(cache.get(&k).is_none());
}

#[test]
fn invalidate_and_clear() {
    let cache = RenderCache::new();
    let k = key("https://open.spotify.com/playlist/a1");
    cache.insert(k.clone(), Arc::new(output()));
    assert!(cache.get(&k).is_some());
    assert!(cache.invalidate(&k));
    assert!(!cache.invalidate(&k));

    cache.insert(k.clone(), Arc::new(output()));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn signed_zero_normalizes() {
    assert_eq!(norm_bits(0.0), norm_bits(-0.0));
    assert_ne!(norm_bits(1.0), norm_bits(-1.0));
}

#[test]
fn full_cache_evicts_oldest_entry() {
    let cache = RenderCache::with_capacity(2);
    assert_eq!(cache.capacity(), 2);
    let a = key("https://open.spotify.com/playlist/a1");
    let b = key("https://open.spotify.com/playlist/b2");
    let c = key("https://open.spotify.com/playlist/c3");

    cache.insert(a.clone(), Arc::new(output()));
    cache.insert(b.clone(), Arc::new(output()));
    // replacing an existing key does not count as a new entry
    cache.insert(a.clone(), Arc::new(output()));
    assert_eq!(cache.len(), 2);

    cache
        .get_or_try_insert_with(c.clone(), || Ok(output()))
        .unwrap();
    assert_eq!(cache.len(), 2);
    assert!(cache.get(&a).is_none());
    assert!(cache.get(&b).is_some());
    assert!(cache.get(&c).is_some());

    assert!(cache.invalidate(&b));
    cache.insert(a.clone(), Arc::new(output()));
    assert_eq!(cache.len(), 2);
    assert!(cache.get(&c).is_some());
}

#[test]
fn capacity_is_at_least_one() {
    assert_eq!(RenderCache::with_capacity(0).capacity(), 1);
    assert_eq!(RenderCache::new().capacity(), DEFAULT_CACHE_CAPACITY);
}
