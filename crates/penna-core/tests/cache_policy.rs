// this_file: crates/penna-core/tests/cache_policy.rs

//! Cross-cutting cache policy tests: capacity bounds, at-most-once
//! creation under contention, and sub-pixel key quantization properties.

use penna_core::outline::GlyphOutline;
use penna_core::outline_cache::{OutlineCache, OutlineCacheKey};
use penna_core::shaping_cache::{ShapingCache, ShapingCacheKey};
use penna_core::types::{Direction, Hinting, ShapedRun};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn outline(gid: u16) -> Arc<GlyphOutline> {
    Arc::new(GlyphOutline::empty(gid, 8.0))
}

fn okey(font: u64, gid: u16) -> OutlineCacheKey {
    OutlineCacheKey::new(font, gid, 16, Hinting::None)
}

#[test]
fn outline_cache_len_never_exceeds_capacity() {
    let cache = OutlineCache::new(64);
    for gid in 0..5_000u16 {
        cache.set(okey(1, gid), Some(outline(gid)));
        assert!(cache.len() <= 64, "len {} after glyph {gid}", cache.len());
    }
}

#[test]
fn shaping_cache_len_never_exceeds_capacity() {
    let cache = ShapingCache::new(64);
    for i in 0..5_000u32 {
        let key = ShapingCacheKey::new(
            &format!("text-{i}"),
            1,
            16.0,
            Direction::LeftToRight,
            &[],
        );
        cache.set(key, Arc::new(ShapedRun::empty(1, 16.0, Direction::LeftToRight)));
        assert!(cache.len() <= 64);
    }
}

#[test]
fn set_then_get_returns_value() {
    let cache = OutlineCache::new(256);
    for gid in 0..100u16 {
        let key = okey(2, gid);
        cache.set(key, Some(outline(gid)));
        let got = cache.get(&key);
        assert_eq!(got.map(|o| o.glyph_id), Some(gid));
    }
}

#[test]
fn get_or_create_runs_creator_once_across_threads() {
    let cache = Arc::new(OutlineCache::new(256));
    let calls = Arc::new(AtomicUsize::new(0));
    let key = okey(3, 42);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(std::thread::spawn(move || {
            cache.get_or_create(key, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(outline(42))
            })
        }));
    }
    for h in handles {
        assert!(h.join().ok().flatten().is_some());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn maintain_retires_untouched_entries() {
    let cache = OutlineCache::with_config(1024, 16, 3);
    cache.set(okey(1, 1), Some(outline(1)));
    cache.set(okey(1, 2), Some(outline(2)));

    for _ in 0..3 {
        cache.maintain();
        // Keep glyph 1 warm every frame.
        assert!(cache.get(&okey(1, 1)).is_some());
    }
    cache.maintain();
    assert!(cache.get(&okey(1, 1)).is_some());
    assert!(cache.get(&okey(1, 2)).is_none());
}

#[test]
fn stats_accumulate_monotonically() {
    let cache = OutlineCache::new(64);
    let mut last_misses = 0;
    for gid in 0..10u16 {
        cache.get(&okey(1, gid));
        let stats = cache.stats();
        assert!(stats.misses > last_misses);
        last_misses = stats.misses;
    }
    assert_eq!(cache.stats().hits, 0);
}

#[test]
fn concurrent_hammering_preserves_bounds() {
    let outlines = Arc::new(OutlineCache::new(128));
    let shaped = Arc::new(ShapingCache::new(128));

    let mut handles = Vec::new();
    for t in 0..8u64 {
        let outlines = Arc::clone(&outlines);
        let shaped = Arc::clone(&shaped);
        handles.push(std::thread::spawn(move || {
            for i in 0..1_000u32 {
                let gid = (i % 300) as u16;
                outlines.get_or_create(okey(t, gid), || Some(outline(gid)));
                let key = ShapingCacheKey::new(
                    "hammer",
                    t,
                    i as f32,
                    Direction::LeftToRight,
                    &[],
                );
                shaped.get_or_create(key, || {
                    Arc::new(ShapedRun::empty(t, i as f32, Direction::LeftToRight))
                });
                if i % 251 == 0 {
                    outlines.maintain();
                }
            }
        }));
    }
    for h in handles {
        h.join().ok();
    }
    assert!(outlines.len() <= 128);
    assert!(shaped.len() <= 128);
}
