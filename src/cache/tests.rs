use super::PairScoreCache;

#[test]
fn test_new_cache_is_empty() {
    let cache = PairScoreCache::with_capacity(1000);

    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.capacity(), 1000);
}

#[test]
fn test_insert_and_get() {
    let cache = PairScoreCache::with_capacity(10);

    cache.insert("What is Rust?", "Rust is a language", 0.87);

    assert_eq!(cache.get("What is Rust?", "Rust is a language"), Some(0.87));
    assert!(cache.contains("What is Rust?", "Rust is a language"));

    cache.run_pending_tasks();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_lookup_requires_exact_pair() {
    let cache = PairScoreCache::with_capacity(10);
    cache.insert("What is Rust?", "Rust is a language", 0.87);

    assert_eq!(cache.get("what is rust?", "Rust is a language"), None);
    assert_eq!(cache.get("What is Rust?", "Rust is a language."), None);
    assert_eq!(cache.get("Rust is a language", "What is Rust?"), None);
}

#[test]
fn test_insert_overwrites() {
    let cache = PairScoreCache::with_capacity(10);

    cache.insert("q", "d", 0.1);
    cache.insert("q", "d", 0.9);

    assert_eq!(cache.get("q", "d"), Some(0.9));
    cache.run_pending_tasks();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_capacity_is_bounded() {
    let cache = PairScoreCache::with_capacity(8);

    for i in 0..64 {
        cache.insert("query", &format!("document {i}"), i as f32);
    }
    cache.run_pending_tasks();

    assert!(cache.len() <= 8);
}

#[test]
fn test_evicts_least_recently_used() {
    let cache = PairScoreCache::with_capacity(3);
    cache.insert("q", "a", 1.0);
    cache.insert("q", "b", 2.0);
    cache.insert("q", "c", 3.0);

    assert_eq!(cache.get("q", "a"), Some(1.0));
    cache.run_pending_tasks();

    cache.insert("q", "d", 4.0);
    cache.run_pending_tasks();

    assert_eq!(cache.get("q", "a"), Some(1.0));
    assert_eq!(cache.get("q", "b"), None);
    assert_eq!(cache.get("q", "c"), Some(3.0));
    assert_eq!(cache.get("q", "d"), Some(4.0));
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_clear() {
    let cache = PairScoreCache::with_capacity(10);
    cache.insert("q", "a", 0.1);
    cache.insert("q", "b", 0.2);

    cache.clear();
    cache.run_pending_tasks();

    assert!(cache.is_empty());
    assert_eq!(cache.get("q", "a"), None);
}
