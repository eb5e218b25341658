//! Evict Cache - demo client
//!
//! Walks an LRU and an LFU cache through a short fixed sequence of calls and
//! reports which keys survive, then replays the LRU scenario against the
//! configured engine.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evict_cache::cache::{LfuCache, LruCache};
use evict_cache::{build_cache, BoundedCache, Config};

/// Main entry point for the demo client.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. LRU scenario: capacity 3, touch key1, insert key4, check key2
/// 3. LFU scenario: capacity 3, read a and b, insert d, check c
/// 4. Replay the LRU scenario on the engine named by the configuration
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evict_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut lru_cache: LruCache<&str, &str> = LruCache::new(3)?;
    run_recency_scenario(&mut lru_cache);

    println!();

    let mut lfu_cache: LfuCache<&str, i32> = LfuCache::new(3)?;
    lfu_cache.put("a", 1);
    lfu_cache.put("b", 2);
    lfu_cache.put("c", 3);

    println!("{:?}", lfu_cache.get(&"a"));
    println!("{:?}", lfu_cache.get(&"b"));
    lfu_cache.put("d", 4);

    // Lowest frequency, so it is gone
    println!("{:?}", lfu_cache.get(&"c"));

    let config = Config::from_env();
    info!(
        "Configuration loaded: policy={}, capacity={}",
        config.policy, config.capacity
    );

    let mut configured = build_cache::<&str, &str>(config.policy, config.capacity)
        .with_context(|| format!("failed to build {} cache", config.policy))?;
    run_recency_scenario(configured.as_mut());

    let stats = serde_json::to_string(&configured.stats())?;
    info!(policy = %config.policy, %stats, "configured cache statistics");

    Ok(())
}

fn run_recency_scenario(cache: &mut dyn BoundedCache<&'static str, &'static str>) {
    cache.put("key1", "value1");
    cache.put("key2", "value2");
    cache.put("key3", "value3");

    // Moves key1 to the most recently used position
    if let Some(value) = cache.get(&"key1") {
        println!("Retrieved value for key1: {}", value);
    }

    cache.put("key4", "value4");

    if cache.get(&"key2").is_some() {
        println!("key2 is still in the cache");
    } else {
        println!("key2 was evicted from the cache");
    }
}
