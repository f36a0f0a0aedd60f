use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use worthit_cache::{CacheConfig, CachedResponse, ResponseCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Response Cache Example");
    println!("=======================\n");

    let call_count = Arc::new(AtomicUsize::new(0));
    let mut config = CacheConfig::default();
    config.base_ttl = Duration::from_secs(2);
    let cache = ResponseCache::new(config);

    let fetch = |path: &'static str, cc: Arc<AtomicUsize>| {
        cache.get_or_fetch(path, [], move || async move {
            let count = cc.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  Upstream fetched (call #{count})");
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(CachedResponse {
                body: format!("Response: {path}").into_bytes(),
                content_type: "text/plain".into(),
            })
        })
    };

    println!("Test 1: First call (cache miss)");
    let (response, source) = fetch("/request1", Arc::clone(&call_count)).await?;
    println!("  Got: {:?} (from {source:?})\n", String::from_utf8_lossy(&response.body));

    println!("Test 2: Same request (cache hit)");
    let (_, source) = fetch("/request1", Arc::clone(&call_count)).await?;
    println!("  Source: {source:?}\n");

    println!("Test 3: Different request (cache miss)");
    fetch("/request2", Arc::clone(&call_count)).await?;
    println!();

    println!("Test 4: Wait for TTL expiration");
    println!("  Waiting 3 seconds...");
    tokio::time::sleep(Duration::from_secs(3)).await;
    let (_, source) = fetch("/request2", Arc::clone(&call_count)).await?;
    println!("  Source: {source:?} (should be Upstream due to TTL)\n");

    println!(
        "Summary: upstream fetched {} times total",
        call_count.load(Ordering::SeqCst)
    );

    Ok(())
}
