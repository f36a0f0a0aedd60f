//! Response cache middleware for the analysis pipeline.
//!
//! Caches upstream HTTP responses by a fingerprint derived from request
//! path and query parameters, with adaptive TTL, zlib compression of large
//! bodies, byte-budget eviction, singleflight coalescing of concurrent
//! misses, and a warm-up analyzer that flags frequently-missed paths for
//! proactive refresh.
//!
//! # Examples
//!
//! ```
//! use worthit_cache::{CacheConfig, CachedResponse, ResponseCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = ResponseCache::new(CacheConfig::default());
//!
//! let (response, _source) = cache
//!     .get_or_fetch("/api/products/42", [], || async {
//!         Ok(CachedResponse {
//!             body: b"{\"ok\":true}".to_vec(),
//!             content_type: "application/json".into(),
//!         })
//!     })
//!     .await?;
//! assert_eq!(response.body, b"{\"ok\":true}");
//! # Ok(())
//! # }
//! ```

mod cache;
mod coalesce;
mod compression;
mod config;
mod entry;
mod error;
mod events;
mod fingerprint;
mod store;
mod warmup;

pub use cache::{CachedResponse, ResponseCache, Source};
pub use config::CacheConfig;
pub use error::CacheError;
pub use events::CacheEvent;
pub use fingerprint::fingerprint;
