//! Cache error type.
//!
//! Cache-backend failures never surface to the caller: callers treat
//! [`CacheError`] as "pass through to the origin and log", never as a
//! reason to fail the request.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("failed to decompress cached body: {0}")]
    Decompression(String),

    #[error("upstream fetch failed: {0}")]
    Upstream(String),
}
