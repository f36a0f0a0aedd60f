//! Body compression for cache entries.
//!
//! Mirrors `zlib.compress`/`zlib.decompress` bit-for-bit:
//! a stored body beginning with the literal ASCII `compressed:` is the
//! marker concatenated with the zlib-compressed payload.

use crate::error::CacheError;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

pub const MARKER: &str = "compressed:";

/// Bodies at or above this size are candidates for compression.
pub const SIZE_THRESHOLD: usize = 1024;

/// Compresses `body` and prefixes it with [`MARKER`] if the compressed form
/// is strictly smaller than the input; otherwise stores it verbatim.
pub fn encode(body: &[u8]) -> Vec<u8> {
    if body.len() < SIZE_THRESHOLD {
        return body.to_vec();
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(body).is_err() {
        return body.to_vec();
    }
    let Ok(compressed) = encoder.finish() else {
        return body.to_vec();
    };

    if compressed.len() < body.len() {
        let mut out = Vec::with_capacity(MARKER.len() + compressed.len());
        out.extend_from_slice(MARKER.as_bytes());
        out.extend_from_slice(&compressed);
        out
    } else {
        body.to_vec()
    }
}

/// Decodes a body stored via [`encode`], transparently decompressing when
/// the marker is present.
pub fn decode(stored: &[u8]) -> Result<Vec<u8>, CacheError> {
    if let Some(payload) = stored.strip_prefix(MARKER.as_bytes()) {
        let mut decoder = ZlibDecoder::new(payload);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| CacheError::Decompression(e.to_string()))?;
        Ok(out)
    } else {
        Ok(stored.to_vec())
    }
}

/// `true` if `stored` carries the compression marker.
pub fn is_compressed(stored: &[u8]) -> bool {
    stored.starts_with(MARKER.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_compression() {
        let body = "x".repeat(2048).into_bytes();
        let stored = encode(&body);
        assert!(is_compressed(&stored));
        assert!(stored.len() < body.len() + MARKER.len());
        assert_eq!(decode(&stored).unwrap(), body);
    }

    #[test]
    fn small_bodies_are_stored_verbatim() {
        let body = b"short".to_vec();
        let stored = encode(&body);
        assert!(!is_compressed(&stored));
        assert_eq!(decode(&stored).unwrap(), body);
    }

    #[test]
    fn incompressible_bodies_are_stored_verbatim_even_if_large() {
        // Random-looking bytes that zlib can't shrink.
        let body: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
        let stored = encode(&body);
        assert_eq!(decode(&stored).unwrap(), body);
    }
}
