//! Request fingerprinting: a deterministic cache key from path and query.

use std::collections::BTreeMap;

/// Derives a cache key from `path` and `query_pairs`. Sorting the pairs
/// first means permuting query-parameter order never changes the key.
pub fn fingerprint<'a>(path: &str, query_pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let sorted: BTreeMap<&str, &str> = query_pairs.into_iter().collect();
    let canonical = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Fnv1aHasher::new();
    hasher.update(path.as_bytes());
    hasher.update(b"?");
    hasher.update(canonical.as_bytes());
    hasher.hex_digest()
}

/// Minimal FNV-1a digest. Collision-resistance requirements here are
/// modest (cache key, not a security boundary), so a dependency-free hash
/// avoids pulling in a cryptographic hashing crate for this alone.
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    fn new() -> Self {
        Self {
            state: 0xcbf29ce484222325,
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(0x100000001b3);
        }
    }

    fn hex_digest(self) -> String {
        format!("{:016x}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permuting_query_order_does_not_change_key() {
        let a = fingerprint("/api/products/42", [("b", "2"), ("a", "1")]);
        let b = fingerprint("/api/products/42", [("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_paths_produce_different_keys() {
        let a = fingerprint("/api/products/42", []);
        let b = fingerprint("/api/products/43", []);
        assert_ne!(a, b);
    }

    #[test]
    fn different_query_values_produce_different_keys() {
        let a = fingerprint("/search", [("q", "shoes")]);
        let b = fingerprint("/search", [("q", "socks")]);
        assert_ne!(a, b);
    }
}
