use blake3::Hasher;

/// Hashes a single text with BLAKE3.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Hashes an exact (query, document) pair into a cache key.
///
/// The query is length-prefixed so `("ab", "c")` and `("a", "bc")` never collide
/// structurally; any difference in either text changes the key.
#[inline]
pub fn hash_pair(query: &str, document: &str) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(&(query.len() as u64).to_le_bytes());
    hasher.update(query.as_bytes());
    hasher.update(document.as_bytes());
    *hasher.finalize().as_bytes()
}

/// First 8 bytes of a BLAKE3 digest as a little-endian `u64`.
///
/// Used for deterministic seeds, not identity.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
