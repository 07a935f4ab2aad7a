//! Content hashing helpers.
//!
//! Every digest in Blueprint Forge is SHA-256 rendered as lowercase hex.
//! Shortened forms are plain prefixes of the full digest, so a short id can
//! always be checked against the full hash it came from.

use sha2::{Digest, Sha256};

/// SHA-256 of `text` as a 64-character lowercase hex string.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// 16-hex-character identifier for a value such as a source path.
///
/// Used for anonymized source references and audit log source ids.
pub fn hash_identifier(value: &str) -> String {
    hash_text(value)[..16].to_string()
}

/// First `n` hex characters of a hash (the whole hash if it is shorter).
pub fn short_hash(hash: &str, n: usize) -> &str {
    match hash.char_indices().nth(n) {
        Some((pos, _)) => &hash[..pos],
        None => hash,
    }
}

/// Stable blueprint id for one segment of one source.
///
/// Same source name, segment index, and content hash always give the same id.
pub fn blueprint_id(source_name: &str, segment_index: usize, content_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(segment_index.to_le_bytes());
    hasher.update(b"\0");
    hasher.update(content_hash.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("BP-{}", &digest[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_text_is_sha256_hex() {
        assert_eq!(
            hash_text(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_text("abc").len(), 64);
    }

    #[test]
    fn short_hash_handles_short_input() {
        assert_eq!(short_hash("abcdef0123", 8), "abcdef01");
        assert_eq!(short_hash("abc", 8), "abc");
    }

    #[test]
    fn blueprint_id_is_deterministic() {
        let a = blueprint_id("notes.md", 1, "deadbeef");
        let b = blueprint_id("notes.md", 1, "deadbeef");
        assert_eq!(a, b);
        assert!(a.starts_with("BP-"));
        assert_eq!(a.len(), 15);
        assert_ne!(a, blueprint_id("notes.md", 2, "deadbeef"));
        assert_ne!(a, blueprint_id("notes.md", 1, "cafebabe"));
    }

    #[test]
    fn hash_identifier_is_prefix_of_full_hash() {
        let full = hash_text("framework/notes.md");
        assert!(full.starts_with(&hash_identifier("framework/notes.md")));
    }
}
