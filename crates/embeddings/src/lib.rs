#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]

//! Word embedding store: a static, chained hash table mapping lower-cased
//! words to fixed-dimension `f32` vectors.
//!
//! The table is built once from a GloVe-style text file (`word v1 .. vD`)
//! and is read-only afterwards. Bucket count never changes, so the load
//! factor grows with the vocabulary.
//!
//! Layout:
//! - `vector.rs`: `EmbeddingVector`, the immutable fixed-length value
//! - `options.rs`: `StoreOptions` and the malformed-line policy
//! - `store.rs`: `StoreBuilder` (arena insertion) and `EmbeddingStore` (lookups)
//! - `error.rs`: `StoreError`

use std::borrow::Cow;

/// Store construction errors.
pub mod error;
/// Store construction options.
pub mod options;
/// Arena-backed chained hash table.
pub mod store;
/// Immutable embedding vector.
pub mod vector;

pub use error::{Result, StoreError};
pub use options::{MalformedLinePolicy, StoreOptions};
pub use store::{EmbeddingStore, StoreBuilder, StoreStats};
pub use vector::EmbeddingVector;

/// Seed of the multiplicative string hash.
pub const HASH_SEED: u64 = 5381;

/// Multiplicative string hash over the bytes of `key`: `h = h * 33 + byte`.
///
/// Wraps on overflow; callers reduce the result modulo the bucket count.
pub fn hash_key(key: &str) -> u64 {
    key.bytes()
        .fold(HASH_SEED, |h, b| h.wrapping_mul(33).wrapping_add(u64::from(b)))
}

/// Case normalization applied to every key, at insertion and at lookup.
///
/// Always equal to `word.to_lowercase()`; borrows when that would be a no-op.
/// Titlecase letters (`ǅ`) are not uppercase but still lower-case, so the
/// check runs the per-char mapping rather than `char::is_uppercase`.
pub fn normalize(word: &str) -> Cow<'_, str> {
    if word.chars().all(|c| c.to_lowercase().eq(std::iter::once(c))) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(word.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_shift_add_form() {
        // ((h << 5) + h) + c is the same recurrence
        let mut h: u64 = 5381;
        for c in "olivia".bytes() {
            h = (h << 5).wrapping_add(h).wrapping_add(u64::from(c));
        }
        assert_eq!(hash_key("olivia"), h);
        assert_eq!(hash_key(""), HASH_SEED);
    }

    #[test]
    fn normalize_lowercases_only_when_needed() {
        assert!(matches!(normalize("brown"), Cow::Borrowed("brown")));
        assert_eq!(normalize("Brown"), "brown");
        assert_eq!(normalize("ÉTÉ"), "été");
    }

    #[test]
    fn normalize_agrees_with_to_lowercase() {
        for word in ["ǅem", "ǈubljana", "ᾈ", "İstanbul", "ΣΟΦΟΣ", "plain"] {
            assert_eq!(normalize(word), word.to_lowercase(), "{word}");
        }
        assert!(matches!(normalize("ǆem"), Cow::Borrowed(_)));
    }
}
