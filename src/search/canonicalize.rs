//! Text canonicalization for consistent embedding input.
//!
//! The same visual text must always reach the encoder in the same form, so
//! catalog text and queries both pass through here before embedding.
//!
//! # Processing Pipeline
//!
//! 1. **Unicode NFC normalization** - "café" (decomposed) → "café" (composed)
//! 2. **Whitespace normalization** - Collapse runs (including newlines), trim
//! 3. **Truncation** - Limit to [`MAX_EMBED_CHARS`] characters
//!
//! Truncation here is a coarse character cap. Encoders apply their own token
//! budget on top of it.
//!
//! # Example
//!
//! ```ignore
//! use product_search::search::canonicalize::canonicalize_for_embedding;
//!
//! assert_eq!(canonicalize_for_embedding("  Red\n\nrunning   shoes "), "Red running shoes");
//! ```

use unicode_normalization::UnicodeNormalization;

/// Maximum characters to keep after canonicalization.
pub const MAX_EMBED_CHARS: usize = 2000;

/// Canonicalize text for embedding with the default character cap.
pub fn canonicalize_for_embedding(text: &str) -> String {
    canonicalize_with_limit(text, MAX_EMBED_CHARS)
}

/// Canonicalize text for embedding, keeping at most `max_chars` characters.
pub fn canonicalize_with_limit(text: &str, max_chars: usize) -> String {
    let normalized: String = text.nfc().collect();
    let collapsed = collapse_whitespace(&normalized);
    truncate_to_chars(&collapsed, max_chars)
}

/// Single spaces between words; no leading or trailing whitespace.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate string to at most N characters, respecting char boundaries.
fn truncate_to_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
