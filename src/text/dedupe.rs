//! Order-preserving, key-based deduplication helpers.

use std::collections::HashSet;

/// Normalize text into a dedup key (trim, lowercase, collapse whitespace).
#[must_use]
pub fn dedup_key(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut prev_space = false;

    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            if !prev_space {
                normalized.push(' ');
                prev_space = true;
            }
        } else {
            for lower in ch.to_lowercase() {
                normalized.push(lower);
            }
            prev_space = false;
        }
    }

    normalized
}

/// Keep the first accepted item per key, in input order.
///
/// Items rejected by `accept` never claim a key, so a later valid item with
/// the same key is still kept.
pub fn deduplicate_keyed<T, I, K, A>(items: I, key_of: K, accept: A) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    K: Fn(&T) -> String,
    A: Fn(&T) -> bool,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for item in items {
        if !accept(&item) {
            continue;
        }
        if seen.insert(key_of(&item)) {
            out.push(item);
        }
    }

    out
}
