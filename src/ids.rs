//! Document identifiers and array-key generation.
//!
//! A CMS document exists as a published document (`<id>`) and optionally a
//! draft counterpart (`drafts.<id>`). Every preview read and every write in
//! this crate targets the published identifier.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking a draft document identifier.
pub const DRAFT_PREFIX: &str = "drafts.";

/// Length of generated array keys.
const KEY_LEN: usize = 12;

/// Strip the draft prefix, if present.
#[must_use]
pub fn to_published_id(id: &str) -> &str {
    id.strip_prefix(DRAFT_PREFIX).unwrap_or(id)
}

/// Identifier of a published CMS document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse a raw (possibly draft, possibly blank) identifier.
    ///
    /// Returns `None` when nothing usable remains after trimming and
    /// stripping the draft prefix.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let published = to_published_id(raw.trim()).trim();
        if published.is_empty() {
            None
        } else {
            Some(Self(published.to_string()))
        }
    }

    /// Borrow the published identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of the draft counterpart.
    #[must_use]
    pub fn draft(&self) -> String {
        format!("{DRAFT_PREFIX}{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of collision-resistant keys for CMS array items (`_key`).
pub trait KeyGenerator: Send + Sync {
    /// Produce a fresh key.
    fn next_key(&self) -> String;
}

/// Random keys derived from `UUIDv4`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn next_key(&self) -> String {
        let mut key = Uuid::new_v4().simple().to_string();
        key.truncate(KEY_LEN);
        key
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::KeyGenerator;

    /// Deterministic keys: `k1`, `k2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialKeys(AtomicUsize);

    impl KeyGenerator for SequentialKeys {
        fn next_key(&self) -> String {
            let n = self.0.fetch_add(1, Ordering::Relaxed) + 1;
            format!("k{n}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_id_strips_prefix() {
        assert_eq!(to_published_id("drafts.abc"), "abc");
        assert_eq!(to_published_id("abc"), "abc");
        assert_eq!(to_published_id("drafts."), "");
    }

    #[test]
    fn test_document_id_parse() {
        assert_eq!(DocumentId::parse(" drafts.p1 ").map(|d| d.to_string()), Some("p1".to_string()));
        assert!(DocumentId::parse("").is_none());
        assert!(DocumentId::parse("drafts.").is_none());
        assert_eq!(DocumentId::parse("p1").map(|d| d.draft()), Some("drafts.p1".to_string()));
    }

    #[test]
    fn test_uuid_keys_are_unique() {
        let keys = UuidKeys;
        let a = keys.next_key();
        let b = keys.next_key();
        assert_eq!(a.len(), KEY_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_keys() {
        let keys = testing::SequentialKeys::default();
        assert_eq!(keys.next_key(), "k1");
        assert_eq!(keys.next_key(), "k2");
    }
}
