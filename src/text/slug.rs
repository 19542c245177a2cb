//! URL slug helpers: generation, format checks and suffixing.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::ids::KeyGenerator;

/// Maximum slug length.
pub const MAX_SLUG_CHARS: usize = 60;

#[allow(clippy::expect_used)]
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("SLUG_PATTERN regex should compile")
});

/// Build an ASCII kebab-case slug from free text.
///
/// Non-Latin scripts produce an empty slug; callers fall back to
/// [`fallback_slug_base`].
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.to_lowercase().nfkd() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_dash = true;
        }
    }

    truncate_slug(&out, MAX_SLUG_CHARS)
}

/// `item-<last six alphanumerics of the id>`, or a generated tail when the id
/// has none.
#[must_use]
pub fn fallback_slug_base(document_id: &str, keys: &dyn KeyGenerator) -> String {
    let cleaned: Vec<char> = document_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let tail: String = if cleaned.is_empty() {
        keys.next_key()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .take(6)
            .collect()
    } else {
        cleaned[cleaned.len().saturating_sub(6)..].iter().collect()
    };

    format!("item-{tail}")
}

/// Kebab-case ASCII, at most [`MAX_SLUG_CHARS`] long.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_CHARS && SLUG_PATTERN.is_match(slug)
}

/// `base-suffix`, shortening `base` so the result stays within the limit.
#[must_use]
pub fn with_suffix(base: &str, suffix: &str) -> String {
    let room = MAX_SLUG_CHARS.saturating_sub(suffix.len() + 1);
    let head = truncate_slug(base, room);
    if head.is_empty() {
        suffix.to_string()
    } else {
        format!("{head}-{suffix}")
    }
}

fn truncate_slug(slug: &str, max: usize) -> String {
    let cut: String = slug.chars().take(max).collect();
    cut.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UuidKeys;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Mini Leather Wallet – Hand-stitched"), "mini-leather-wallet-hand-stitched");
        assert_eq!(slugify("  Café  Crème!! "), "cafe-creme");
        assert_eq!(slugify("--a---b--"), "a-b");
    }

    #[test]
    fn test_slugify_non_latin_is_empty() {
        assert_eq!(slugify("กระเป๋าหนังวัวแท้"), "");
    }

    #[test]
    fn test_slugify_limits_length() {
        let slug = slugify(&"word ".repeat(30));
        assert!(slug.len() <= MAX_SLUG_CHARS);
        assert!(!slug.ends_with('-'));
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn test_fallback_base_uses_id_tail() {
        assert_eq!(fallback_slug_base("drafts.abc-DEF123", &UuidKeys), "item-def123");
    }

    #[test]
    fn test_fallback_base_without_alphanumerics() {
        let base = fallback_slug_base("...", &UuidKeys);
        assert!(base.starts_with("item-"));
        assert_eq!(base.len(), "item-".len() + 6);
        assert!(is_valid_slug(&base));
    }

    #[test]
    fn test_slug_format_check() {
        assert!(is_valid_slug("leather-wallet-2"));
        assert!(!is_valid_slug("Leather-Wallet"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug(&"a".repeat(61)));
    }

    #[test]
    fn test_with_suffix_stays_in_limit() {
        let base = "a".repeat(60);
        let slug = with_suffix(&base, "2");
        assert_eq!(slug.len(), 60);
        assert!(slug.ends_with("-2"));
        assert_ne!(slug, base);
    }
}
