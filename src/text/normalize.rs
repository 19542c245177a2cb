//! Markup stripping and length clamps for short CMS text fields.
//!
//! Every function here is total: any input string produces a value, and
//! every clamp guarantees `chars(result) <= max_chars`.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_PATTERN regex should compile"));

/// Boundary floor used by the title and alt-text clamps.
pub const WORD_BOUNDARY_FLOOR: usize = 40;

/// Boundary floor used by the sentence-aware description clamps.
pub const SENTENCE_BOUNDARY_FLOOR: usize = 60;

/// Marker appended by [`clamp_with_ellipsis`].
pub const ELLIPSIS: char = '…';

/// Quote pairs removed when they wrap the whole value.
const QUOTE_PAIRS: [(char, char); 6] = [
    ('"', '"'),
    ('\'', '\''),
    ('\u{201C}', '\u{201D}'),
    ('\u{2018}', '\u{2019}'),
    ('\u{00AB}', '\u{00BB}'),
    ('\u{300C}', '\u{300D}'),
];

/// Number of Unicode scalar values in `s`.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Remove tags, line breaks, control and invisible code points, collapse
/// whitespace and drop one pair of wrapping quotes.
#[must_use]
pub fn strip_markup_and_controls(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let without_tags = TAG_PATTERN.replace_all(input, " ");

    let mut collapsed = String::with_capacity(without_tags.len());
    let mut prev_space = true;
    for ch in without_tags.chars() {
        if ch.is_whitespace() || is_hidden(ch) {
            if !prev_space {
                collapsed.push(' ');
                prev_space = true;
            }
        } else {
            collapsed.push(ch);
            prev_space = false;
        }
    }

    let trimmed = collapsed.trim_end();
    strip_wrapping_quotes(trimmed).trim().to_string()
}

/// Clamp to `max_chars`, cutting at the last space when it sits at or after
/// `min_boundary`, otherwise hard-cutting.
#[must_use]
pub fn clamp_by_characters(input: &str, max_chars: usize, min_boundary: usize) -> String {
    let normalized = strip_markup_and_controls(input);
    truncate_at_word_boundary(&normalized, max_chars, min_boundary)
}

/// Keep the first `max_words` words, then apply the character clamp.
#[must_use]
pub fn clamp_by_words_then_characters(
    input: &str,
    max_words: usize,
    max_chars: usize,
    min_boundary: usize,
) -> String {
    let normalized = strip_markup_and_controls(input);
    let words = normalized
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");
    truncate_at_word_boundary(&words, max_chars, min_boundary)
}

/// Clamp longer free text, preferring to end on `.`, `!` or `?`.
///
/// A sentence end is only used when it sits at or after `min_boundary`;
/// otherwise the last space past the floor is used, and failing that the
/// value is hard-cut at `max_chars`.
#[must_use]
pub fn clamp_by_sentence_boundary(input: &str, max_chars: usize, min_boundary: usize) -> String {
    let normalized = strip_markup_and_controls(input);
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= max_chars {
        return normalized;
    }
    if max_chars == 0 {
        return String::new();
    }

    let window = &chars[..=max_chars];

    // Inclusive cut after the punctuation must still fit in max_chars.
    let sentence_end = window[..max_chars]
        .iter()
        .rposition(|c| matches!(c, '.' | '!' | '?'));
    if let Some(end) = sentence_end {
        if end >= min_boundary {
            return collect_trimmed(&chars[..=end]);
        }
    }

    if let Some(space) = window.iter().rposition(|c| *c == ' ') {
        if space >= min_boundary {
            return collect_trimmed(&chars[..space]);
        }
    }

    collect_trimmed(&chars[..max_chars])
}

/// FAQ clamp: hard cut to `max_chars - 1` and append an ellipsis.
#[must_use]
pub fn clamp_with_ellipsis(input: &str, max_chars: usize) -> String {
    let normalized = strip_markup_and_controls(input);
    if char_len(&normalized) <= max_chars {
        return normalized;
    }
    if max_chars == 0 {
        return String::new();
    }

    let head: String = normalized.chars().take(max_chars - 1).collect();
    let mut out = head.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Boundary-aware cut on an already normalized value.
fn truncate_at_word_boundary(normalized: &str, max_chars: usize, min_boundary: usize) -> String {
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= max_chars {
        return normalized.to_string();
    }

    let slice = &chars[..max_chars];
    match slice.iter().rposition(|c| *c == ' ') {
        Some(space) if space >= min_boundary => collect_trimmed(&slice[..space]),
        _ => collect_trimmed(slice),
    }
}

/// A cut can expose a wrapping quote pair; drop it so a second clamp is a no-op.
fn collect_trimmed(chars: &[char]) -> String {
    let cut: String = chars.iter().collect();
    strip_wrapping_quotes(cut.trim()).trim().to_string()
}

fn strip_wrapping_quotes(s: &str) -> &str {
    let mut chars = s.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return s;
    };

    if QUOTE_PAIRS
        .iter()
        .any(|(open, close)| first == *open && last == *close)
    {
        &s[first.len_utf8()..s.len() - last.len_utf8()]
    } else {
        s
    }
}

/// Control characters and invisible format code points treated as spaces.
fn is_hidden(ch: char) -> bool {
    ch.is_control()
        || matches!(
            ch,
            '\u{00AD}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{2069}'
                | '\u{FE00}'..='\u{FE0F}'
                | '\u{FEFF}'
                | '\u{FFFD}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_tags_and_breaks() {
        assert_eq!(strip_markup_and_controls("<b>Hello</b>\nWorld"), "Hello World");
        assert_eq!(
            strip_markup_and_controls("<p>one</p><p>two</p>\r\n\r\nthree"),
            "one two three"
        );
    }

    #[test]
    fn test_strip_removes_invisible_code_points() {
        let input = "Zero\u{200B}width\u{200D}joiner\u{FEFF} and\u{FE0F} \u{FFFD}mark\u{0007}";
        assert_eq!(strip_markup_and_controls(input), "Zero width joiner and mark");
    }

    #[test]
    fn test_strip_wrapping_quotes_once() {
        assert_eq!(strip_markup_and_controls("\"Quoted title\""), "Quoted title");
        assert_eq!(strip_markup_and_controls("\u{201C} Curly \u{201D}"), "Curly");
        assert_eq!(strip_markup_and_controls("\"\"double\"\""), "\"double\"");
        assert_eq!(strip_markup_and_controls("\"unbalanced"), "\"unbalanced");
        assert_eq!(strip_markup_and_controls("\""), "\"");
    }

    #[test]
    fn test_strip_empty_and_whitespace() {
        assert_eq!(strip_markup_and_controls(""), "");
        assert_eq!(strip_markup_and_controls("   \n\t  "), "");
        assert_eq!(strip_markup_and_controls("<br/>"), "");
    }

    #[test]
    fn test_clamp_short_input_unchanged() {
        assert_eq!(clamp_by_characters("  A short title ", 60, 40), "A short title");
    }

    #[test]
    fn test_clamp_hard_cuts_below_boundary_floor() {
        let out = clamp_by_characters("The quick brown fox jumps over the lazy dog", 20, 40);
        assert_eq!(out, "The quick brown fox");
        assert!(char_len(&out) <= 20);
    }

    #[test]
    fn test_clamp_cuts_at_space_past_floor() {
        let input = "Handmade leather wallet with stitched edges and a slim profile for daily carry";
        let out = clamp_by_characters(input, 60, 40);
        assert_eq!(out, "Handmade leather wallet with stitched edges and a slim");
        assert!(char_len(&out) <= 60);
    }

    #[test]
    fn test_clamp_hard_cut_without_spaces() {
        let input = "x".repeat(80);
        assert_eq!(clamp_by_characters(&input, 60, 40), "x".repeat(60));
    }

    #[test]
    fn test_clamp_zero_max_is_empty() {
        assert_eq!(clamp_by_characters("anything", 0, 40), "");
        assert_eq!(clamp_by_sentence_boundary("anything", 0, 60), "");
        assert_eq!(clamp_with_ellipsis("anything", 0), "");
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let samples = [
            "The quick brown fox jumps over the lazy dog",
            "<i>Mini leather wallet</i> — hand-stitched, compact and perfect for everyday use in the city",
            "กระเป๋าหนังวัวแท้ ทรงมินิ ใช้ทุกวัน น้ำหนักเบา เหมาะกับทุกสไตล์ พกพาสะดวก ทนทาน",
            "\"Compact everyday wallet in soft full-grain leather\" with a coin pocket",
            "«Portefeuille compact en cuir pleine fleur souple» avec poche",
        ];
        for s in samples {
            for n in [10, 20, 45, 60] {
                let once = clamp_by_characters(s, n, 40);
                assert_eq!(clamp_by_characters(&once, n, 40), once);
                assert!(char_len(&once) <= n);
            }
        }
    }

    #[test]
    fn test_cut_exposing_quote_pair_is_stable() {
        let input = format!("\"{}\" {}", "a".repeat(50), "x".repeat(20));
        let once = clamp_by_characters(&input, 60, 40);
        assert_eq!(once, "a".repeat(50));
        assert_eq!(clamp_by_characters(&once, 60, 40), once);

        let words = clamp_by_words_then_characters(&input, 16, 60, 40);
        assert_eq!(clamp_by_words_then_characters(&words, 16, 60, 40), words);

        let sentence = format!("\"{}\" {}", "b".repeat(70), "y".repeat(100));
        let once = clamp_by_sentence_boundary(&sentence, 160, 60);
        assert_eq!(once, "b".repeat(70));
        assert_eq!(clamp_by_sentence_boundary(&once, 160, 60), once);
    }

    #[test]
    fn test_clamp_counts_chars_not_bytes() {
        let thai = "ก".repeat(70);
        let out = clamp_by_characters(&thai, 60, 40);
        assert_eq!(char_len(&out), 60);
    }

    #[test]
    fn test_words_then_characters_caps_words() {
        let input = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen";
        let out = clamp_by_words_then_characters(input, 16, 120, 40);
        assert_eq!(out.split_whitespace().count(), 16);
        assert!(out.ends_with("sixteen"));
    }

    #[test]
    fn test_words_then_characters_caps_chars() {
        let input = "supercalifragilistic ".repeat(10);
        let out = clamp_by_words_then_characters(&input, 16, 120, 40);
        assert!(char_len(&out) <= 120);
        assert!(out.split_whitespace().count() <= 16);
        assert!(!out.ends_with(' '));
    }

    #[test]
    fn test_sentence_clamp_below_floor_falls_through() {
        let input = "Short sentence here. Another one follows after this point.";
        let out = clamp_by_sentence_boundary(input, 30, 60);
        // Neither the period (offset 19) nor any space reaches the 60 floor.
        assert_eq!(out, "Short sentence here. Another o");
        assert_eq!(char_len(&out), 30);
    }

    #[test]
    fn test_sentence_clamp_prefers_sentence_end() {
        let first = "This genuine leather wallet is stitched by hand in small batches.";
        let input = format!("{first} It fits in any pocket and lasts for years of daily use and travel.");
        let out = clamp_by_sentence_boundary(&input, 100, 60);
        assert_eq!(out, first);
    }

    #[test]
    fn test_sentence_clamp_uses_space_when_no_late_sentence_end() {
        let input = "A compact wallet made from full grain cowhide leather with six card slots and a coin pocket for everyday carry";
        let out = clamp_by_sentence_boundary(input, 80, 60);
        assert!(char_len(&out) <= 80);
        assert!(input.starts_with(&out));
        assert!(!out.ends_with(' '));
        assert_eq!(out, "A compact wallet made from full grain cowhide leather with six card slots and a");
    }

    #[test]
    fn test_sentence_clamp_never_exceeds_max() {
        // Punctuation sits exactly at index max_chars.
        let input = format!("{}. and more text follows", "a".repeat(70));
        let out = clamp_by_sentence_boundary(&input, 70, 60);
        assert!(char_len(&out) <= 70);
    }

    #[test]
    fn test_ellipsis_clamp_exact_length() {
        let question = format!("{}?", "q".repeat(144));
        assert_eq!(char_len(&question), 145);
        let out = clamp_with_ellipsis(&question, 140);
        assert_eq!(char_len(&out), 140);
        assert!(out.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_ellipsis_clamp_short_untouched() {
        assert_eq!(clamp_with_ellipsis("What is X?", 140), "What is X?");
    }

    #[test]
    fn test_empty_input_to_every_clamp() {
        for input in ["", "   ", "\n\r\t"] {
            assert_eq!(clamp_by_characters(input, 60, 40), "");
            assert_eq!(clamp_by_words_then_characters(input, 16, 120, 40), "");
            assert_eq!(clamp_by_sentence_boundary(input, 160, 60), "");
            assert_eq!(clamp_with_ellipsis(input, 140), "");
        }
    }
}
