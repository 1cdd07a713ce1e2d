//! Step 2 / step 5: Unicode normalization and fullwidth/zero-width folding.

use crate::whitespace::strip_zero_width;
use unicode_normalization::UnicodeNormalization;

/// NFKC-normalizes `s`, folds the fullwidth ASCII block (U+FF01..U+FF5E) down
/// to plain ASCII, and strips zero-width/format code points.
///
/// Applied twice by [`crate::canonicalize`] — once before decoding, once
/// after — because URL/entity decoding can reveal fullwidth characters that
/// were themselves percent- or entity-encoded.
pub(crate) fn fold_unicode(s: &str) -> String {
    let normalized: String = s.nfkc().collect();
    let folded: String = normalized.chars().map(fold_fullwidth).collect();
    strip_zero_width(&folded)
}

/// Folds a single fullwidth ASCII variant (U+FF01..U+FF5E) to its ASCII
/// equivalent. Characters outside that block pass through unchanged.
fn fold_fullwidth(c: char) -> char {
    const FULLWIDTH_OFFSET: u32 = 0xFEE0;
    let code = c as u32;
    if (0xFF01..=0xFF5E).contains(&code) {
        char::from_u32(code - FULLWIDTH_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_fullwidth_letters() {
        assert_eq!(fold_fullwidth('\u{FF21}'), 'A');
        assert_eq!(fold_fullwidth('\u{FF41}'), 'a');
    }

    #[test]
    fn leaves_ascii_alone() {
        assert_eq!(fold_fullwidth('a'), 'a');
        assert_eq!(fold_fullwidth('Z'), 'Z');
    }

    #[test]
    fn nfkc_normalizes_compatibility_chars() {
        // U+2024 ONE DOT LEADER is compatibility-equivalent to '.'
        let out = fold_unicode("\u{2024}\u{2024}/");
        assert_eq!(out, "../");
    }
}
