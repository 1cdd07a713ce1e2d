//! Step 6 / step 7: whitespace unification and zero-width sweep.

/// Code points treated as zero-width/format characters and stripped
/// entirely: zero-width space/non-joiner/joiner, word joiner, BOM, and the
/// right-to-left override (used to visually reverse a dangerous extension,
/// e.g. `gnp.exe` rendered as `exe.png`).
const ZERO_WIDTH: &[char] = &[
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{202E}',
];

/// Unicode space separators folded to a plain ASCII space, plus the two
/// Unicode line separators folded to `\n`.
const UNICODE_SPACES: &[char] = &[
    '\u{00A0}', '\u{1680}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}',
    '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{205F}', '\u{3000}',
];

pub(crate) fn unify(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2028}' | '\u{2029}' => '\n',
            c if UNICODE_SPACES.contains(&c) => ' ',
            c => c,
        })
        .collect()
}

pub(crate) fn strip_zero_width(s: &str) -> String {
    s.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_nbsp_and_ideographic_space() {
        assert_eq!(unify("a\u{00a0}b\u{3000}c"), "a b c");
    }

    #[test]
    fn folds_line_separators_to_newline() {
        assert_eq!(unify("a\u{2028}b\u{2029}c"), "a\nb\nc");
    }

    #[test]
    fn strips_zero_width_characters() {
        assert_eq!(strip_zero_width("a\u{200b}b\u{feff}c\u{202e}d"), "abcd");
    }

    #[test]
    fn leaves_ordinary_text_unchanged() {
        assert_eq!(unify("hello world"), "hello world");
        assert_eq!(strip_zero_width("hello world"), "hello world");
    }
}
