//! Step 4: guarded multi-pass URL decoding.
//!
//! Naive single-pass percent-decoding is bypassable by nested encoding
//! (`%252e` decodes once to `%2e`, which still reads as a literal `%2e` to
//! anything that isn't decoding again). This module collapses one level of
//! `%25`-encoding per pass, rewrites a handful of high-risk tokens directly,
//! then runs one strict percent-decode pass — repeating until two
//! consecutive passes agree or the iteration cap is hit.

use percent_encoding::percent_decode_str;

/// High-risk single-byte tokens worth resolving directly even if a decode
/// pass would reach the same result; named here because they're the tokens
/// path-traversal and null-byte-injection payloads actually use.
const TARGETED_TOKENS: &[(&str, &str)] = &[
    ("%2e", "."),
    ("%2f", "/"),
    ("%5c", "\\"),
    ("%00", "\u{0}"),
    ("%20", " "),
];

pub(crate) fn decode_guarded(s: &str, max_iterations: usize) -> String {
    let mut current = s.to_string();
    for _ in 0..max_iterations {
        let collapsed = collapse_percent25(&current);
        let rewritten = apply_targeted_rewrites(&collapsed);
        let decoded = strict_decode_once(&rewritten);
        if decoded == current {
            break;
        }
        current = decoded;
    }
    current
}

/// Collapses one level of `%25` over-encoding: `%25` followed by two hex
/// digits becomes `%` followed by those digits. Applied before the strict
/// decode pass so that `%252e` (`%25` + `2e`) resolves to `%2e` in the same
/// iteration its strict decode would resolve `%2e` to `.`.
fn collapse_percent25(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if is_percent25(&chars, i) && i + 4 < chars.len() && is_hex_pair(&chars, i + 3) {
            out.push('%');
            out.push(chars[i + 3]);
            out.push(chars[i + 4]);
            i += 5;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn is_percent25(chars: &[char], i: usize) -> bool {
    i + 2 < chars.len() && chars[i] == '%' && chars[i + 1] == '2' && chars[i + 2] == '5'
}

fn is_hex_pair(chars: &[char], i: usize) -> bool {
    chars[i].is_ascii_hexdigit() && chars[i + 1].is_ascii_hexdigit()
}

fn apply_targeted_rewrites(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let chars: Vec<char> = s.chars().collect();
    let lower_chars: Vec<char> = lower.chars().collect();
    'outer: while i < chars.len() {
        for (token, replacement) in TARGETED_TOKENS {
            let token_chars: Vec<char> = token.chars().collect();
            if i + token_chars.len() <= lower_chars.len()
                && lower_chars[i..i + token_chars.len()] == token_chars[..]
            {
                out.push_str(replacement);
                i += token_chars.len();
                continue 'outer;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn strict_decode_once(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_encoding_decodes() {
        assert_eq!(decode_guarded("%2e%2e%2f", 8), "../");
    }

    #[test]
    fn double_encoding_decodes() {
        assert_eq!(decode_guarded("%252e%252e%252f", 8), "../");
    }

    #[test]
    fn triple_encoding_decodes() {
        assert_eq!(decode_guarded("%25252e%25252e%25252f", 8), "../");
    }

    #[test]
    fn plain_text_unaffected() {
        assert_eq!(decode_guarded("hello world", 8), "hello world");
    }

    #[test]
    fn stops_on_malformed_percent_without_panicking() {
        assert_eq!(decode_guarded("%", 8), "%");
        assert_eq!(decode_guarded("%zz", 8), "%zz");
        assert_eq!(decode_guarded(&"%".repeat(200), 8), "%".repeat(200));
    }

    #[test]
    fn bounded_by_iteration_cap() {
        // Even pathological nesting terminates quickly.
        let deeply_nested = "%2525252525252525252525252525252525252525252e";
        let out = decode_guarded(deeply_nested, 8);
        assert!(out.len() <= deeply_nested.len());
    }
}
