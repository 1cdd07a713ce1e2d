//! # Text Canonicalizer
//!
//! Neutralizes encoding evasion before any content check runs. Every string
//! comparison anywhere downstream of this crate — the pattern catalog, the
//! semantic policy engine's path checks, the behavior layer's method-name
//! heuristics — must read the output of [`canonicalize`], never the raw
//! message text.
//!
//! ## Threat Model
//!
//! Without canonicalization, an attacker can smuggle a recognizable attack
//! string past naive pattern matching using:
//!
//! - **Escape sequences**: the literal text `\x2e\x2e/` instead of `../`
//! - **Fullwidth characters**: `．．／` instead of `../`
//! - **Zero-width characters**: interspersed `\u{200b}` splitting a keyword
//! - **HTML entities**: `&#x2e;&#x2e;&#x2f;`
//! - **Nested percent-encoding**: `%252e%252e%252f`
//! - **Unicode whitespace**: non-breaking spaces splitting keyword matches
//!
//! [`canonicalize`] applies a fixed, ordered sequence of transforms so that
//! all of the above collapse to the same string a plain-text pattern would
//! match.
//!
//! ## Contract
//!
//! `canonicalize` is:
//! - **total** — never panics, never returns `Err`, for any `&str` input.
//! - **idempotent after two applications** — `canonicalize(canonicalize(s))
//!   == canonicalize(s)`.
//! - **length-bounded** — output length is at most a small constant multiple
//!   of input length (no unbounded expansion from repeated decoding).
//!
//! ## Example
//!
//! ```rust
//! use warden_canon::canonicalize;
//!
//! let evasive = "%252e%252e%252fetc%252fpasswd";
//! assert_eq!(canonicalize(evasive), "../etc/passwd");
//! ```

mod entities;
mod fold;
mod url;
mod whitespace;

const MAX_URL_DECODE_ITERATIONS: usize = 8;

/// Canonicalizes `s` through seven ordered steps: escape decoding, Unicode
/// fold, entity decode, percent-decode, whitespace unification, zero-width
/// sweep, and a final trim.
#[must_use]
pub fn canonicalize(s: &str) -> String {
    let out = decode_backslash_escapes(s);
    let out = fold::fold_unicode(&out);
    let out = entities::decode_html_entities(&out);
    let out = url::decode_guarded(&out, MAX_URL_DECODE_ITERATIONS);
    let out = fold::fold_unicode(&out); // step 5: decoding may reveal fullwidth chars
    let out = whitespace::unify(&out);
    whitespace::strip_zero_width(&out)
}

/// Step 1: decodes literal `\uXXXX` and `\xNN` escape sequences.
///
/// These are backslash-escape *text* appearing inside an already-decoded
/// string value, not JSON string escapes (`serde_json` resolved those
/// already) — an attacker embeds the literal characters `\`, `u`, and four
/// hex digits to smuggle a character past filters that only scan raw bytes.
fn decode_backslash_escapes(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            match chars[i + 1] {
                'u' if i + 5 < chars.len() => {
                    if let Some(c) = parse_hex_escape(&chars[i + 2..i + 6]) {
                        out.push(c);
                        i += 6;
                        continue;
                    }
                }
                'x' if i + 3 < chars.len() => {
                    if let Some(c) = parse_hex_escape(&chars[i + 2..i + 4]) {
                        out.push(c);
                        i += 4;
                        continue;
                    }
                }
                _ => {}
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn parse_hex_escape(digits: &[char]) -> Option<char> {
    let s: String = digits.iter().collect();
    u32::from_str_radix(&s, 16)
        .ok()
        .and_then(char::from_u32)
}
