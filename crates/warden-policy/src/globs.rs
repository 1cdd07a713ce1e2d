//! Compiles a `denyGlobs` pattern into an anchored regex matching against
//! a normalized forward-slash path. Only `*` (any run of characters) and
//! `?` (single character) are
//! glob metacharacters here — there is no brace/bracket expansion, matching
//! the narrow deny-path use case this exists for.

use regex::Regex;

/// Compiles `glob` into an anchored, case-sensitive regex.
///
/// # Errors
///
/// Returns the underlying `regex` compile error if the translated pattern is
/// somehow invalid (should not happen for any input, since every
/// non-metacharacter is escaped before being embedded).
pub fn compile_deny_glob(glob: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(glob.len() * 2 + 2);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => {
                pattern.push_str(&regex::escape(&c.to_string()));
            }
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
}
