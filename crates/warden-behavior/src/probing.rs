//! The probing-method-name heuristic: method names that look like an
//! attacker enumerating the surface rather than using it. This runs last
//! among the behavior layer's checks.

use std::sync::OnceLock;

use regex::Regex;

const SENSITIVE_SUBSTRINGS: &[&str] = &["admin", "secret", "key", "config"];

fn probing_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(test|probe|check|scan|enum)").expect("static probing regex is valid"))
}

/// Returns `true` if `method` reads like a reconnaissance probe: a
/// `test`/`probe`/`check`/`scan`/`enum` prefix, or a sensitive-sounding
/// substring (`admin`, `secret`, `key`, `config`) anywhere in the name.
pub(crate) fn looks_like_probing(method: &str) -> bool {
    probing_prefix().is_match(method) || {
        let lower = method.to_ascii_lowercase();
        SENSITIVE_SUBSTRINGS.iter().any(|s| lower.contains(s))
    }
}
