//! ReDoS-safe catalog admission.
//!
//! `regex`'s own engine is a finite automaton, not a backtracker, so it
//! cannot itself be driven into catastrophic-backtracking blowup. We still
//! reject catalog entries that *look* like classic ReDoS shapes — nested
//! unbounded quantifiers such as `(a+)+` or `(.*)*` — on the theory that a
//! pattern authored carelessly enough to have that shape was probably copied
//! from somewhere that does backtrack, and is a maintenance smell either way
//! (per the catalog-admission notes). This runs once, at catalog
//! build time, over `regex-syntax`'s parsed HIR rather than the source text,
//! so it isn't fooled by whitespace or alternate quantifier spellings.

use regex_syntax::hir::{Hir, HirKind};
use regex_syntax::Parser;

/// Parses `pattern` and rejects it if its HIR contains an unbounded
/// repetition (`*`, `+`, or `{n,}`) nested inside another unbounded
/// repetition.
pub(crate) fn require_redos_safe(pattern: &str) -> Result<(), String> {
    let hir = Parser::new()
        .parse(pattern)
        .map_err(|e| format!("pattern does not parse: {e}"))?;
    let mut found = false;
    scan(&hir, false, &mut found);
    if found {
        return Err(format!(
            "pattern `{pattern}` contains a nested unbounded quantifier (ReDoS shape)"
        ));
    }
    Ok(())
}

fn scan(hir: &Hir, inside_unbounded: bool, found: &mut bool) {
    if *found {
        return;
    }
    match hir.kind() {
        HirKind::Repetition(rep) => {
            let unbounded = rep.max.is_none();
            if unbounded && inside_unbounded {
                *found = true;
                return;
            }
            scan(&rep.sub, inside_unbounded || unbounded, found);
        }
        HirKind::Capture(cap) => scan(&cap.sub, inside_unbounded, found),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => {
            for sub in subs {
                scan(sub, inside_unbounded, found);
            }
        }
        HirKind::Empty | HirKind::Literal(_) | HirKind::Class(_) | HirKind::Look(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_patterns() {
        require_redos_safe(r"\.\./").unwrap();
        require_redos_safe(r"(?i)select\s+.*\s+from").unwrap();
        require_redos_safe(r"[A-Za-z0-9+/]{20,}={0,2}").unwrap();
    }

    #[test]
    fn rejects_nested_unbounded_quantifiers() {
        assert!(require_redos_safe(r"(a+)+").is_err());
        assert!(require_redos_safe(r"(.*)*").is_err());
        assert!(require_redos_safe(r"(a*)+b").is_err());
    }

    #[test]
    fn accepts_single_unbounded_quantifier_inside_group() {
        require_redos_safe(r"(abc+)").unwrap();
        require_redos_safe(r"(?:foo|bar)+").unwrap();
    }

    #[test]
    fn rejects_invalid_syntax_instead_of_panicking() {
        assert!(require_redos_safe(r"(unterminated").is_err());
    }
}
