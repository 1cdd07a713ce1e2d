//! Step 3 of the content layer: CSS attack pattern validation.
//!
//! Two shapes specifically, ahead of the general catalog scan: the IE-era
//! `expression(...)` binding (arbitrary script execution from a stylesheet)
//! and a `javascript:`/`vbscript:` scheme smuggled inside `url(...)` rather
//! than as a bare string, which a naive scheme check on the raw value would
//! miss.

use warden_proto::{Severity, ViolationType};

pub(crate) type Finding = (ViolationType, Severity, String, f64);

pub(crate) fn scan(canonical: &str) -> Option<Finding> {
    let lower = canonical.to_ascii_lowercase();
    if lower.contains("expression(") {
        return Some((
            ViolationType::CssInjection,
            Severity::High,
            "CSS expression() binding detected".to_string(),
            0.85,
        ));
    }
    if let Some(scheme) = scan_url_bodies(&lower) {
        return Some((
            ViolationType::CssInjection,
            Severity::High,
            format!("CSS url() carries a `{scheme}` scheme"),
            0.85,
        ));
    }
    None
}

fn scan_url_bodies(lower: &str) -> Option<&'static str> {
    let mut start = 0;
    while let Some(idx) = lower[start..].find("url(") {
        let abs = start + idx + 4;
        if abs >= lower.len() {
            break;
        }
        let end = lower[abs..].find(')').map_or(lower.len(), |e| abs + e);
        let body = lower[abs..end].trim_matches(|c| c == '"' || c == '\'' || c == ' ');
        if body.starts_with("javascript:") {
            return Some("javascript:");
        }
        if body.starts_with("vbscript:") {
            return Some("vbscript:");
        }
        start = end.max(abs + 1);
        if start >= lower.len() {
            break;
        }
    }
    None
}
