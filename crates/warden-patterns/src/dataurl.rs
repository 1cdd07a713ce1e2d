//! Step 2 of the content layer: `data:` URI validation.
//!
//! Three things a message is checked for here, ahead of the general pattern
//! scan: a disallowed MIME type (`text/html`, inline SVG, executables —
//! anything a client might render or execute rather than treat as inert
//! data), a base64 payload that doesn't decode (a common catalog-evasion
//! trick, since a malformed payload can't be inspected further), and a
//! base64 payload that itself decodes to another `data:` URI (nesting used
//! to defeat single-pass scanners).

use warden_proto::{Severity, ViolationType};

/// MIME types a `data:` URI is never allowed to carry, because the only
/// reason to embed them is to have a client render or execute the payload.
const DISALLOWED_MIME_PREFIXES: &[&str] = &[
    "text/html",
    "application/javascript",
    "text/javascript",
    "image/svg+xml",
    "application/x-msdownload",
    "application/x-sh",
    "application/octet-stream",
];

pub(crate) type Finding = (ViolationType, Severity, String, f64);

pub(crate) fn scan(canonical: &str) -> Option<Finding> {
    for uri in find_data_uris(canonical) {
        if let Some(finding) = check_one(uri) {
            return Some(finding);
        }
    }
    None
}

fn find_data_uris(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    while let Some(idx) = s[start..].find("data:") {
        let abs = start + idx;
        let rest = &s[abs..];
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>'))
            .unwrap_or(rest.len());
        if end > 5 {
            out.push(&rest[..end]);
        }
        start = abs + end.max(5);
        if start >= s.len() {
            break;
        }
    }
    out
}

fn check_one(uri: &str) -> Option<Finding> {
    let body = uri.strip_prefix("data:")?;
    let (header, payload) = body.split_once(',')?;
    let mime = header.split(';').next().unwrap_or("").to_ascii_lowercase();
    let is_base64 = header.to_ascii_lowercase().split(';').any(|part| part == "base64");

    if DISALLOWED_MIME_PREFIXES.iter().any(|d| mime.starts_with(d)) {
        return Some((
            ViolationType::DangerousDataUri,
            Severity::High,
            format!("data URI carries disallowed MIME type `{mime}`"),
            0.85,
        ));
    }

    if is_base64 {
        if !looks_like_base64(payload) {
            return Some((
                ViolationType::Base64Injection,
                Severity::Medium,
                "data URI base64 payload is malformed".to_string(),
                0.7,
            ));
        }
        if let Some(decoded) = base64_decode(payload) {
            if decoded.windows(5).any(|w| w == b"data:") {
                return Some((
                    ViolationType::NestedDataUri,
                    Severity::High,
                    "data URI payload decodes to another data URI".to_string(),
                    0.85,
                ));
            }
        }
    }
    None
}

fn looks_like_base64(payload: &str) -> bool {
    if payload.is_empty() || payload.len() % 4 != 0 {
        return false;
    }
    let trimmed = payload.trim_end_matches('=');
    if trimmed.is_empty() {
        return false;
    }
    trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// Minimal, tolerant base64 decoder used only to peek for a nested `data:`
/// scheme — not a general-purpose codec. Returns `None` on any invalid
/// character rather than panicking.
fn base64_decode(input: &str) -> Option<Vec<u8>> {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut rev = [255u8; 256];
    for (i, &b) in TABLE.iter().enumerate() {
        rev[b as usize] = i as u8;
    }
    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    let mut buf: u32 = 0;
    let mut bits = 0u32;
    for b in input.bytes().filter(|b| *b != b'=' && !b.is_ascii_whitespace()) {
        let v = rev[b as usize];
        if v == 255 {
            return None;
        }
        buf = (buf << 6) | u32::from(v);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buf >> bits) as u8);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_disallowed_mime_type() {
        let finding = scan("please render data:text/html;base64,PHNjcmlwdD4=").unwrap();
        assert_eq!(finding.0, ViolationType::DangerousDataUri);
    }

    #[test]
    fn flags_malformed_base64() {
        let finding = scan("data:text/plain;base64,!!!not-base64!!!").unwrap();
        assert_eq!(finding.0, ViolationType::Base64Injection);
    }

    #[test]
    fn flags_nested_data_uri() {
        // base64("data:text/plain,x") == "ZGF0YTp0ZXh0L3BsYWluLHg="
        let finding = scan("data:text/plain;base64,ZGF0YTp0ZXh0L3BsYWluLHg=").unwrap();
        assert_eq!(finding.0, ViolationType::NestedDataUri);
    }

    #[test]
    fn ignores_benign_plain_data_uri() {
        assert!(scan("data:text/plain,hello world").is_none());
    }

    #[test]
    fn ignores_message_without_data_uri() {
        assert!(scan("just a normal tool call with no data uri").is_none());
    }
}
