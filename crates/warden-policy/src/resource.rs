//! `resources/read` checks: URI shape, scheme allowlist,
//! file-path containment, host allowlist, and an egress-size estimate.

use std::path::{Path, PathBuf};

use crate::types::ResourcePolicy;

pub(crate) enum ResourceFailure {
    Policy(String),
    Egress(String),
}

/// Runs every `resources/read` check against `uri`. `uri` must already be
/// canonicalized by the caller — canonicalization correctness is what every
/// content-adjacent check in this workspace relies on.
pub(crate) fn check(uri: &str, policy: &ResourcePolicy, base_dir: Option<&Path>) -> Option<ResourceFailure> {
    if let Some(max) = policy.max_uri_length {
        if uri.chars().count() > max {
            return Some(ResourceFailure::Policy(format!("uri length {} exceeds max {max}", uri.chars().count())));
        }
    }

    let (scheme, rest) = split_scheme(uri);
    if !policy.allowed_schemes.iter().any(|s| s == &scheme) {
        return Some(ResourceFailure::Policy(format!("scheme {scheme:?} is not in the allowed scheme list")));
    }

    match scheme.as_str() {
        "file" => {
            if let Some(failure) = check_file_path(rest, policy, base_dir) {
                return Some(failure);
            }
        }
        "http" | "https" => {
            if let Some(failure) = check_host(uri, policy) {
                return Some(failure);
            }
        }
        _ => {}
    }

    if let Some(max) = policy.max_read_bytes {
        let estimated = (policy.estimated_read_bytes)(uri.chars().count());
        if estimated > max {
            return Some(ResourceFailure::Egress(format!("estimated read of {estimated} bytes exceeds max {max}")));
        }
    }

    None
}

/// Splits `scheme://rest` into its parts; a URI with no `://` is assumed to
/// be a bare filesystem path with an implicit `file` scheme, per spec.
fn split_scheme(uri: &str) -> (String, &str) {
    match uri.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("file".to_string(), uri),
    }
}

fn check_file_path(rest: &str, policy: &ResourcePolicy, base_dir: Option<&Path>) -> Option<ResourceFailure> {
    let raw = PathBuf::from(rest);
    let absolute = if raw.is_absolute() {
        raw
    } else {
        base_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
            .join(raw)
    };
    let normalized = normalize_lexical(&absolute);
    let normalized_str = to_forward_slash(&normalized);

    if let Some(max) = policy.max_path_length {
        if normalized_str.chars().count() > max {
            return Some(ResourceFailure::Policy(format!("resolved path length exceeds max {max}")));
        }
    }

    if let Some(roots) = &policy.root_dirs {
        let under_some_root = roots.iter().any(|root| {
            let root_str = to_forward_slash(root);
            normalized_str == root_str || normalized_str.starts_with(&format!("{root_str}/"))
        });
        if !under_some_root {
            return Some(ResourceFailure::Policy(format!("resolved path {normalized_str:?} is outside every configured root dir")));
        }
    }

    if let Some(globs) = &policy.deny_globs {
        if globs.iter().any(|g| g.is_match(&normalized_str)) {
            return Some(ResourceFailure::Policy(format!("resolved path {normalized_str:?} matches a deny glob")));
        }
    }

    None
}

fn check_host(uri: &str, policy: &ResourcePolicy) -> Option<ResourceFailure> {
    let Some(allowed_hosts) = &policy.allowed_hosts else {
        return None;
    };
    let Ok(parsed) = url::Url::parse(uri) else {
        return Some(ResourceFailure::Policy(format!("{uri:?} is not a parseable URL")));
    };
    let Some(host) = parsed.host_str() else {
        return Some(ResourceFailure::Policy("URL has no host".to_string()));
    };
    if allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        None
    } else {
        Some(ResourceFailure::Policy(format!("host {host:?} is not in the allowed host list")))
    }
}

/// Collapses `.`/`..` segments without touching the filesystem — the path
/// need not exist for this check to be meaningful, and a syscall-based
/// canonicalize would fail outright for a nonexistent target.
fn normalize_lexical(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::Normal(_) => out.push(component.as_os_str()),
        }
    }
    out
}

fn to_forward_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
        .replacen("//", "/", 1)
}
