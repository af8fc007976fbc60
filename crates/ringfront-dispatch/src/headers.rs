//! Header sanitation (spec §3 invariants 4-5, §6's reserved prefix, §4.5
//! steps 2-3). `http::HeaderName` always stores and compares names
//! lowercased, so a literal prefix match is already case-insensitive.

use std::net::IpAddr;

use http::{HeaderMap, HeaderValue};

const BACKEND_PREFIX: &str = "x-backend-";
const STORAGE_TOKEN: &str = "x-storage-token";
const AUTH_TOKEN: &str = "x-auth-token";
const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Strips every header whose name begins with `x-backend-`, case
/// insensitively. Idempotent: running it twice is the same as running it
/// once, since the second pass finds nothing left to remove.
pub fn strip_backend_headers(headers: &mut HeaderMap) {
    let backend_names: Vec<_> = headers
        .keys()
        .filter(|name| name.as_str().starts_with(BACKEND_PREFIX))
        .cloned()
        .collect();

    for name in backend_names {
        headers.remove(name);
    }
}

/// If `x-storage-token` is present and `x-auth-token` is absent, copies the
/// former into the latter — both names refer to the same credential (spec
/// Invariant 5).
pub fn alias_storage_token(headers: &mut HeaderMap) {
    if headers.contains_key(AUTH_TOKEN) {
        return;
    }
    if let Some(token) = headers.get(STORAGE_TOKEN) {
        let token: HeaderValue = token.clone();
        headers.insert(AUTH_TOKEN, token);
    }
}

/// True if `host` (without port) matches any entry in `deny_list`
/// (case-insensitive).
pub fn host_is_denied(host: &str, deny_list: &[String]) -> bool {
    let bare_host = host.split(':').next().unwrap_or(host);
    deny_list
        .iter()
        .any(|denied| denied.eq_ignore_ascii_case(bare_host))
}

/// Derives the client IP from proxy headers (spec §3's request context:
/// "the client IP (derived from headers)"). Prefers the first hop in
/// `x-forwarded-for`, falling back to `x-real-ip`; `None` if neither header
/// is present or parses as an IP address.
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get(FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .and_then(|first| first.trim().parse().ok())
        {
            return Some(ip);
        }
    }
    headers
        .get(REAL_IP)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
