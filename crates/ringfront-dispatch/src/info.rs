//! `GET /info` (spec §4.1, §6 "Introspection"): a document describing
//! registered capabilities. Sections named in `disallowed_sections` are
//! suppressed unless the request carries a valid HMAC over the query
//! string, signed with `admin_key` (spec §8 scenario 5).

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// One top-level section of the info document (e.g. `"swift"`,
/// `"endpoints"`, `"tempurl"`). Capability payload is an opaque JSON-ish
/// string blob here — actual capability reporting lives in each
/// collaborating middleware, out of scope for this crate.
#[derive(Debug, Clone)]
pub struct InfoDocument {
    sections: BTreeMap<String, String>,
}

impl InfoDocument {
    pub fn new() -> Self {
        Self {
            sections: BTreeMap::new(),
        }
    }

    pub fn with_section(mut self, name: impl Into<String>, payload: impl Into<String>) -> Self {
        self.sections.insert(name.into(), payload.into());
        self
    }

    /// Renders the document, omitting any section named in
    /// `disallowed_sections` unless `signature` is a valid HMAC-SHA256 of
    /// `signed_payload` under `admin_key`.
    pub fn render(
        &self,
        disallowed_sections: &[String],
        admin_key: Option<&str>,
        signed_payload: &str,
        signature: Option<&str>,
    ) -> String {
        let privileged = match (admin_key, signature) {
            (Some(key), Some(sig)) => verify_signature(key, signed_payload, sig),
            _ => false,
        };

        let mut rendered = String::from("{");
        let mut first = true;
        for (name, payload) in &self.sections {
            if !privileged && disallowed_sections.iter().any(|d| d == name) {
                continue;
            }
            if !first {
                rendered.push(',');
            }
            first = false;
            rendered.push_str(&format!("\"{name}\":{payload}"));
        }
        rendered.push('}');
        rendered
    }
}

impl Default for InfoDocument {
    fn default() -> Self {
        Self::new()
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex-encoded HMAC-SHA256 of `payload` under `key`, the same
/// way a caller is expected to sign a privileged `/info` request.
pub fn sign(key: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn verify_signature(key: &str, payload: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&provided).is_ok()
}
