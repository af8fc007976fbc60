//! Transaction id generation and the authorization hook's tri-state (spec
//! §3 Request context, §4.5 steps 9/12, §9 design notes).

use std::time::{SystemTime, UNIX_EPOCH};

/// Generates a transaction id: `tx<32 lowercase hex chars>-<8 hex chars of
/// unix seconds>[-<suffix>]`. The random half is a correlation id, not a
/// credential, so a fast non-cryptographic RNG is fine.
pub fn generate_trans_id(suffix: &str) -> String {
    let mut rng = rand::rng();
    let random_bytes: [u8; 16] = rand::Rng::random(&mut rng);
    let random_hex = hex::encode(random_bytes);

    let unix_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if suffix.is_empty() {
        format!("tx{random_hex}-{unix_secs:08x}")
    } else {
        format!("tx{random_hex}-{unix_secs:08x}-{suffix}")
    }
}

/// The authorization hook's call-once, delay-denial state machine (spec §4.5
/// step 12, §9 design note: "a tri-state (`NotInstalled | Pending | Passed`)
/// on that context"). `RequestPipeline::handle_inner` sets this once per
/// request and carries it into `ControllerContext::auth_state`, where
/// `ControllerContext::reauthorize` consults `is_pending` before re-invoking
/// the hook a handler deferred via `delay_denial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthHookState {
    /// No `swift.authorize`-equivalent hook was installed by middleware.
    #[default]
    NotInstalled,
    /// A hook is installed and has not yet been invoked, or was invoked and
    /// denied with `delay_denial` set (so it remains callable again).
    Pending,
    /// The hook was invoked and returned no response: authorization
    /// succeeded and the hook must not be re-invoked for this request.
    Passed,
}

impl AuthHookState {
    /// True if a hook is installed and available to invoke (i.e. not yet
    /// passed).
    pub fn is_pending(&self) -> bool {
        matches!(self, AuthHookState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trans_id_matches_format_without_suffix() {
        let id = generate_trans_id("");
        assert!(id.starts_with("tx"));
        let rest = &id[2..];
        let mut parts = rest.split('-');
        let random_part = parts.next().unwrap();
        let time_part = parts.next().unwrap();
        assert_eq!(random_part.len(), 32);
        assert!(random_part.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(time_part.len(), 8);
        assert!(time_part.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(parts.next().is_none());
    }

    #[test]
    fn trans_id_appends_configured_suffix() {
        let id = generate_trans_id("region1");
        assert!(id.ends_with("-region1"));
    }

    #[test]
    fn trans_ids_are_not_repeated() {
        assert_ne!(generate_trans_id(""), generate_trans_id(""));
    }

    #[test]
    fn default_auth_hook_state_is_not_installed() {
        assert_eq!(AuthHookState::default(), AuthHookState::NotInstalled);
        assert!(!AuthHookState::NotInstalled.is_pending());
    }
}
