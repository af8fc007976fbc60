//! Config parse/validation errors (spec §6 DSL grammars, §2 option table).

use thiserror::Error;

/// Errors raised while parsing or validating the gateway's config option
/// table. Every variant is an init-time failure — the design notes call for
/// rejecting unknown DSL forms "at init, not at first use."
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `request_node_count` / `write_affinity_node_count` did not match
    /// either the bare-integer or `N * replicas` grammar.
    #[error("invalid node count expression {0:?}: expected an integer or \"N * replicas\"")]
    InvalidNodeCount(String),

    /// A `read_affinity` or `write_affinity` rule did not match the
    /// `r<region>[z<zone>]` grammar.
    #[error("invalid affinity rule {0:?}: expected r<region> or r<region>z<zone>")]
    InvalidAffinityRule(String),

    /// A `read_affinity` rule's priority segment was not an integer.
    #[error("invalid affinity priority in rule {0:?}: {1}")]
    InvalidAffinityPriority(String, String),

    /// A boolean-valued option had a value other than yes/no/true/false/1/0.
    #[error("invalid boolean value {1:?} for option {0:?}")]
    InvalidBool(String, String),

    /// An integer-valued option failed to parse.
    #[error("invalid integer value {1:?} for option {0:?}: {2}")]
    InvalidInt(String, String, String),

    /// A float-valued option failed to parse.
    #[error("invalid float value {1:?} for option {0:?}: {2}")]
    InvalidFloat(String, String, String),

    /// `sorting_method` was not one of shuffle/timing/affinity.
    #[error("invalid sorting_method {0:?}: expected shuffle, timing, or affinity")]
    InvalidSortingMethod(String),

    /// `admin_key` was set but empty, or a signature check was requested
    /// with no `admin_key` configured.
    #[error("admin_key required for privileged /info access but none configured")]
    MissingAdminKey,

    /// Reading or parsing a TOML config file failed.
    #[cfg(feature = "toml")]
    #[error("failed to read config file {0:?}: {1}")]
    Io(String, String),

    /// Deserializing TOML config content failed.
    #[cfg(feature = "toml")]
    #[error("failed to parse config file {0:?}: {1}")]
    TomlParse(String, String),
}
