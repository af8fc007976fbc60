//! The gateway's enumerated config option table (spec §6) and its DSL
//! compilation (`request_node_count`, `read_affinity`, `write_affinity`,
//! `write_affinity_node_count`).
//!
//! Two load paths: [`GatewayConfig::from_map`] mirrors the original's plain
//! `conf` dict; with the `toml` feature, [`GatewayConfig::from_toml_file`]
//! loads the same option table from a file on disk. Both funnel through the
//! same validation, so a malformed DSL expression is rejected at load time
//! regardless of source.

pub mod config;
pub mod dsl;
pub mod error;

pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use dsl::{NodeCountExpr, ReadAffinity, WriteAffinity};
pub use error::ConfigError;
