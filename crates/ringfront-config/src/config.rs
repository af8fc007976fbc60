//! The enumerated gateway config option table (spec §6) and its two load
//! paths: a plain string map (mirrors the original's `conf` dict) and,
//! additionally, a TOML file on disk via `serde`/`toml` — a production
//! front door is configured from a file, not hand-built in code.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ringfront_health::SuppressionConfig;
use ringfront_selector::SortingMethod;

use crate::dsl::{NodeCountExpr, ReadAffinity, WriteAffinity};
use crate::error::ConfigError;

/// The fully validated, compiled gateway configuration. Every field here
/// corresponds to one row of spec §6's option table; DSL-valued options are
/// already-compiled ADTs, not stored strings.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Where rings and the mime-type table live (spec's `swift_dir`). Both
    /// collaborators are out of scope for this crate; the path is threaded
    /// through for whoever loads them.
    pub ring_dir: PathBuf,
    pub node_timeout: Duration,
    pub conn_timeout: Duration,
    pub client_timeout: Duration,
    pub put_queue_depth: usize,
    pub object_chunk_size: usize,
    pub client_chunk_size: usize,
    pub post_quorum_timeout: Duration,
    pub suppression: SuppressionConfig,
    pub recheck_container_existence: Duration,
    pub recheck_account_existence: Duration,
    pub allow_account_management: bool,
    pub object_post_as_copy: bool,
    pub account_autocreate: bool,
    pub max_containers_per_account: usize,
    pub max_containers_whitelist: Vec<String>,
    pub deny_host_headers: Vec<String>,
    pub log_handoffs: bool,
    pub cors_allow_origin: Vec<String>,
    pub sorting_method: SortingMethod,
    pub timing_expiry: Duration,
    pub request_node_count: NodeCountExpr,
    pub read_affinity: ReadAffinity,
    pub write_affinity: WriteAffinity,
    pub write_affinity_node_count: NodeCountExpr,
    pub expose_info: bool,
    pub disallowed_sections: Vec<String>,
    pub admin_key: Option<String>,
    pub trans_id_suffix: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ring_dir: PathBuf::from("/etc/ringfront"),
            node_timeout: Duration::from_secs(10),
            conn_timeout: Duration::from_millis(500),
            client_timeout: Duration::from_secs(60),
            put_queue_depth: 10,
            object_chunk_size: 65536,
            client_chunk_size: 65536,
            post_quorum_timeout: Duration::from_millis(500),
            suppression: SuppressionConfig::default(),
            recheck_container_existence: Duration::from_secs(60),
            recheck_account_existence: Duration::from_secs(60),
            allow_account_management: false,
            object_post_as_copy: true,
            account_autocreate: false,
            max_containers_per_account: 0,
            max_containers_whitelist: Vec::new(),
            deny_host_headers: Vec::new(),
            log_handoffs: true,
            cors_allow_origin: Vec::new(),
            sorting_method: SortingMethod::default(),
            timing_expiry: Duration::from_secs(300),
            request_node_count: NodeCountExpr::TimesReplicas(2),
            read_affinity: ReadAffinity::default(),
            write_affinity: WriteAffinity::default(),
            write_affinity_node_count: NodeCountExpr::TimesReplicas(2),
            expose_info: true,
            disallowed_sections: Vec::new(),
            admin_key: None,
            trans_id_suffix: String::new(),
        }
    }
}

impl GatewayConfig {
    /// Starts a builder seeded with spec defaults.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }

    /// Parses config from a plain string map, mirroring the original's
    /// `conf` dict. Keys not present fall back to the documented default;
    /// unparseable values are a fatal [`ConfigError`].
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut cfg = GatewayConfig::default();

        if let Some(v) = map.get("swift_dir").or_else(|| map.get("ring_dir")) {
            cfg.ring_dir = PathBuf::from(v);
        }
        if let Some(v) = map.get("node_timeout") {
            cfg.node_timeout = Duration::from_secs(parse_int("node_timeout", v)?);
        }
        if let Some(v) = map.get("conn_timeout") {
            cfg.conn_timeout = parse_duration_float("conn_timeout", v)?;
        }
        if let Some(v) = map.get("client_timeout") {
            cfg.client_timeout = Duration::from_secs(parse_int("client_timeout", v)?);
        }
        if let Some(v) = map.get("put_queue_depth") {
            cfg.put_queue_depth = parse_int("put_queue_depth", v)? as usize;
        }
        if let Some(v) = map.get("object_chunk_size") {
            cfg.object_chunk_size = parse_int("object_chunk_size", v)? as usize;
        }
        if let Some(v) = map.get("client_chunk_size") {
            cfg.client_chunk_size = parse_int("client_chunk_size", v)? as usize;
        }
        if let Some(v) = map.get("post_quorum_timeout") {
            cfg.post_quorum_timeout = parse_duration_float("post_quorum_timeout", v)?;
        }
        if let Some(v) = map.get("error_suppression_interval") {
            cfg.suppression.error_suppression_interval =
                Duration::from_secs(parse_int("error_suppression_interval", v)?);
        }
        if let Some(v) = map.get("error_suppression_limit") {
            cfg.suppression.error_suppression_limit =
                parse_int("error_suppression_limit", v)? as u32;
        }
        if let Some(v) = map.get("recheck_container_existence") {
            cfg.recheck_container_existence =
                Duration::from_secs(parse_int("recheck_container_existence", v)?);
        }
        if let Some(v) = map.get("recheck_account_existence") {
            cfg.recheck_account_existence =
                Duration::from_secs(parse_int("recheck_account_existence", v)?);
        }
        if let Some(v) = map.get("allow_account_management") {
            cfg.allow_account_management = parse_bool("allow_account_management", v)?;
        }
        if let Some(v) = map.get("object_post_as_copy") {
            cfg.object_post_as_copy = parse_bool("object_post_as_copy", v)?;
        }
        if let Some(v) = map.get("account_autocreate") {
            cfg.account_autocreate = parse_bool("account_autocreate", v)?;
        }
        if let Some(v) = map.get("max_containers_per_account") {
            cfg.max_containers_per_account = parse_int("max_containers_per_account", v)? as usize;
        }
        if let Some(v) = map.get("max_containers_whitelist") {
            cfg.max_containers_whitelist = parse_csv(v);
        }
        if let Some(v) = map.get("deny_host_headers") {
            cfg.deny_host_headers = parse_csv(v);
        }
        if let Some(v) = map.get("log_handoffs") {
            cfg.log_handoffs = parse_bool("log_handoffs", v)?;
        }
        if let Some(v) = map.get("cors_allow_origin") {
            cfg.cors_allow_origin = parse_csv(v);
        }
        if let Some(v) = map.get("timing_expiry") {
            cfg.timing_expiry = Duration::from_secs(parse_int("timing_expiry", v)?);
        }
        if let Some(v) = map.get("request_node_count") {
            cfg.request_node_count = NodeCountExpr::parse(v)?;
        }
        if let Some(v) = map.get("write_affinity_node_count") {
            cfg.write_affinity_node_count = NodeCountExpr::parse(v)?;
        }
        if let Some(v) = map.get("read_affinity") {
            cfg.read_affinity = ReadAffinity::parse(v)?;
        }
        if let Some(v) = map.get("write_affinity") {
            cfg.write_affinity = WriteAffinity::parse(v)?;
        }
        if let Some(v) = map.get("expose_info") {
            cfg.expose_info = parse_bool("expose_info", v)?;
        }
        if let Some(v) = map.get("disallowed_sections") {
            cfg.disallowed_sections = parse_csv(v);
        }
        if let Some(v) = map.get("admin_key") {
            cfg.admin_key = if v.is_empty() { None } else { Some(v.clone()) };
        }
        if let Some(v) = map.get("trans_id_suffix") {
            cfg.trans_id_suffix = v.clone();
        }

        // sorting_method is resolved last: an `affinity` selection needs the
        // already-parsed read_affinity rules.
        if let Some(v) = map.get("sorting_method") {
            cfg.sorting_method = match v.trim() {
                "shuffle" => SortingMethod::Shuffle,
                "timing" => SortingMethod::Timing,
                "affinity" => SortingMethod::Affinity(Arc::new(cfg.read_affinity.clone())),
                other => return Err(ConfigError::InvalidSortingMethod(other.to_string())),
            };
        }

        Ok(cfg)
    }

    /// Loads and validates config from a TOML file on disk.
    #[cfg(feature = "toml")]
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    #[cfg(feature = "toml")]
    fn from_toml_str(text: &str, source: &str) -> Result<Self, ConfigError> {
        let raw: RawGatewayConfig = toml::from_str(text)
            .map_err(|e| ConfigError::TomlParse(source.to_string(), e.to_string()))?;
        let map: HashMap<String, String> = raw.into_map();
        Self::from_map(&map)
    }
}

/// A typed, programmatic builder for [`GatewayConfig`]. Unlike
/// [`GatewayConfig::from_map`], every setter here takes an already-typed
/// value, so building never fails — use this from code, use `from_map` /
/// `from_toml_file` when config arrives as strings.
#[derive(Clone)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
        }
    }

    pub fn ring_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.ring_dir = dir.into();
        self
    }

    pub fn node_timeout(mut self, d: Duration) -> Self {
        self.config.node_timeout = d;
        self
    }

    pub fn conn_timeout(mut self, d: Duration) -> Self {
        self.config.conn_timeout = d;
        self
    }

    pub fn client_timeout(mut self, d: Duration) -> Self {
        self.config.client_timeout = d;
        self
    }

    pub fn suppression(mut self, suppression: SuppressionConfig) -> Self {
        self.config.suppression = suppression;
        self
    }

    pub fn sorting_method(mut self, method: SortingMethod) -> Self {
        self.config.sorting_method = method;
        self
    }

    pub fn timing_expiry(mut self, d: Duration) -> Self {
        self.config.timing_expiry = d;
        self
    }

    pub fn request_node_count(mut self, expr: NodeCountExpr) -> Self {
        self.config.request_node_count = expr;
        self
    }

    pub fn write_affinity_node_count(mut self, expr: NodeCountExpr) -> Self {
        self.config.write_affinity_node_count = expr;
        self
    }

    pub fn read_affinity(mut self, affinity: ReadAffinity) -> Self {
        self.config.read_affinity = affinity;
        self
    }

    pub fn write_affinity(mut self, affinity: WriteAffinity) -> Self {
        self.config.write_affinity = affinity;
        self
    }

    pub fn log_handoffs(mut self, on: bool) -> Self {
        self.config.log_handoffs = on;
        self
    }

    pub fn deny_host_headers(mut self, hosts: Vec<String>) -> Self {
        self.config.deny_host_headers = hosts;
        self
    }

    pub fn expose_info(mut self, on: bool) -> Self {
        self.config.expose_info = on;
        self
    }

    pub fn disallowed_sections(mut self, sections: Vec<String>) -> Self {
        self.config.disallowed_sections = sections;
        self
    }

    pub fn admin_key(mut self, key: impl Into<String>) -> Self {
        self.config.admin_key = Some(key.into());
        self
    }

    pub fn trans_id_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.trans_id_suffix = suffix.into();
        self
    }

    pub fn build(self) -> GatewayConfig {
        self.config
    }
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirrors [`GatewayConfig`]'s string-valued options for TOML deserialization
/// via `serde`; every field is optional so a config file only needs to
/// mention what it overrides. Validation and DSL compilation happen in
/// [`GatewayConfig::from_map`], which this is funneled through.
#[cfg(feature = "toml")]
#[derive(serde::Deserialize, Default)]
struct RawGatewayConfig {
    swift_dir: Option<String>,
    node_timeout: Option<String>,
    conn_timeout: Option<String>,
    client_timeout: Option<String>,
    put_queue_depth: Option<String>,
    object_chunk_size: Option<String>,
    client_chunk_size: Option<String>,
    post_quorum_timeout: Option<String>,
    error_suppression_interval: Option<String>,
    error_suppression_limit: Option<String>,
    recheck_container_existence: Option<String>,
    recheck_account_existence: Option<String>,
    allow_account_management: Option<String>,
    object_post_as_copy: Option<String>,
    account_autocreate: Option<String>,
    max_containers_per_account: Option<String>,
    max_containers_whitelist: Option<String>,
    deny_host_headers: Option<String>,
    log_handoffs: Option<String>,
    cors_allow_origin: Option<String>,
    sorting_method: Option<String>,
    timing_expiry: Option<String>,
    request_node_count: Option<String>,
    read_affinity: Option<String>,
    write_affinity: Option<String>,
    write_affinity_node_count: Option<String>,
    expose_info: Option<String>,
    disallowed_sections: Option<String>,
    admin_key: Option<String>,
    trans_id_suffix: Option<String>,
}

#[cfg(feature = "toml")]
impl RawGatewayConfig {
    fn into_map(self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        macro_rules! insert {
            ($field:ident) => {
                if let Some(v) = self.$field {
                    map.insert(stringify!($field).to_string(), v);
                }
            };
        }
        insert!(swift_dir);
        insert!(node_timeout);
        insert!(conn_timeout);
        insert!(client_timeout);
        insert!(put_queue_depth);
        insert!(object_chunk_size);
        insert!(client_chunk_size);
        insert!(post_quorum_timeout);
        insert!(error_suppression_interval);
        insert!(error_suppression_limit);
        insert!(recheck_container_existence);
        insert!(recheck_account_existence);
        insert!(allow_account_management);
        insert!(object_post_as_copy);
        insert!(account_autocreate);
        insert!(max_containers_per_account);
        insert!(max_containers_whitelist);
        insert!(deny_host_headers);
        insert!(log_handoffs);
        insert!(cors_allow_origin);
        insert!(sorting_method);
        insert!(timing_expiry);
        insert!(request_node_count);
        insert!(read_affinity);
        insert!(write_affinity);
        insert!(write_affinity_node_count);
        insert!(expose_info);
        insert!(disallowed_sections);
        insert!(admin_key);
        insert!(trans_id_suffix);
        map
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool(key.to_string(), value.to_string())),
    }
}

fn parse_int(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidInt(key.to_string(), value.to_string(), e.to_string()))
}

fn parse_duration_float(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| {
            ConfigError::InvalidFloat(key.to_string(), value.to_string(), e.to_string())
        })?;
    Ok(Duration::from_secs_f64(seconds))
}

fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
