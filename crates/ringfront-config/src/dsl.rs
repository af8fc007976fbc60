//! Config DSL compilation (spec §6): `request_node_count` /
//! `write_affinity_node_count` compile to [`NodeCountExpr`]; `read_affinity`
//! compiles to [`ReadAffinity`]; `write_affinity` compiles to
//! [`WriteAffinity`]. Per the design notes, each DSL is small enough to parse
//! into a closed algebraic data type rather than a stored function, and is
//! rejected at compile (config load) time rather than at first use.

use ringfront_core::Node;
use ringfront_selector::{AffinityPriority, SortKey};

use crate::error::ConfigError;

/// A compiled `request_node_count` / `write_affinity_node_count` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCountExpr {
    /// A bare non-negative integer.
    Constant(usize),
    /// The three-token form `N * replicas`.
    TimesReplicas(usize),
}

impl NodeCountExpr {
    /// Parses the DSL's two accepted grammars:
    /// - a bare non-negative integer (`"6"`)
    /// - `N * replicas` (`"2 * replicas"`)
    ///
    /// Any other form is a fatal init error.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<usize>() {
            return Ok(NodeCountExpr::Constant(n));
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() == 3 && tokens[1] == "*" && tokens[2] == "replicas" {
            if let Ok(n) = tokens[0].parse::<usize>() {
                return Ok(NodeCountExpr::TimesReplicas(n));
            }
        }

        Err(ConfigError::InvalidNodeCount(s.to_string()))
    }

    /// Evaluates this expression against a ring's replica count.
    pub fn evaluate(&self, replica_count: usize) -> usize {
        match self {
            NodeCountExpr::Constant(n) => *n,
            NodeCountExpr::TimesReplicas(n) => n * replica_count,
        }
    }
}

/// A single `r<region>[z<zone>]` affinity rule, with an optional priority
/// (present for `read_affinity`, absent for `write_affinity`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AffinityRule {
    region: u32,
    zone: Option<u32>,
    priority: AffinityPriority,
}

impl AffinityRule {
    fn matches(&self, node: &Node) -> bool {
        if node.region != Some(self.region) {
            return false;
        }
        match self.zone {
            Some(z) => node.zone == Some(z),
            None => true,
        }
    }

    /// Parses the `r<region>[z<zone>]` portion common to both affinity
    /// grammars, returning the remaining region/zone and the unparsed tail.
    fn parse_locality(spec: &str, raw: &str) -> Result<(u32, Option<u32>), ConfigError> {
        let rest = spec
            .strip_prefix('r')
            .ok_or_else(|| ConfigError::InvalidAffinityRule(raw.to_string()))?;

        let (region_str, zone_str) = match rest.split_once('z') {
            Some((region, zone)) => (region, Some(zone)),
            None => (rest, None),
        };

        let region: u32 = region_str
            .parse()
            .map_err(|_| ConfigError::InvalidAffinityRule(raw.to_string()))?;
        let zone = zone_str
            .map(|z| z.parse::<u32>())
            .transpose()
            .map_err(|_| ConfigError::InvalidAffinityRule(raw.to_string()))?;

        Ok((region, zone))
    }
}

/// The sentinel priority given to a node matched by no `read_affinity` rule:
/// sorts behind every matched node.
const AFFINITY_SENTINEL: AffinityPriority = AffinityPriority::MAX;

/// Compiled `read_affinity` DSL: an ordered rule list, each mapping a
/// `(region, zone)` locality to a priority (lower sorts first). A node
/// matched by no rule gets [`AFFINITY_SENTINEL`].
#[derive(Debug, Clone, Default)]
pub struct ReadAffinity {
    rules: Vec<AffinityRule>,
}

impl ReadAffinity {
    /// Parses a comma-separated list of `r<region>[z<zone>]=<priority>`
    /// rules, e.g. `"r1=100, r2z1=200, r2z2=200"`. An empty string compiles
    /// to a ruleset that gives every node the sentinel priority (all nodes
    /// tie, so the prior shuffle fully decides order).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(ReadAffinity::default());
        }

        let mut rules = Vec::new();
        for raw_rule in trimmed.split(',') {
            let raw_rule = raw_rule.trim();
            let (locality, priority_str) = raw_rule
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidAffinityRule(raw_rule.to_string()))?;

            let (region, zone) = AffinityRule::parse_locality(locality.trim(), raw_rule)?;
            let priority: AffinityPriority = priority_str.trim().parse().map_err(|e| {
                ConfigError::InvalidAffinityPriority(raw_rule.to_string(), format!("{e}"))
            })?;

            rules.push(AffinityRule {
                region,
                zone,
                priority,
            });
        }

        Ok(ReadAffinity { rules })
    }

    /// True if no rules were configured (the default, empty `read_affinity`).
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolves a node's priority: the first matching rule's priority, or
    /// the sentinel if none match.
    pub fn priority(&self, node: &Node) -> AffinityPriority {
        self.rules
            .iter()
            .find(|rule| rule.matches(node))
            .map(|rule| rule.priority)
            .unwrap_or(AFFINITY_SENTINEL)
    }
}

impl SortKey for ReadAffinity {
    fn priority(&self, node: &Node) -> AffinityPriority {
        ReadAffinity::priority(self, node)
    }
}

/// Compiled `write_affinity` DSL: a predicate deciding whether a node is
/// "local" for write placement, with no priority component.
#[derive(Debug, Clone, Default)]
pub struct WriteAffinity {
    rules: Vec<AffinityRule>,
}

impl WriteAffinity {
    /// Parses a comma-separated list of bare `r<region>[z<zone>]` rules
    /// (no `=priority` suffix). An empty string compiles to a predicate that
    /// matches nothing, i.e. write affinity is disabled.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(WriteAffinity::default());
        }

        let mut rules = Vec::new();
        for raw_rule in trimmed.split(',') {
            let raw_rule = raw_rule.trim();
            let (region, zone) = AffinityRule::parse_locality(raw_rule, raw_rule)?;
            rules.push(AffinityRule {
                region,
                zone,
                priority: 0,
            });
        }

        Ok(WriteAffinity { rules })
    }

    /// True if no rules were configured (write affinity disabled).
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if `node` matches any configured locality rule.
    ///
    /// Application of this predicate (preferring locals, falling back to
    /// non-locals) is the write path's job, which lives inside the opaque
    /// controllers (spec §1's Non-goals) and so isn't wired in here the way
    /// `read_affinity` is wired into `SortingMethod::Affinity` — a
    /// `ringfront-dispatch` controller is the right place to consult it.
    pub fn is_local(&self, node: &Node) -> bool {
        self.rules.iter().any(|rule| rule.matches(node))
    }
}
