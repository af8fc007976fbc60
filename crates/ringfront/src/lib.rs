//! `ringfront`: a ring-aware proxy dispatcher for a distributed
//! object-storage cluster.
//!
//! This crate re-exports the workspace's building blocks under one name —
//! [`ringfront_core`]'s node types and event system, [`ringfront_health`]'s
//! error-suppression and timing tables, [`ringfront_selector`]'s node
//! sorting and `iter_nodes` cursor, [`ringfront_config`]'s option table and
//! affinity DSL, and [`ringfront_dispatch`]'s URL classifier, header
//! sanitation, controller contract, and request pipeline — and, behind the
//! `tower` feature, wraps [`RequestPipeline`] as a `tower::Service` so it
//! composes with ordinary Tower middleware stacks.
//!
//! A binary wiring this crate into an actual HTTP server picks a `Ring`
//! implementation, a [`BackendClient`], and a [`ControllerFactory`], builds
//! a [`RequestPipeline`], and drives it per connection. See the
//! `axum-gateway` demo in this workspace for a worked example.

pub use ringfront_config::{ConfigError, GatewayConfig, GatewayConfigBuilder, NodeCountExpr, ReadAffinity, WriteAffinity};
pub use ringfront_core::{EventListener, EventListeners, FnListener, GatewayEvent, Node, NodeKey};
pub use ringfront_dispatch::{
    classify, AccountController, AuthHookState, AuthorizeFn, BackendClient, BackendError, BoxFuture,
    Classification, ContainerController, Controller, ControllerContext, ControllerFactory,
    InfoController, InfoDocument, MalformedPath, MethodHandler, ObjectController, PipelineError,
    PipelineEvent, PipelineRequest, RequestPipeline, ResourceKey, ResourceKind,
};
pub use ringfront_health::{HealthEvent, NodeHealthTable, NodeTimingTable, SuppressionConfig};
pub use ringfront_selector::{
    iter_nodes, AffinityPriority, NodeHandle, NodeIterator, NodeOverride, NodeSorter, Ring, SelectorEvent,
    SortKey, SortingMethod, StaticRing,
};

#[cfg(feature = "tower")]
mod service;
#[cfg(feature = "tower")]
pub use service::GatewayService;
