//! URL classification, header sanitation, the controller contract, and the
//! request pipeline for the ring-front gateway (spec §4.1, §4.5, §4.7).
//!
//! This is the crate that turns a parsed HTTP request into a dispatched
//! controller call: [`classify`] maps a path to a [`ResourceKind`] and key
//! tuple, [`headers`] sanitizes the inbound environment, [`resource`]
//! defines the opaque controller contract (spec treats GET/PUT/POST/DELETE
//! handling as out of scope), and [`RequestPipeline`] ties all of it
//! together per spec §4.5's numbered steps.

pub mod classify;
pub mod error;
pub mod events;
pub mod headers;
pub mod info;
pub mod pipeline;
pub mod resource;
pub mod transaction;

pub use classify::{classify, Classification, MalformedPath, ResourceKey, ResourceKind};
pub use error::PipelineError;
pub use events::PipelineEvent;
pub use info::InfoDocument;
pub use pipeline::{AuthorizeFn, PipelineRequest, RequestPipeline};
pub use resource::{
    AccountController, BackendClient, BackendError, BoxFuture, Controller, ControllerContext,
    ControllerFactory, ContainerController, InfoController, MethodHandler, ObjectController,
};
pub use transaction::{generate_trans_id, AuthHookState};
