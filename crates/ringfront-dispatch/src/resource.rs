//! Controllers (spec §4.7): opaque, minimally realized consumers of
//! `iter_nodes`. spec.md treats a controller's actual GET/PUT/POST/DELETE
//! handling as out of scope; this module defines just enough of a
//! `Controller`/`MethodHandler` contract to exercise the dispatcher end to
//! end — proving the node-selection contract without reimplementing
//! replication, quorum, or segmented-object handling.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::Future;
use http::{Method, Response, StatusCode};

use ringfront_core::{EventListeners, Node};
use ringfront_health::{NodeHealthTable, NodeTimingTable};
use ringfront_selector::{iter_nodes, NodeSorter, Ring, SelectorEvent};

use crate::classify::ResourceKey;
use crate::transaction::AuthHookState;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A controller's view of a single backend node call. Controllers never
/// speak a real storage protocol here (replication, quorum, and segmented
/// reads stay out of scope); they ask a [`BackendClient`] to perform one
/// call against one candidate node and act on the outcome.
#[derive(Debug, Clone)]
pub struct BackendError {
    pub message: String,
    /// True for errors known to be expensive or persistent (e.g.
    /// "Insufficient Storage"), which the controller force-suppresses
    /// rather than counting against the ordinary error limit.
    pub insufficient_storage: bool,
}

/// A backend transport, mocked in tests and the demo binary. Controllers
/// depend on this trait, not a concrete HTTP client, so the dispatcher can
/// be exercised without real storage nodes.
pub trait BackendClient: Send + Sync {
    fn call(&self, node: Node, method: Method, key: ResourceKey) -> BoxFuture<Result<Response<Bytes>, BackendError>>;
}

/// Everything a [`MethodHandler`] needs to consume `iter_nodes` and report
/// an outcome. Built fresh per request by the pipeline.
#[derive(Clone)]
pub struct ControllerContext {
    pub ring: Arc<dyn Ring>,
    pub partition: u64,
    pub health: Arc<NodeHealthTable>,
    pub timings: Arc<NodeTimingTable>,
    pub sorter: Arc<NodeSorter>,
    pub request_node_count: usize,
    pub log_handoffs: bool,
    pub backend: Arc<dyn BackendClient>,
    pub key: ResourceKey,
    /// The request's raw query string and an optional `x-info-signature`
    /// header, threaded through for `/info`'s HMAC-gated section reveal
    /// (spec §6 "Introspection"). Unused by the account/container/object
    /// controllers.
    pub raw_query: String,
    pub signature: Option<String>,
    /// The HTTP method as it arrived at the pipeline, before any internal
    /// rewrite a handler performs (e.g. `object_post_as_copy` turning POST
    /// into COPY+PUT). Mirrors spec §4.5 step 13's `swift.orig_req_method`
    /// slot.
    pub orig_method: http::Method,
    /// The authorization hook's call-once, delay-denial state (spec §4.5
    /// step 12, §9). `Pending` only when the hook denied with
    /// `delay_denial` set; [`ControllerContext::reauthorize`] is the
    /// handler's way to revisit that denial after gathering more context.
    pub auth_state: AuthHookState,
    /// The hook to re-invoke when `auth_state` is `Pending`; only the
    /// pipeline can construct one, since only it knows the request the hook
    /// closes over.
    pub(crate) reauthorize: Option<Arc<dyn Fn() -> Option<Response<Bytes>> + Send + Sync>>,
}

impl ControllerContext {
    /// Re-invokes the authorization hook the pipeline deferred because the
    /// handler set `delay_denial`. Returns `None` (authorized) if no hook is
    /// pending, mirroring the spec's "handler can revisit" contract — a
    /// handler that doesn't care about delayed denials can simply ignore
    /// this.
    pub fn reauthorize(&self) -> Option<Response<Bytes>> {
        if !self.auth_state.is_pending() {
            return None;
        }
        self.reauthorize.as_ref().and_then(|hook| hook())
    }

    /// Tries backend nodes in `iter_nodes` order until one answers
    /// successfully or the iterator is exhausted (spec §7: "node-level
    /// failures never reach the client directly ... only when the iterator
    /// is exhausted does a controller return its own failure response").
    pub async fn dispatch_to_backend(&self, method: Method) -> Response<Bytes> {
        let mut iter = iter_nodes(
            self.ring.as_ref(),
            self.partition,
            &self.sorter,
            &self.timings,
            Arc::clone(&self.health),
            self.request_node_count,
            self.log_handoffs,
            EventListeners::<SelectorEvent>::new(),
            None,
        );

        while let Some(handle) = iter.next() {
            let node = handle.clone();
            match self.backend.call(node.clone(), method.clone(), self.key.clone()).await {
                Ok(response) => return response,
                Err(err) if err.insufficient_storage => {
                    self.health.force_suppress(&node.key);
                }
                Err(_) => {
                    self.health.record_error(&node.key);
                }
            }
        }

        Response::builder()
            .status(StatusCode::SERVICE_UNAVAILABLE)
            .body(Bytes::from_static(b"No backend nodes available"))
            .expect("static unavailable response is well-formed")
    }
}

/// One HTTP method a controller exposes.
pub trait MethodHandler: Send + Sync {
    /// Whether the dispatcher will route to this handler at all. A handler
    /// present on a controller but not publicly accessible causes the
    /// pipeline to return 405, same as a missing handler (spec §4.5 step
    /// 10).
    fn publicly_accessible(&self) -> bool {
        true
    }

    /// If the authorization hook denies the request, whether the denial
    /// should be delayed so the handler can revisit it after gathering more
    /// context (spec §4.5 step 12).
    fn delay_denial(&self) -> bool {
        false
    }

    fn call(&self, ctx: ControllerContext) -> BoxFuture<Response<Bytes>>;
}

/// A resource-kind-specific controller: the set of methods it exposes and
/// its dispatch table.
pub trait Controller: Send + Sync {
    /// Methods this controller exposes, in the order the `Allow` header
    /// should list them on a 405 (spec §8 scenario 3).
    fn allowed_methods(&self) -> &'static [&'static str];

    /// The handler for `method`, if this controller exposes one.
    fn handler(&self, method: &Method) -> Option<Arc<dyn MethodHandler>>;
}

/// Instantiates the controller for a classified resource kind, passing the
/// extracted key record (spec §4.5 step 8).
pub trait ControllerFactory: Send + Sync {
    fn info_controller(&self) -> Arc<dyn Controller>;
    fn account_controller(&self, key: ResourceKey) -> Arc<dyn Controller>;
    fn container_controller(&self, key: ResourceKey) -> Arc<dyn Controller>;
    fn object_controller(&self, key: ResourceKey) -> Arc<dyn Controller>;
}

macro_rules! backend_handler {
    ($name:ident, $method:expr) => {
        struct $name;
        impl MethodHandler for $name {
            fn call(&self, ctx: ControllerContext) -> BoxFuture<Response<Bytes>> {
                Box::pin(async move { ctx.dispatch_to_backend($method).await })
            }
        }
    };
}

backend_handler!(GetHandler, Method::GET);
backend_handler!(HeadHandler, Method::HEAD);
backend_handler!(PutHandler, Method::PUT);
backend_handler!(PostHandler, Method::POST);
backend_handler!(DeleteHandler, Method::DELETE);

/// `GET`/`HEAD`/`PUT`/`POST`/`DELETE` on `/v1/account`.
pub struct AccountController;

impl Controller for AccountController {
    fn allowed_methods(&self) -> &'static [&'static str] {
        &["GET", "HEAD", "PUT", "POST", "DELETE"]
    }

    fn handler(&self, method: &Method) -> Option<Arc<dyn MethodHandler>> {
        match *method {
            Method::GET => Some(Arc::new(GetHandler)),
            Method::HEAD => Some(Arc::new(HeadHandler)),
            Method::PUT => Some(Arc::new(PutHandler)),
            Method::POST => Some(Arc::new(PostHandler)),
            Method::DELETE => Some(Arc::new(DeleteHandler)),
            _ => None,
        }
    }
}

/// `GET`/`HEAD`/`PUT`/`POST`/`DELETE` on `/v1/account/container`.
pub struct ContainerController;

impl Controller for ContainerController {
    fn allowed_methods(&self) -> &'static [&'static str] {
        &["GET", "HEAD", "PUT", "POST", "DELETE"]
    }

    fn handler(&self, method: &Method) -> Option<Arc<dyn MethodHandler>> {
        match *method {
            Method::GET => Some(Arc::new(GetHandler)),
            Method::HEAD => Some(Arc::new(HeadHandler)),
            Method::PUT => Some(Arc::new(PutHandler)),
            Method::POST => Some(Arc::new(PostHandler)),
            Method::DELETE => Some(Arc::new(DeleteHandler)),
            _ => None,
        }
    }
}

/// `GET`/`HEAD`/`PUT`/`POST`/`DELETE` on `/v1/account/container/object`.
/// `HEAD` is deliberately not publicly accessible here, matching the
/// dispatcher scenario in spec §8's end-to-end example 3.
pub struct ObjectController;

struct PrivateHeadHandler;
impl MethodHandler for PrivateHeadHandler {
    fn publicly_accessible(&self) -> bool {
        false
    }

    fn call(&self, ctx: ControllerContext) -> BoxFuture<Response<Bytes>> {
        Box::pin(async move { ctx.dispatch_to_backend(Method::HEAD).await })
    }
}

impl Controller for ObjectController {
    fn allowed_methods(&self) -> &'static [&'static str] {
        &["GET", "PUT", "POST", "DELETE"]
    }

    fn handler(&self, method: &Method) -> Option<Arc<dyn MethodHandler>> {
        match *method {
            Method::GET => Some(Arc::new(GetHandler)),
            Method::HEAD => Some(Arc::new(PrivateHeadHandler)),
            Method::PUT => Some(Arc::new(PutHandler)),
            Method::POST => Some(Arc::new(PostHandler)),
            Method::DELETE => Some(Arc::new(DeleteHandler)),
            _ => None,
        }
    }
}

/// `GET` on `/info`. Holds the assembled capability document plus the
/// `disallowed_sections`/`admin_key` config needed to gate its privileged
/// reveal (spec §6 "Introspection", §8 scenario 5); the HMAC verification
/// itself lives in [`crate::info`].
pub struct InfoController {
    document: Arc<crate::info::InfoDocument>,
    disallowed_sections: Vec<String>,
    admin_key: Option<String>,
}

impl InfoController {
    pub fn new(
        document: crate::info::InfoDocument,
        disallowed_sections: Vec<String>,
        admin_key: Option<String>,
    ) -> Self {
        Self {
            document: Arc::new(document),
            disallowed_sections,
            admin_key,
        }
    }
}

impl Default for InfoController {
    fn default() -> Self {
        Self::new(crate::info::InfoDocument::new(), Vec::new(), None)
    }
}

struct InfoGetHandler {
    document: Arc<crate::info::InfoDocument>,
    disallowed_sections: Vec<String>,
    admin_key: Option<String>,
}

impl MethodHandler for InfoGetHandler {
    fn call(&self, ctx: ControllerContext) -> BoxFuture<Response<Bytes>> {
        let document = Arc::clone(&self.document);
        let disallowed_sections = self.disallowed_sections.clone();
        let admin_key = self.admin_key.clone();
        Box::pin(async move {
            let rendered = document.render(
                &disallowed_sections,
                admin_key.as_deref(),
                &ctx.raw_query,
                ctx.signature.as_deref(),
            );
            Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .body(Bytes::from(rendered))
                .expect("info document response is well-formed")
        })
    }
}

impl Controller for InfoController {
    fn allowed_methods(&self) -> &'static [&'static str] {
        &["GET"]
    }

    fn handler(&self, method: &Method) -> Option<Arc<dyn MethodHandler>> {
        match *method {
            Method::GET => Some(Arc::new(InfoGetHandler {
                document: Arc::clone(&self.document),
                disallowed_sections: self.disallowed_sections.clone(),
                admin_key: self.admin_key.clone(),
            })),
            _ => None,
        }
    }
}
