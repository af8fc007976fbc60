//! The request pipeline (spec §4.5): the per-request orchestration that
//! ties together header sanitation, classification, controller
//! instantiation, the authorization hook, and method dispatch. Implements
//! every numbered step in §4.5, including popping the version segment
//! before a handler sees its key (step 11), saving the pre-rewrite method
//! (step 13), and deriving the client IP from headers for the request
//! context (step 9, §3).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderValue, Request, Response, StatusCode};

use ringfront_core::EventListeners;
use ringfront_health::{NodeHealthTable, NodeTimingTable};
use ringfront_selector::{NodeSorter, Ring};

use ringfront_config::GatewayConfig;

use crate::classify::{classify, ResourceKind};
use crate::error::PipelineError;
use crate::events::PipelineEvent;
use crate::headers::{alias_storage_token, client_ip, host_is_denied, strip_backend_headers};
use crate::resource::{BackendClient, Controller, ControllerContext, ControllerFactory};
use crate::transaction::{generate_trans_id, AuthHookState};

const TRANS_ID_HEADER: &str = "x-trans-id";
const HOST_HEADER: &str = "host";
const TRANS_ID_EXT_HEADER: &str = "x-swift-trans-id"; // mirrors `swift.trans_id` environment slot

/// A caller-installed authorization hook (spec §3 "Request context", §4.5
/// step 12). Returning `None` means authorization succeeded; `Some(resp)`
/// is the denial to (maybe) return.
pub type AuthorizeFn = Arc<dyn Fn(&Request<Bytes>) -> Option<Response<Bytes>> + Send + Sync>;

/// Everything the pipeline needs for one inbound request: the raw HTTP
/// request, plus an optional authorization hook installed by upstream
/// middleware (the equivalent of `env['swift.authorize']`).
pub struct PipelineRequest {
    pub request: Request<Bytes>,
    pub authorize: Option<AuthorizeFn>,
}

impl PipelineRequest {
    pub fn new(request: Request<Bytes>) -> Self {
        Self {
            request,
            authorize: None,
        }
    }

    pub fn with_authorize(mut self, hook: AuthorizeFn) -> Self {
        self.authorize = Some(hook);
        self
    }
}

/// Orchestrates one request end to end per spec §4.5's numbered steps.
pub struct RequestPipeline {
    config: Arc<GatewayConfig>,
    factory: Arc<dyn ControllerFactory>,
    ring: Arc<dyn Ring>,
    health: Arc<NodeHealthTable>,
    timings: Arc<NodeTimingTable>,
    sorter: Arc<NodeSorter>,
    backend: Arc<dyn BackendClient>,
    events: EventListeners<PipelineEvent>,
}

impl RequestPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<GatewayConfig>,
        factory: Arc<dyn ControllerFactory>,
        ring: Arc<dyn Ring>,
        health: Arc<NodeHealthTable>,
        timings: Arc<NodeTimingTable>,
        sorter: Arc<NodeSorter>,
        backend: Arc<dyn BackendClient>,
    ) -> Self {
        Self {
            config,
            factory,
            ring,
            health,
            timings,
            sorter,
            backend,
            events: EventListeners::new(),
        }
    }

    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: ringfront_core::EventListener<PipelineEvent> + 'static,
    {
        self.events.add(listener);
        self
    }

    /// Runs the full pipeline for one request, never panicking: any
    /// [`PipelineError`] is translated to its documented HTTP response
    /// before this returns (spec §7).
    pub async fn handle(&self, pipeline_req: PipelineRequest) -> Response<Bytes> {
        let PipelineRequest {
            mut request,
            authorize,
        } = pipeline_req;

        // Step 2: strip x-backend-* before any controller sees the request.
        strip_backend_headers(request.headers_mut());

        // Step 3: alias x-storage-token into x-auth-token if needed.
        alias_storage_token(request.headers_mut());

        // Step 9 (moved earlier so even early rejections carry a trans id):
        // generate a transaction id once per request, and derive the client
        // IP from headers for the logger's request context.
        let trans_id = request
            .headers()
            .get(TRANS_ID_EXT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| generate_trans_id(&self.config.trans_id_suffix));
        let client_ip = client_ip(request.headers());

        self.events.emit(&PipelineEvent::RequestStarted {
            trans_id: trans_id.clone(),
            client_ip: client_ip.map(|ip| ip.to_string()),
            timestamp: Instant::now(),
        });
        #[cfg(feature = "tracing")]
        tracing::info!(trans_id = %trans_id, client_ip = ?client_ip, "request started");

        match self.handle_inner(request, authorize, &trans_id).await {
            Ok(mut response) => {
                self.mirror_trans_id(&mut response, &trans_id);
                response
            }
            Err(err) => {
                self.events.emit(&PipelineEvent::Rejected {
                    trans_id: trans_id.clone(),
                    reason: rejection_reason(&err),
                    timestamp: Instant::now(),
                });
                let mut response = err.to_response();
                self.mirror_trans_id(&mut response, &trans_id);
                response
            }
        }
    }

    async fn handle_inner(
        &self,
        request: Request<Bytes>,
        authorize: Option<AuthorizeFn>,
        trans_id: &str,
    ) -> Result<Response<Bytes>, PipelineError> {
        // Step 4: reject a negative declared Content-Length.
        if let Some(len) = request.headers().get(http::header::CONTENT_LENGTH) {
            let len = len.to_str().unwrap_or_default();
            if len.trim_start().starts_with('-') {
                return Err(PipelineError::BadContentLength);
            }
        }

        let path = request.uri().path();

        // Step 5: reject a NUL byte in the path (the `http` crate already
        // guarantees valid UTF-8 for anything that reached a `Uri`).
        if path.contains('\0') {
            return Err(PipelineError::BadEncoding);
        }

        // Step 6: classify.
        let classification = classify(path).map_err(|_| PipelineError::MalformedPath)?;
        if classification.kind == ResourceKind::Unclassifiable {
            return Err(PipelineError::BadUrl);
        }

        // Step 7: deny-listed Host header.
        if !self.config.deny_host_headers.is_empty() {
            if let Some(host) = request.headers().get(HOST_HEADER).and_then(|v| v.to_str().ok()) {
                if host_is_denied(host, &self.config.deny_host_headers) {
                    return Err(PipelineError::ForbiddenHost);
                }
            }
        }

        // Step 8: instantiate the controller for this resource kind.
        let controller: Arc<dyn Controller> = match classification.kind {
            ResourceKind::Info => self.factory.info_controller(),
            ResourceKind::Account => self.factory.account_controller(classification.key.clone()),
            ResourceKind::Container => self.factory.container_controller(classification.key.clone()),
            ResourceKind::Object => self.factory.object_controller(classification.key.clone()),
            ResourceKind::Unclassifiable => unreachable!("handled above"),
        };

        // Step 10: look up the method handler; 405 if absent or private.
        let orig_method = request.method().clone();
        let handler = controller.handler(&orig_method).filter(|h| h.publicly_accessible());
        let Some(handler) = handler else {
            return Err(PipelineError::MethodNotAllowed {
                allowed: controller.allowed_methods().iter().map(|s| s.to_string()).collect(),
            });
        };

        // Step 11: pop the version segment so downstream handlers see a
        // version-less key, same as the original popping it off path_info.
        let mut dispatch_key = classification.key.clone();
        dispatch_key.version = None;

        // Step 12: authorization hook, call-once with delay-denial.
        let mut auth_state = AuthHookState::NotInstalled;
        let mut reauthorize: Option<Arc<dyn Fn() -> Option<Response<Bytes>> + Send + Sync>> = None;
        if let Some(authorize) = authorize {
            auth_state = AuthHookState::Pending;
            if let Some(denial) = authorize(&request) {
                if !handler.delay_denial() {
                    self.events.emit(&PipelineEvent::AuthorizationDenied {
                        trans_id: trans_id.to_string(),
                        timestamp: Instant::now(),
                    });
                    return Err(PipelineError::Unauthorized(denial));
                }
                // delay_denial: the hook stays pending, bound to a copy of
                // this request, so the handler can revisit the decision
                // after gathering more context (e.g. an object's ACL).
                let bound_request = clone_request_for_reauthorization(&request);
                let bound_authorize = Arc::clone(&authorize);
                reauthorize = Some(Arc::new(move || bound_authorize(&bound_request)));
            } else {
                // No denial: authorization succeeded. `authorize` is dropped
                // at the end of this block and never re-invoked, matching
                // "remove the hook after success".
                auth_state = AuthHookState::Passed;
            }
        }

        // Step 13: save the original method before any handler-internal
        // rewrite (e.g. `object_post_as_copy` turning POST into COPY+PUT).
        let orig_method_for_ctx = orig_method.clone();

        // Step 14: dispatch.
        let partition = partition_for_key(&classification.key);
        let raw_query = request.uri().query().unwrap_or("").to_string();
        let signature = request
            .headers()
            .get("x-info-signature")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let ctx = ControllerContext {
            ring: Arc::clone(&self.ring),
            partition,
            health: Arc::clone(&self.health),
            timings: Arc::clone(&self.timings),
            sorter: Arc::clone(&self.sorter),
            request_node_count: self.config.request_node_count.evaluate(self.ring.replica_count()),
            log_handoffs: self.config.log_handoffs,
            backend: Arc::clone(&self.backend),
            key: dispatch_key,
            raw_query,
            signature,
            orig_method: orig_method_for_ctx,
            auth_state,
            reauthorize,
        };
        let response = handler.call(ctx).await;

        self.events.emit(&PipelineEvent::Dispatched {
            trans_id: trans_id.to_string(),
            method: orig_method.to_string(),
            status: response.status().as_u16(),
            timestamp: Instant::now(),
        });

        Ok(response)
    }

    fn mirror_trans_id(&self, response: &mut Response<Bytes>, trans_id: &str) {
        if let Ok(value) = HeaderValue::from_str(trans_id) {
            response.headers_mut().insert(TRANS_ID_HEADER, value);
        }
    }
}

fn rejection_reason(err: &PipelineError) -> &'static str {
    match err {
        PipelineError::BadEncoding => "bad_encoding",
        PipelineError::BadContentLength => "bad_content_length",
        PipelineError::MalformedPath => "malformed_path",
        PipelineError::BadUrl => "bad_url",
        PipelineError::ForbiddenHost => "forbidden_host",
        PipelineError::MethodNotAllowed { .. } => "method_not_allowed",
        PipelineError::Unauthorized(_) => "unauthorized",
        PipelineError::InternalError => "internal_error",
    }
}

/// Rebuilds a request from its method, URI, headers, and body for the
/// authorization hook's delayed re-invocation (spec §4.5 step 12). Built
/// from parts rather than a whole-request clone — extensions are dropped,
/// which is fine since the hook only ever inspects method/URI/headers/body.
fn clone_request_for_reauthorization(request: &Request<Bytes>) -> Request<Bytes> {
    let mut cloned = Request::builder()
        .method(request.method().clone())
        .uri(request.uri().clone())
        .body(request.body().clone())
        .expect("method and uri were already validated when the original request was built");
    *cloned.headers_mut() = request.headers().clone();
    cloned
}

/// Stands in for the ring's key-tuple-to-partition mapping, which spec.md
/// treats as an out-of-scope collaborator API. A deterministic hash over
/// the key tuple is sufficient to exercise the rest of the pipeline without
/// a real consistent-hash ring.
fn partition_for_key(key: &crate::classify::ResourceKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.account.hash(&mut hasher);
    key.container.hash(&mut hasher);
    key.object.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ResourceKey;
    use crate::resource::{AccountController, BackendError, ContainerController, InfoController, ObjectController};
    use http::Method;
    use ringfront_health::SuppressionConfig;
    use ringfront_selector::{SortingMethod, StaticRing};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    struct TestFactory;
    impl ControllerFactory for TestFactory {
        fn info_controller(&self) -> Arc<dyn Controller> {
            Arc::new(InfoController::default())
        }
        fn account_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(AccountController)
        }
        fn container_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(ContainerController)
        }
        fn object_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(ObjectController)
        }
    }

    struct AlwaysOk;
    impl BackendClient for AlwaysOk {
        fn call(
            &self,
            _node: ringfront_core::Node,
            _method: Method,
            _key: ResourceKey,
        ) -> crate::resource::BoxFuture<Result<Response<Bytes>, BackendError>> {
            Box::pin(async move {
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .body(Bytes::from_static(b"ok"))
                    .unwrap())
            })
        }
    }

    fn node(n: u8) -> ringfront_core::Node {
        ringfront_core::Node::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)), 6000, "sda1")
    }

    fn pipeline() -> RequestPipeline {
        let ring: Arc<dyn Ring> = Arc::new(StaticRing::new(
            vec![node(1), node(2), node(3)],
            vec![node(4), node(5)],
        ));
        RequestPipeline::new(
            Arc::new(GatewayConfig::default()),
            Arc::new(TestFactory),
            ring,
            Arc::new(NodeHealthTable::new(SuppressionConfig::default())),
            Arc::new(NodeTimingTable::new(Duration::from_secs(300))),
            Arc::new(NodeSorter::new(SortingMethod::Shuffle)),
            Arc::new(AlwaysOk),
        )
    }

    #[tokio::test]
    async fn object_get_dispatches_through_to_backend() {
        let pipeline = pipeline();
        let req = Request::builder()
            .method("GET")
            .uri("/v1/a/c/o")
            .body(Bytes::new())
            .unwrap();

        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(TRANS_ID_HEADER));
    }

    #[tokio::test]
    async fn negative_content_length_is_rejected_before_controller_instantiation() {
        let pipeline = pipeline();
        let req = Request::builder()
            .method("PUT")
            .uri("/v1/a/c/o")
            .header("content-length", "-1")
            .body(Bytes::new())
            .unwrap();

        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn private_head_handler_on_object_is_method_not_allowed() {
        let pipeline = pipeline();
        let req = Request::builder()
            .method("HEAD")
            .uri("/v1/a/c/o")
            .body(Bytes::new())
            .unwrap();

        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key("allow"));
    }

    #[tokio::test]
    async fn unclassifiable_path_is_precondition_failed() {
        let pipeline = pipeline();
        let req = Request::builder().method("GET").uri("/v1").body(Bytes::new()).unwrap();
        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn denied_host_header_is_forbidden() {
        let mut config = GatewayConfig::default();
        config.deny_host_headers = vec!["evil.example".to_string()];
        let ring: Arc<dyn Ring> = Arc::new(StaticRing::new(vec![node(1)], vec![]));
        let pipeline = RequestPipeline::new(
            Arc::new(config),
            Arc::new(TestFactory),
            ring,
            Arc::new(NodeHealthTable::new(SuppressionConfig::default())),
            Arc::new(NodeTimingTable::new(Duration::from_secs(300))),
            Arc::new(NodeSorter::new(SortingMethod::Shuffle)),
            Arc::new(AlwaysOk),
        );

        let req = Request::builder()
            .method("GET")
            .uri("/v1/a")
            .header("host", "evil.example")
            .body(Bytes::new())
            .unwrap();
        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn authorization_hook_denies_without_delay() {
        let pipeline = pipeline();
        let req = Request::builder().method("GET").uri("/v1/a").body(Bytes::new()).unwrap();
        let authorize: AuthorizeFn = Arc::new(|_req| {
            Some(
                Response::builder()
                    .status(StatusCode::UNAUTHORIZED)
                    .body(Bytes::new())
                    .unwrap(),
            )
        });
        let response = pipeline
            .handle(PipelineRequest::new(req).with_authorize(authorize))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn trans_id_is_not_regenerated_if_already_present() {
        let pipeline = pipeline();
        let req = Request::builder()
            .method("GET")
            .uri("/v1/a")
            .header(TRANS_ID_EXT_HEADER, "txfixedvalue")
            .body(Bytes::new())
            .unwrap();
        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.headers().get(TRANS_ID_HEADER).unwrap(), "txfixedvalue");
    }

    struct CaptureHandler {
        captured: Arc<std::sync::Mutex<Option<(ResourceKey, Method)>>>,
    }

    impl crate::resource::MethodHandler for CaptureHandler {
        fn call(&self, ctx: ControllerContext) -> crate::resource::BoxFuture<Response<Bytes>> {
            let captured = Arc::clone(&self.captured);
            Box::pin(async move {
                *captured.lock().unwrap() = Some((ctx.key.clone(), ctx.orig_method.clone()));
                Response::builder().status(StatusCode::OK).body(Bytes::new()).unwrap()
            })
        }
    }

    struct CaptureController(Arc<std::sync::Mutex<Option<(ResourceKey, Method)>>>);

    impl Controller for CaptureController {
        fn allowed_methods(&self) -> &'static [&'static str] {
            &["GET"]
        }
        fn handler(&self, method: &Method) -> Option<Arc<dyn crate::resource::MethodHandler>> {
            match *method {
                Method::GET => Some(Arc::new(CaptureHandler {
                    captured: Arc::clone(&self.0),
                })),
                _ => None,
            }
        }
    }

    struct CaptureFactory(Arc<std::sync::Mutex<Option<(ResourceKey, Method)>>>);

    impl ControllerFactory for CaptureFactory {
        fn info_controller(&self) -> Arc<dyn Controller> {
            Arc::new(InfoController::default())
        }
        fn account_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(CaptureController(Arc::clone(&self.0)))
        }
        fn container_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(CaptureController(Arc::clone(&self.0)))
        }
        fn object_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(CaptureController(Arc::clone(&self.0)))
        }
    }

    #[tokio::test]
    async fn version_segment_is_popped_before_dispatch_and_orig_method_is_preserved() {
        let captured = Arc::new(std::sync::Mutex::new(None));
        let ring: Arc<dyn Ring> = Arc::new(StaticRing::new(vec![node(1)], vec![]));
        let pipeline = RequestPipeline::new(
            Arc::new(GatewayConfig::default()),
            Arc::new(CaptureFactory(Arc::clone(&captured))),
            ring,
            Arc::new(NodeHealthTable::new(SuppressionConfig::default())),
            Arc::new(NodeTimingTable::new(Duration::from_secs(300))),
            Arc::new(NodeSorter::new(SortingMethod::Shuffle)),
            Arc::new(AlwaysOk),
        );

        let req = Request::builder().method("GET").uri("/v1/a/c/o").body(Bytes::new()).unwrap();
        let response = pipeline.handle(PipelineRequest::new(req)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let (key, orig_method) = captured.lock().unwrap().take().expect("handler captured a context");
        assert!(key.version.is_none(), "version must be popped before the handler sees the key");
        assert_eq!(key.account.as_deref(), Some("a"));
        assert_eq!(key.container.as_deref(), Some("c"));
        assert_eq!(key.object.as_deref(), Some("o"));
        assert_eq!(orig_method, Method::GET);
    }

    struct DelayDenialHandler;
    impl crate::resource::MethodHandler for DelayDenialHandler {
        fn delay_denial(&self) -> bool {
            true
        }
        fn call(&self, ctx: ControllerContext) -> crate::resource::BoxFuture<Response<Bytes>> {
            Box::pin(async move {
                match ctx.reauthorize() {
                    Some(denial) => denial,
                    None => Response::builder()
                        .status(StatusCode::OK)
                        .body(Bytes::from_static(b"allowed after reauthorization"))
                        .unwrap(),
                }
            })
        }
    }

    struct DelayDenialController;
    impl Controller for DelayDenialController {
        fn allowed_methods(&self) -> &'static [&'static str] {
            &["GET"]
        }
        fn handler(&self, method: &Method) -> Option<Arc<dyn crate::resource::MethodHandler>> {
            match *method {
                Method::GET => Some(Arc::new(DelayDenialHandler)),
                _ => None,
            }
        }
    }

    struct DelayDenialFactory;
    impl ControllerFactory for DelayDenialFactory {
        fn info_controller(&self) -> Arc<dyn Controller> {
            Arc::new(InfoController::default())
        }
        fn account_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(DelayDenialController)
        }
        fn container_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(DelayDenialController)
        }
        fn object_controller(&self, _key: ResourceKey) -> Arc<dyn Controller> {
            Arc::new(DelayDenialController)
        }
    }

    #[tokio::test]
    async fn delay_denial_keeps_the_hook_pending_for_the_handler_to_revisit() {
        let ring: Arc<dyn Ring> = Arc::new(StaticRing::new(vec![node(1)], vec![]));
        let pipeline = RequestPipeline::new(
            Arc::new(GatewayConfig::default()),
            Arc::new(DelayDenialFactory),
            ring,
            Arc::new(NodeHealthTable::new(SuppressionConfig::default())),
            Arc::new(NodeTimingTable::new(Duration::from_secs(300))),
            Arc::new(NodeSorter::new(SortingMethod::Shuffle)),
            Arc::new(AlwaysOk),
        );

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_for_hook = Arc::clone(&calls);
        let authorize: AuthorizeFn = Arc::new(move |_req| {
            // First call (the pipeline's own step-12 invocation) denies;
            // the second call (the handler's `reauthorize`) allows.
            if calls_for_hook.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Some(
                    Response::builder()
                        .status(StatusCode::FORBIDDEN)
                        .body(Bytes::new())
                        .unwrap(),
                )
            } else {
                None
            }
        });

        let req = Request::builder().method("GET").uri("/v1/a").body(Bytes::new()).unwrap();
        let response = pipeline
            .handle(PipelineRequest::new(req).with_authorize(authorize))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn request_started_event_carries_client_ip_derived_from_headers() {
        use ringfront_core::FnListener;

        let captured: Arc<std::sync::Mutex<Option<Option<String>>>> = Arc::new(std::sync::Mutex::new(None));
        let captured_for_listener = Arc::clone(&captured);
        let pipeline = pipeline().with_listener(FnListener::new(move |event: &PipelineEvent| {
            if let PipelineEvent::RequestStarted { client_ip, .. } = event {
                *captured_for_listener.lock().unwrap() = Some(client_ip.clone());
            }
        }));

        let req = Request::builder()
            .method("GET")
            .uri("/v1/a")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Bytes::new())
            .unwrap();
        pipeline.handle(PipelineRequest::new(req)).await;

        assert_eq!(
            captured.lock().unwrap().clone().flatten(),
            Some("203.0.113.9".to_string())
        );
    }
}
