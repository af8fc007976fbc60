//! End-to-end tests against the public `ringfront` surface: a real
//! `RequestPipeline` wired to a `StaticRing` and an in-memory backend,
//! driven the way a hosting binary would drive it.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use ringfront::{
    AccountController, BackendClient, BackendError, BoxFuture, ContainerController, Controller,
    ControllerFactory, GatewayConfig, InfoController, InfoDocument, Node, NodeHealthTable, NodeSorter,
    NodeTimingTable, ObjectController, PipelineRequest, RequestPipeline, ResourceKey, Ring, SortingMethod,
    StaticRing, SuppressionConfig,
};

struct RecordingBackend {
    seen: Mutex<Vec<IpAddr>>,
    fail_until: IpAddr,
}

impl BackendClient for RecordingBackend {
    fn call(&self, node: Node, _method: Method, _key: ResourceKey) -> BoxFuture<Result<Response<Bytes>, BackendError>> {
        self.seen.lock().unwrap().push(node.key.ip);
        let succeeds = node.key.ip == self.fail_until;
        Box::pin(async move {
            if succeeds {
                Ok(Response::builder().status(StatusCode::OK).body(Bytes::from_static(b"ok")).unwrap())
            } else {
                Err(BackendError {
                    message: "connection refused".to_string(),
                    insufficient_storage: false,
                })
            }
        })
    }
}

struct TestFactory;
impl ControllerFactory for TestFactory {
    fn info_controller(&self) -> Arc<dyn Controller> {
        Arc::new(InfoController::new(
            InfoDocument::new().with_section("swift", "{}").with_section("endpoints", "{}"),
            vec!["endpoints".to_string()],
            Some("topsecret".to_string()),
        ))
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

fn node(n: u8) -> Node {
    Node::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)), 6000, "sda1")
}

fn pipeline_with_handoffs() -> RequestPipeline {
    let ring: Arc<dyn Ring> = Arc::new(StaticRing::new(
        vec![node(1), node(2), node(3)],
        vec![node(4), node(5)],
    ));
    let backend = Arc::new(RecordingBackend {
        seen: Mutex::new(Vec::new()),
        fail_until: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
    });
    RequestPipeline::new(
        Arc::new(GatewayConfig::default()),
        Arc::new(TestFactory),
        ring,
        Arc::new(NodeHealthTable::new(SuppressionConfig::default())),
        Arc::new(NodeTimingTable::new(Duration::from_secs(300))),
        Arc::new(NodeSorter::new(SortingMethod::Shuffle)),
        backend,
    )
}

#[tokio::test]
async fn object_request_falls_through_primaries_into_handoffs() {
    let pipeline = pipeline_with_handoffs();
    let req = Request::builder().method("GET").uri("/v1/a/c/o").body(Bytes::new()).unwrap();
    let response = pipeline.handle(PipelineRequest::new(req)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trans-id"));
}

#[tokio::test]
async fn info_endpoint_reveals_disallowed_section_with_valid_signature() {
    let pipeline = pipeline_with_handoffs();
    let payload = "";
    let signature = ringfront_sign("topsecret", payload);

    let req = Request::builder()
        .method("GET")
        .uri("/info")
        .header("x-info-signature", signature)
        .body(Bytes::new())
        .unwrap();
    let response = pipeline.handle(PipelineRequest::new(req)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(body.contains("endpoints"));
}

#[tokio::test]
async fn info_endpoint_without_signature_omits_disallowed_section() {
    let pipeline = pipeline_with_handoffs();
    let req = Request::builder().method("GET").uri("/info").body(Bytes::new()).unwrap();
    let response = pipeline.handle(PipelineRequest::new(req)).await;
    let body = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(body.contains("swift"));
    assert!(!body.contains("endpoints"));
}

#[tokio::test]
async fn malformed_path_is_rejected_with_trans_id_header_present() {
    let pipeline = pipeline_with_handoffs();
    let req = Request::builder().method("GET").uri("/v1/a/c/o/too/many/segments").body(Bytes::new()).unwrap();
    let response = pipeline.handle(PipelineRequest::new(req)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-trans-id"));
}

#[tokio::test]
async fn x_backend_headers_never_reach_the_controller_unstripped() {
    // Regression guard: a request carrying an x-backend-* header must not
    // see it echoed back by the pipeline's own bookkeeping.
    let pipeline = pipeline_with_handoffs();
    let req = Request::builder()
        .method("GET")
        .uri("/v1/a")
        .header("x-backend-secret", "leaked")
        .body(Bytes::new())
        .unwrap();
    let response = pipeline.handle(PipelineRequest::new(req)).await;
    assert!(!response.headers().contains_key("x-backend-secret"));
}

fn ringfront_sign(key: &str, payload: &str) -> String {
    // Mirrors ringfront_dispatch::info::sign without adding a dev-dependency
    // on the internal crate: HMAC-SHA256 over `payload` under `key`, hex
    // encoded, exactly as ringfront::InfoDocument::render expects.
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
