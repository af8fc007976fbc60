//! A runnable ring-front gateway.
//!
//! Wires a [`ringfront::RequestPipeline`] with a fixed, in-process node list
//! (a real deployment would load a consistent-hash ring from disk, which is
//! out of scope for this crate) and an in-memory backend that fakes a
//! handful of storage nodes — enough to exercise the full pipeline end to
//! end: classification, header sanitation, handoff iteration, and the
//! `/info` capability document.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response as AxumResponse};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use clap::Parser;
use http::{Method, Request, Response, StatusCode};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use ringfront::{
    AccountController, BackendClient, BackendError, BoxFuture, ContainerController, Controller,
    ControllerFactory, GatewayConfig, InfoController, InfoDocument, Node, NodeHealthTable, NodeSorter,
    NodeTimingTable, ObjectController, PipelineRequest, RequestPipeline, ResourceKey, Ring, SortingMethod,
    StaticRing, SuppressionConfig,
};

#[derive(Parser, Debug)]
#[command(about = "Runs a ring-front proxy dispatcher in front of an in-memory backend")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Number of simulated storage nodes to place on the ring.
    #[arg(long, default_value_t = 3)]
    nodes: u8,

    /// HMAC key required to reveal disallowed `/info` sections.
    #[arg(long)]
    admin_key: Option<String>,
}

/// An in-memory stand-in for the real object-storage transport (spec.md
/// treats the actual on-wire storage protocol as out of scope). Objects are
/// keyed by the full account/container/object tuple and stored process-wide
/// regardless of which simulated node "owns" them.
struct DemoBackend {
    store: Mutex<HashMap<(Option<String>, Option<String>, Option<String>), Bytes>>,
}

impl DemoBackend {
    fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }
}

impl BackendClient for DemoBackend {
    fn call(
        &self,
        _node: Node,
        method: Method,
        key: ResourceKey,
    ) -> BoxFuture<Result<Response<Bytes>, BackendError>> {
        let entry = (key.account.clone(), key.container.clone(), key.object.clone());
        let body = match method {
            Method::PUT | Method::POST => {
                self.store.lock().unwrap().insert(entry, Bytes::from_static(b"stored"));
                Some(Bytes::from_static(b""))
            }
            Method::DELETE => {
                self.store.lock().unwrap().remove(&entry);
                Some(Bytes::from_static(b""))
            }
            _ => self.store.lock().unwrap().get(&entry).cloned(),
        };

        Box::pin(async move {
            match body {
                Some(body) => Ok(Response::builder().status(StatusCode::OK).body(body).unwrap()),
                None => Err(BackendError {
                    message: "not found".to_string(),
                    insufficient_storage: false,
                }),
            }
        })
    }
}

struct DemoControllerFactory {
    info: Arc<InfoController>,
}

impl ControllerFactory for DemoControllerFactory {
    fn info_controller(&self) -> Arc<dyn Controller> {
        Arc::clone(&self.info) as Arc<dyn Controller>
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

#[derive(Clone)]
struct AppState {
    pipeline: Arc<RequestPipeline>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let args = Args::parse();

    let primaries: Vec<Node> = (1..=args.nodes)
        .map(|n| Node::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)), 6000, format!("sda{n}")))
        .collect();
    let ring: Arc<dyn Ring> = Arc::new(StaticRing::new(primaries, Vec::new()));

    let info = InfoDocument::new()
        .with_section("swift", r#"{"max_file_size":5368709122}"#)
        .with_section("endpoints", r#"{"account":"http://127.0.0.1:8080/v1"}"#);

    let mut config_builder = GatewayConfig::builder()
        .sorting_method(SortingMethod::Shuffle)
        .disallowed_sections(vec!["endpoints".to_string()]);
    if let Some(key) = &args.admin_key {
        config_builder = config_builder.admin_key(key.clone());
    }
    let config = config_builder.build();

    let factory = Arc::new(DemoControllerFactory {
        info: Arc::new(InfoController::new(
            info,
            config.disallowed_sections.clone(),
            args.admin_key.clone(),
        )),
    });

    let pipeline = Arc::new(RequestPipeline::new(
        Arc::new(config),
        factory,
        ring,
        Arc::new(NodeHealthTable::new(SuppressionConfig::default())),
        Arc::new(NodeTimingTable::new(Duration::from_secs(300))),
        Arc::new(NodeSorter::new(SortingMethod::Shuffle)),
        Arc::new(DemoBackend::new()),
    ));

    let state = AppState { pipeline };

    let app = Router::new()
        .route("/health/live", get(|| async { StatusCode::OK }))
        .fallback(gateway_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(args.listen).await.expect("bind error");
    tracing::info!("ringfront listening on http://{}", args.listen);
    tracing::info!("  curl http://{}/info", args.listen);
    tracing::info!("  curl -X PUT http://{}/v1/a/c/o -d hello", args.listen);
    tracing::info!("  curl http://{}/v1/a/c/o", args.listen);

    axum::serve(listener, app.into_make_service()).await.expect("server error");
}

/// Buffers the inbound body and forwards the request to the pipeline, then
/// translates the pipeline's `http::Response<Bytes>` back into an axum
/// response. The pipeline itself makes every routing decision; this handler
/// only bridges the two `http` request/response representations.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> AxumResponse {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let request = Request::from_parts(parts, bytes);

    let response = state.pipeline.handle(PipelineRequest::new(request)).await;
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::from(body))
}
