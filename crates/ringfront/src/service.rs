//! Wraps [`RequestPipeline`] as a `tower::Service`, so the gateway composes
//! with ordinary Tower middleware (timeouts, concurrency limits, tracing
//! layers) the way any other Tower service does.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::{Request, Response};
use tower_service::Service;

use crate::{PipelineRequest, RequestPipeline};

/// A `tower::Service<http::Request<Bytes>>` over [`RequestPipeline`]. Always
/// ready: the pipeline holds no per-connection state that needs draining.
#[derive(Clone)]
pub struct GatewayService {
    pipeline: Arc<RequestPipeline>,
}

impl GatewayService {
    pub fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }
}

impl Service<Request<Bytes>> for GatewayService {
    type Response = Response<Bytes>;
    type Error = std::convert::Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let pipeline = Arc::clone(&self.pipeline);
        Box::pin(async move { Ok(pipeline.handle(PipelineRequest::new(request)).await) })
    }
}
