//! Errors the pipeline surfaces to the client (spec §7).

use bytes::Bytes;
use http::{Response, StatusCode};
use thiserror::Error;

/// A pipeline-level failure, each carrying enough structure to render the
/// documented HTTP outcome via [`PipelineError::to_response`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Path is not valid UTF-8 or contains a NUL byte.
    #[error("invalid UTF8 or contains NULL")]
    BadEncoding,

    /// `Content-Length` was present and negative.
    #[error("invalid content length")]
    BadContentLength,

    /// The path failed the segment grammar (too few/many segments).
    #[error("malformed path")]
    MalformedPath,

    /// The path split cleanly but matched no resource kind.
    #[error("bad URL")]
    BadUrl,

    /// The request's `Host` header matched `deny_host_headers`.
    #[error("invalid host header")]
    ForbiddenHost,

    /// The controller has no handler for this method, or the handler is not
    /// publicly accessible. Carries the controller's `Allow` header value.
    #[error("method not allowed")]
    MethodNotAllowed { allowed: Vec<String> },

    /// The authorization hook denied the request; the carried response is
    /// returned verbatim.
    #[error("authorization denied")]
    Unauthorized(Response<Bytes>),

    /// An unhandled exception or timeout occurred at the pipeline level.
    #[error("internal error")]
    InternalError,
}

impl PipelineError {
    /// Renders this error as the HTTP response the client actually sees, per
    /// the spec §7 status table.
    pub fn to_response(self) -> Response<Bytes> {
        match self {
            PipelineError::BadEncoding => {
                status_response(StatusCode::PRECONDITION_FAILED, "Invalid UTF8 or contains NULL")
            }
            PipelineError::BadContentLength => {
                status_response(StatusCode::BAD_REQUEST, "Invalid Content-Length")
            }
            PipelineError::MalformedPath => status_response(StatusCode::NOT_FOUND, "Not Found"),
            PipelineError::BadUrl => status_response(StatusCode::PRECONDITION_FAILED, "Bad URL"),
            PipelineError::ForbiddenHost => {
                status_response(StatusCode::FORBIDDEN, "Invalid host header")
            }
            PipelineError::MethodNotAllowed { allowed } => Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header("allow", allowed.join(", "))
                .body(Bytes::from_static(b"Method Not Allowed"))
                .expect("static method-not-allowed response is well-formed"),
            PipelineError::Unauthorized(response) => response,
            PipelineError::InternalError => {
                status_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn status_response(status: StatusCode, body: &'static str) -> Response<Bytes> {
    Response::builder()
        .status(status)
        .body(Bytes::from_static(body.as_bytes()))
        .expect("static error response is well-formed")
}
