//! Events emitted by the request pipeline (spec §4.5, §7).

use ringfront_core::GatewayEvent;
use std::time::Instant;

/// Observability events for the top-level request lifecycle.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// The transaction id (and, if derivable, client IP) has been resolved
    /// for this request and recorded in the logger's request context (spec
    /// §4.5 step 9).
    RequestStarted {
        trans_id: String,
        client_ip: Option<String>,
        timestamp: Instant,
    },
    /// A request was rejected before a controller was instantiated, e.g.
    /// `MalformedPath`, `BadEncoding`, `ForbiddenHost`.
    Rejected {
        trans_id: String,
        reason: &'static str,
        timestamp: Instant,
    },
    /// The authorization hook denied the request and `delay_denial` was not
    /// set, so the denial is returned immediately.
    AuthorizationDenied {
        trans_id: String,
        timestamp: Instant,
    },
    /// A handler completed and returned a response.
    Dispatched {
        trans_id: String,
        method: String,
        status: u16,
        timestamp: Instant,
    },
    /// An unhandled exception or timeout occurred at the pipeline level.
    InternalError {
        trans_id: String,
        timestamp: Instant,
    },
}

impl GatewayEvent for PipelineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::RequestStarted { .. } => "request_started",
            PipelineEvent::Rejected { .. } => "request_rejected",
            PipelineEvent::AuthorizationDenied { .. } => "request_denied",
            PipelineEvent::Dispatched { .. } => "request_dispatched",
            PipelineEvent::InternalError { .. } => "request_internal_error",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            PipelineEvent::RequestStarted { timestamp, .. } => *timestamp,
            PipelineEvent::Rejected { timestamp, .. } => *timestamp,
            PipelineEvent::AuthorizationDenied { timestamp, .. } => *timestamp,
            PipelineEvent::Dispatched { timestamp, .. } => *timestamp,
            PipelineEvent::InternalError { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            PipelineEvent::RequestStarted { trans_id, .. } => trans_id,
            PipelineEvent::Rejected { trans_id, .. } => trans_id,
            PipelineEvent::AuthorizationDenied { trans_id, .. } => trans_id,
            PipelineEvent::Dispatched { trans_id, .. } => trans_id,
            PipelineEvent::InternalError { trans_id, .. } => trans_id,
        }
    }
}
