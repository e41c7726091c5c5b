//! The shared per-request context.

use crate::error::{BoxError, ErrorKind};
use crate::http::{Request, Response};
use crate::payload::StageOutput;
use crate::routing::RouteMatch;
use crate::topic::Topic;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// The mutable carrier threaded through every stage of one request.
///
/// Exactly one `RequestContext` exists per in-flight request. It is created
/// by the orchestrator, passed `&mut` into every listener, and never cloned
/// mid-flight. There is no ambient state: everything a stage observes or
/// mutates lives here.
#[derive(Debug)]
pub struct RequestContext {
    /// The stage currently being triggered. Set by the bus before each
    /// trigger, including the error channels.
    pub topic: Topic,
    /// The in-flight request. The route stage replaces it wholesale when
    /// merging matched parameters.
    pub request: Request,
    /// The response under construction. Any stage may replace it.
    pub response: Response,
    /// Routing outcome. Set once by the route stage, never by later stages.
    pub route_match: Option<RouteMatch>,
    /// Error-kind tag; `None` means no error.
    pub error: Option<ErrorKind>,
    /// The original error behind `error`, for the error channel to inspect.
    pub error_detail: Option<BoxError>,
    /// The terminal payload, inspected for short-circuiting.
    pub result: Option<StageOutput>,
    /// Name of the dispatch target, populated during dispatch (and on
    /// dispatch failures, for diagnostics).
    pub controller_name: Option<String>,
    /// Implementation identity of the dispatch target, when known.
    pub controller_type: Option<String>,
    /// Halts remaining listeners within the current stage. Reset to `false`
    /// at the start of every stage trigger; it never leaks across stages.
    pub propagation_stopped: bool,
    /// Cancellation token checked at stage boundaries.
    pub cancel: CancelToken,
}

impl RequestContext {
    /// Create a context for one request.
    pub fn new(request: Request) -> Self {
        Self::with_cancel(request, CancelToken::new())
    }

    /// Create a context carrying an externally owned cancellation token.
    pub fn with_cancel(request: Request, cancel: CancelToken) -> Self {
        Self {
            topic: Topic::Bootstrap,
            request,
            response: Response::new(),
            route_match: None,
            error: None,
            error_detail: None,
            result: None,
            controller_name: None,
            controller_type: None,
            propagation_stopped: false,
            cancel,
        }
    }

    /// Halt the remaining listeners of the current stage.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Record an error for the error channel to consume.
    pub fn set_error(&mut self, kind: ErrorKind, detail: Option<BoxError>) {
        self.error = Some(kind);
        self.error_detail = detail;
    }

    /// Clear any recorded error. A successful dispatch calls this so a
    /// recovered request does not carry a stale error flag into rendering.
    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_detail = None;
    }
}

/// A handle for cancelling a request from outside the pipeline.
///
/// The orchestrator checks the token at stage boundaries; a cancelled
/// request skips the remaining stages but still runs Finish.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a live (non-cancelled) token.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
