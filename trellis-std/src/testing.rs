//! Testing utilities for Trellis.
//!
//! Spies and fixed-output fakes for exercising the bus, the built-in
//! listeners, and full pipelines:
//!
//! - [`RecordingListener`]: records every topic it observes
//! - [`StaticMatcher`]: a route matcher with a fixed outcome
//! - [`EchoController`], [`MapController`], [`FailingController`]: canned
//!   dispatch targets
//! - [`AttributeEchoMiddleware`]: sets a request attribute and delegates
//! - [`TemplateRenderer`], [`FailingRenderer`]: canned renderers

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use trellis_core::{
    BoxError, DispatchResult, Dispatchable, ListenerResult, Middleware, Next, Renderer,
    Request, RequestContext, Response, RouteMatch, RouteMatcher, StageListener, StageOutput,
    Topic, ViewModel,
};

/// A listener that records the topics it observes, together with the
/// propagation flag as seen at entry.
///
/// Cloning shares the recording, so a test can keep one handle while the
/// bus owns another.
pub struct RecordingListener {
    seen: Arc<Mutex<Vec<(Topic, bool)>>>,
    stop: bool,
    output: Option<StageOutput>,
}

impl RecordingListener {
    /// A listener that only observes.
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            stop: false,
            output: None,
        }
    }

    /// Stop propagation after recording.
    pub fn stopping(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Return a fixed output after recording.
    pub fn with_output(mut self, output: StageOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Number of invocations.
    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Topics observed, in order.
    pub fn topics(&self) -> Vec<Topic> {
        self.seen.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    /// Propagation flags observed at entry, in order.
    pub fn entry_flags(&self) -> Vec<bool> {
        self.seen.lock().unwrap().iter().map(|(_, f)| *f).collect()
    }
}

impl Default for RecordingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingListener {
    fn clone(&self) -> Self {
        Self {
            seen: self.seen.clone(),
            stop: self.stop,
            output: self.output.clone(),
        }
    }
}

#[async_trait]
impl StageListener for RecordingListener {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        self.seen
            .lock()
            .unwrap()
            .push((cx.topic, cx.propagation_stopped));
        if self.stop {
            cx.stop_propagation();
        }
        Ok(self.output.clone())
    }
}

/// A route matcher with a fixed outcome.
pub struct StaticMatcher {
    outcome: Option<RouteMatch>,
}

impl StaticMatcher {
    /// Always match with the given result.
    pub fn always(outcome: RouteMatch) -> Self {
        Self {
            outcome: Some(outcome),
        }
    }

    /// Never match.
    pub fn never() -> Self {
        Self { outcome: None }
    }
}

impl RouteMatcher for StaticMatcher {
    fn match_request(&self, _request: &Request) -> Option<RouteMatch> {
        self.outcome.clone()
    }
}

/// A controller that responds with a fixed body.
pub struct EchoController {
    body: String,
}

impl EchoController {
    /// Respond with the given body.
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl Dispatchable for EchoController {
    async fn dispatch(&self, _request: &Request) -> Result<DispatchResult, BoxError> {
        Ok(Response::new().with_body(self.body.clone()).into())
    }
}

/// A controller returning a bare key/value result, for exercising the
/// dispatch stage's normalization.
pub struct MapController {
    values: Vec<(String, String)>,
}

impl MapController {
    /// Return a single-entry map.
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            values: vec![(name.into(), value.into())],
        }
    }
}

#[async_trait]
impl Dispatchable for MapController {
    async fn dispatch(&self, _request: &Request) -> Result<DispatchResult, BoxError> {
        Ok(DispatchResult::Values(self.values.iter().cloned().collect()))
    }
}

/// A controller that always fails.
pub struct FailingController {
    message: String,
}

impl FailingController {
    /// Fail with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Dispatchable for FailingController {
    async fn dispatch(&self, _request: &Request) -> Result<DispatchResult, BoxError> {
        Err(self.message.clone().into())
    }
}

/// Middleware that sets one request attribute and delegates to the rest of
/// the pipe.
pub struct AttributeEchoMiddleware {
    name: String,
    value: String,
}

impl AttributeEchoMiddleware {
    /// Set `name` to `value` before delegating.
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl Middleware for AttributeEchoMiddleware {
    async fn handle(&self, mut request: Request, next: Next) -> Result<Response, BoxError> {
        request.set_attribute(self.name.clone(), self.value.clone());
        next.run(request).await
    }
}

/// Renders a model as `name=value` lines, in variable order.
pub struct TemplateRenderer;

impl Renderer for TemplateRenderer {
    fn render(&self, model: &ViewModel) -> Result<String, BoxError> {
        let mut body = String::new();
        for (name, value) in model.iter() {
            body.push_str(name);
            body.push('=');
            body.push_str(value);
            body.push('\n');
        }
        Ok(body)
    }
}

/// A renderer that always fails.
pub struct FailingRenderer {
    message: String,
}

impl FailingRenderer {
    /// Fail with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Renderer for FailingRenderer {
    fn render(&self, _model: &ViewModel) -> Result<String, BoxError> {
        Err(self.message.clone().into())
    }
}
