//! The application orchestrator.
//!
//! [`Application`] owns a frozen [`EventBus`] and drives one
//! [`RequestContext`] through the staged lifecycle:
//!
//! ```text
//! Bootstrap (once) -> Route -> Dispatch -> Render -> Finish
//!                       |          |
//!                       v          v
//!                  DispatchError  DispatchError / RenderError
//! ```
//!
//! A stage that produces a terminal [`Response`] short-circuits the rest of
//! the pipeline; Finish runs unconditionally, exactly once per request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use trellis_core::{
    CancelToken, Container, FatalError, Renderer, Request, RequestContext, Response,
    RouteMatcher, StageError, StageListener, StageOutput, Topic,
};
use trellis_std::bus::{BusBuilder, EventBus};
use trellis_std::listeners::{
    DispatchListener, ErrorResponder, LoggingListener, MiddlewareListener, RenderListener,
    RouteListener,
};

// A stage ends early once any listener produced a terminal response or
// flagged an error on the context.
fn short_circuit(cx: &RequestContext, last: Option<&StageOutput>) -> bool {
    matches!(last, Some(StageOutput::Response(_))) || cx.error.is_some()
}

/// Assembles an [`Application`] from collaborators and listeners.
///
/// The stock listeners are attached at priority 1 during
/// [`build`](Self::build), after any user attachments, so a user listener at
/// the same priority runs first and a higher priority always wins.
///
/// # Example
/// ```ignore
/// let app = Application::builder()
///     .matcher(router)
///     .container(services)
///     .renderer(TemplateRenderer)
///     .build();
/// let response = app.run(Request::get("/users/42")).await?;
/// ```
pub struct ApplicationBuilder {
    bus: BusBuilder,
    matcher: Option<Arc<dyn RouteMatcher>>,
    container: Option<Arc<dyn Container>>,
    renderer: Option<Arc<dyn Renderer>>,
    display_exceptions: bool,
    defaults: bool,
}

impl ApplicationBuilder {
    /// Start an empty builder with stock listeners enabled.
    pub fn new() -> Self {
        Self {
            bus: BusBuilder::new(),
            matcher: None,
            container: None,
            renderer: None,
            display_exceptions: false,
            defaults: true,
        }
    }

    /// Skip the stock listeners entirely. The pipeline then runs only what
    /// was attached explicitly.
    pub fn bare() -> Self {
        Self {
            defaults: false,
            ..Self::new()
        }
    }

    /// Route requests with this matcher.
    pub fn matcher(mut self, matcher: impl RouteMatcher + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Resolve controllers and middleware from this container.
    pub fn container(mut self, container: impl Container + 'static) -> Self {
        self.container = Some(Arc::new(container));
        self
    }

    /// Render view models with this renderer.
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Include error details in stock 500 bodies.
    pub fn display_exceptions(mut self) -> Self {
        self.display_exceptions = true;
        self
    }

    /// Attach a listener to a topic.
    pub fn attach<L>(mut self, topic: Topic, priority: i32, listener: L) -> Self
    where
        L: StageListener + 'static,
    {
        self.bus = self.bus.attach(topic, priority, listener);
        self
    }

    /// Attach an already shared listener, for spanning several topics.
    pub fn attach_shared(
        mut self,
        topic: Topic,
        priority: i32,
        listener: Arc<dyn StageListener>,
    ) -> Self {
        self.bus = self.bus.attach_shared(topic, priority, listener);
        self
    }

    /// Freeze the bus and produce the application.
    pub fn build(mut self) -> Application {
        if self.defaults {
            if let Some(matcher) = self.matcher.take() {
                self.bus = self.bus.attach(Topic::Route, 1, RouteListener::new(matcher));
            }
            if let Some(container) = self.container.take() {
                self.bus = self
                    .bus
                    .attach(Topic::Dispatch, 1, MiddlewareListener::new(container.clone()))
                    .attach(Topic::Dispatch, 1, DispatchListener::new(container));
            }
            if let Some(renderer) = self.renderer.take() {
                self.bus = self.bus.attach(Topic::Render, 1, RenderListener::new(renderer));
            }

            let mut responder = ErrorResponder::new();
            if self.display_exceptions {
                responder = responder.display_errors();
            }
            let responder: Arc<dyn StageListener> = Arc::new(responder);
            self.bus = self
                .bus
                .attach_shared(Topic::DispatchError, 1, responder.clone())
                .attach_shared(Topic::RenderError, 1, responder)
                .attach(Topic::Finish, 1, LoggingListener);
        }

        Application {
            bus: self.bus.build(),
            bootstrapped: AtomicBool::new(false),
        }
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The staged request pipeline.
///
/// Cheap to share behind an [`Arc`]; all per-request state lives in the
/// [`RequestContext`] created by [`run`](Self::run).
pub struct Application {
    bus: EventBus,
    bootstrapped: AtomicBool,
}

impl Application {
    /// Start building an application.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// The frozen bus, for inspection.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Run one request through the pipeline.
    pub async fn run(&self, request: Request) -> Result<Response, FatalError> {
        self.run_with(request, CancelToken::new()).await
    }

    /// Run one request carrying an externally owned cancellation token.
    ///
    /// Cancellation is observed at stage boundaries: remaining stages are
    /// skipped, Finish still runs, and whatever response was built so far is
    /// returned.
    pub async fn run_with(
        &self,
        request: Request,
        cancel: CancelToken,
    ) -> Result<Response, FatalError> {
        self.bootstrap().await;

        let mut cx = RequestContext::with_cancel(request, cancel);
        let driven = self.drive(&mut cx).await;

        // Finish fires exactly once, on every path out of the pipeline,
        // before any fatal error is surfaced.
        if let Err(error) = self.bus.trigger(Topic::Finish, &mut cx).await {
            tracing::error!(error = %error, "finish listener failed");
        }

        driven?;
        Ok(cx.response)
    }

    // Bootstrap runs once per application, on the first request, against a
    // throwaway context. Failures are logged and do not fail the request.
    async fn bootstrap(&self) {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut cx = RequestContext::new(Request::default());
        if let Err(error) = self.bus.trigger(Topic::Bootstrap, &mut cx).await {
            tracing::error!(error = %error, "bootstrap listener failed");
        }
    }

    async fn drive(&self, cx: &mut RequestContext) -> Result<(), FatalError> {
        match self.bus.trigger_until(Topic::Route, cx, short_circuit).await {
            Err(error) => {
                // Routing failures go through the error channel and then
                // straight to rendering; dispatch is skipped.
                self.handle_stage_error(cx, error).await;
                return self.render(cx).await;
            }
            Ok(Some(StageOutput::Response(response))) => {
                cx.response = response;
                return Ok(());
            }
            Ok(_) => {}
        }
        if cx.error.is_some() {
            return self.render(cx).await;
        }
        if cx.cancel.is_cancelled() {
            return Ok(());
        }

        match self.bus.trigger_until(Topic::Dispatch, cx, short_circuit).await {
            Err(error) => {
                let recovered = self.handle_stage_error(cx, error).await;
                match recovered.or_else(|| cx.result.clone()) {
                    Some(StageOutput::Response(response)) => {
                        cx.response = response;
                        Ok(())
                    }
                    _ => self.render(cx).await,
                }
            }
            Ok(Some(StageOutput::Response(response))) => {
                // A controller that answered with a full response skips
                // rendering.
                cx.response = response;
                Ok(())
            }
            Ok(output) => {
                if let Some(output) = output {
                    cx.result = Some(output);
                }
                if cx.cancel.is_cancelled() {
                    return Ok(());
                }
                self.render(cx).await
            }
        }
    }

    async fn render(&self, cx: &mut RequestContext) -> Result<(), FatalError> {
        if let Err(error) = self.bus.trigger(Topic::Render, cx).await {
            self.handle_render_error(cx, error).await?;
        }
        Ok(())
    }

    // Records the failure on the context and gives the dispatch error
    // channel a chance to substitute a response. Errors raised by the
    // channel itself are logged and swallowed.
    async fn handle_stage_error(
        &self,
        cx: &mut RequestContext,
        error: StageError,
    ) -> Option<StageOutput> {
        let (kind, detail, controller) = error.into_parts();
        tracing::debug!(error = %kind, "stage failed");
        cx.set_error(kind, detail);
        if let Some(name) = controller {
            cx.controller_name = Some(name);
        }

        match self.bus.trigger(Topic::DispatchError, cx).await {
            Ok(output) => {
                if let Some(output) = &output {
                    if let StageOutput::Response(response) = output {
                        cx.response = response.clone();
                    }
                    cx.result = Some(output.clone());
                }
                output
            }
            Err(channel_error) => {
                tracing::error!(error = %channel_error, "dispatch error listener failed");
                None
            }
        }
    }

    // The render error channel is the last resort; a failure inside it is
    // fatal to the request.
    async fn handle_render_error(
        &self,
        cx: &mut RequestContext,
        error: StageError,
    ) -> Result<(), FatalError> {
        let (kind, detail, controller) = error.into_parts();
        tracing::debug!(error = %kind, "render failed");
        cx.set_error(kind, detail);
        if let Some(name) = controller {
            cx.controller_name = Some(name);
        }

        match self.bus.trigger(Topic::RenderError, cx).await {
            Ok(output) => {
                if let Some(output) = output {
                    if let StageOutput::Response(response) = &output {
                        cx.response = response.clone();
                    }
                    cx.result = Some(output);
                }
                Ok(())
            }
            Err(nested) => Err(FatalError::RenderListener(nested)),
        }
    }
}
