//! The middleware bridge: runs a route's middleware pipe inside the
//! dispatch stage.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_core::{
    BoxError, Container, DispatchResult, Dispatchable, ListenerResult, Middleware,
    MiddlewareSpec, Next, Request, RequestContext, StageError, StageListener, StageOutput,
};

/// An ephemeral dispatch target wrapping one request's middleware pipe.
///
/// Wrapping the pipe in a [`Dispatchable`] keeps middleware execution inside
/// the normal dispatch identifier space: cross-cutting subscribers that
/// observe "any dispatchable" see the bridge exactly like a controller.
pub struct MiddlewareController {
    pipe: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareController {
    /// Wrap a resolved pipe.
    pub fn new(pipe: Vec<Arc<dyn Middleware>>) -> Self {
        Self { pipe }
    }
}

#[async_trait]
impl Dispatchable for MiddlewareController {
    async fn dispatch(&self, request: &Request) -> Result<DispatchResult, BoxError> {
        let response = Next::new(self.pipe.clone()).run(request.clone()).await?;
        Ok(DispatchResult::Response(response))
    }
}

/// Dispatch-stage listener activating only for routes that carry a
/// middleware specification.
///
/// Named entries are resolved through the [`Container`]; instances are used
/// as-is. A name that cannot be resolved into a middleware unit fails the
/// stage with `error-middleware-cannot-dispatch` before anything runs. Pipe
/// execution failures, including an exhausted pipe, surface as
/// `error-exception` with the original error attached. A completed pipe
/// clears any earlier error flag and yields its response.
pub struct MiddlewareListener {
    container: Arc<dyn Container>,
}

impl MiddlewareListener {
    /// Create the bridge around a container.
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self { container }
    }

    fn resolve(&self, specs: &[MiddlewareSpec]) -> Result<Vec<Arc<dyn Middleware>>, StageError> {
        let mut pipe = Vec::with_capacity(specs.len());
        for spec in specs {
            match spec {
                MiddlewareSpec::Name(name) => match self.container.middleware(name) {
                    Ok(unit) => pipe.push(unit),
                    Err(err) => {
                        return Err(
                            StageError::middleware_cannot_dispatch(name.clone()).with_source(err)
                        );
                    }
                },
                MiddlewareSpec::Instance(unit) => pipe.push(unit.clone()),
            }
        }
        Ok(pipe)
    }
}

#[async_trait]
impl StageListener for MiddlewareListener {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        let Some(specs) = cx.route_match.as_ref().and_then(|m| m.middleware()) else {
            return Ok(None);
        };

        let pipe = self.resolve(specs)?;
        tracing::debug!(units = pipe.len(), "running middleware pipe");

        let bridge = MiddlewareController::new(pipe);
        cx.controller_name = Some("middleware".to_string());
        cx.controller_type = Some(std::any::type_name::<MiddlewareController>().to_string());

        match bridge.dispatch(&cx.request).await {
            Ok(result) => {
                cx.clear_error();
                let output = result.into_output();
                cx.result = Some(output.clone());
                Ok(Some(output))
            }
            Err(source) => Err(StageError::exception(source).with_controller("middleware")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServiceRegistry;
    use crate::testing::AttributeEchoMiddleware;
    use trellis_core::{
        ErrorKind, ReachedFinalHandler, Response, RouteMatch, middleware_fn,
    };

    fn cx_with_middleware(specs: Vec<MiddlewareSpec>) -> RequestContext {
        let mut cx = RequestContext::new(Request::get("/piped"));
        cx.route_match = Some(RouteMatch::new("piped").with_middleware(specs));
        cx
    }

    #[tokio::test]
    async fn no_middleware_param_is_a_noop() {
        let listener = MiddlewareListener::new(Arc::new(ServiceRegistry::new()));
        let mut cx = RequestContext::new(Request::get("/"));
        cx.route_match = Some(RouteMatch::new("plain").with_controller("home"));

        assert!(listener.on_event(&mut cx).await.unwrap().is_none());
        assert!(cx.controller_name.is_none());
    }

    #[tokio::test]
    async fn unresolvable_name_cannot_dispatch() {
        let listener = MiddlewareListener::new(Arc::new(ServiceRegistry::new()));
        let mut cx = cx_with_middleware(vec!["ghost".into()]);

        let err = listener.on_event(&mut cx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MiddlewareCannotDispatch);
        assert_eq!(err.controller(), Some("ghost"));
    }

    #[tokio::test]
    async fn exhausted_pipe_is_an_exception() {
        let listener = MiddlewareListener::new(Arc::new(ServiceRegistry::new()));
        let mut cx = cx_with_middleware(Vec::new());

        let err = listener.on_event(&mut cx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Exception);
        let (_, source, _) = err.into_parts();
        assert!(
            source
                .unwrap()
                .downcast_ref::<ReachedFinalHandler>()
                .is_some()
        );
    }

    #[tokio::test]
    async fn pipe_runs_in_order_and_clears_error() {
        let mut registry = ServiceRegistry::new();
        registry.register_middleware("tag", AttributeEchoMiddleware::set("who", "pipe"));
        let listener = MiddlewareListener::new(Arc::new(registry));

        let terminal: Arc<dyn Middleware> = Arc::new(middleware_fn(|req: Request, _next| {
            Box::pin(async move {
                Ok(Response::new().with_body(req.attribute("who").unwrap_or("").to_string()))
            })
        }));

        let mut cx = cx_with_middleware(vec!["tag".into(), MiddlewareSpec::Instance(terminal)]);
        cx.set_error(ErrorKind::Exception, None);

        let output = listener.on_event(&mut cx).await.unwrap().unwrap();
        let StageOutput::Response(response) = output else {
            panic!("pipe should produce a response");
        };
        assert_eq!(response.body(), "pipe");
        assert!(cx.error.is_none());
        assert_eq!(cx.controller_name.as_deref(), Some("middleware"));
    }
}
