//! The dispatch stage listener.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_core::{
    Container, ContainerError, ListenerResult, RequestContext, StageError, StageListener,
};

/// Resolves the matched controller through the [`Container`] and invokes it.
///
/// Resolution failures keep their distinction: a missing name becomes
/// `error-controller-not-found`, a name bound to something non-dispatchable
/// becomes `error-controller-invalid`, and anything else (including an
/// invocation failure) becomes `error-exception` with the original error
/// attached. On success any lingering error flag from an earlier attempt is
/// cleared and the result is normalized before being stored.
///
/// Routes carrying a middleware specification are left to the
/// [`MiddlewareListener`](super::MiddlewareListener).
pub struct DispatchListener {
    container: Arc<dyn Container>,
}

impl DispatchListener {
    /// Create the listener around a container.
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self { container }
    }
}

#[async_trait]
impl StageListener for DispatchListener {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        let Some(route) = cx.route_match.as_ref() else {
            return Ok(None);
        };
        if route.middleware().is_some() {
            return Ok(None);
        }
        let Some(name) = route.controller().map(str::to_string) else {
            return Err(StageError::controller_not_found(route.route_name()));
        };

        cx.controller_name = Some(name.clone());
        let controller = match self.container.controller(&name) {
            Ok(controller) => controller,
            Err(err @ ContainerError::NotFound { .. }) => {
                return Err(StageError::controller_not_found(name).with_source(err));
            }
            Err(err @ ContainerError::WrongType { .. }) => {
                return Err(StageError::controller_invalid(name).with_source(err));
            }
            Err(ContainerError::Failed { source, .. }) => {
                return Err(StageError::exception(source).with_controller(name));
            }
        };

        tracing::debug!(controller = %name, "dispatching");
        match controller.dispatch(&cx.request).await {
            Ok(result) => {
                cx.clear_error();
                let output = result.into_output();
                cx.result = Some(output.clone());
                Ok(Some(output))
            }
            Err(source) => Err(StageError::exception(source).with_controller(name)),
        }
    }
}
