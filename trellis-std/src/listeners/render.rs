//! The render stage listener.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_core::{
    ListenerResult, Renderer, RequestContext, StageError, StageListener, StageOutput,
};

/// Materializes the context result into the response.
///
/// A `Model` result is rendered through the [`Renderer`] into the response
/// body; a `Response` result (e.g. produced by an error responder earlier in
/// the request) replaces the context response wholesale. Renderer failures
/// fail the stage, which the orchestrator routes into the render error
/// channel.
pub struct RenderListener {
    renderer: Arc<dyn Renderer>,
}

impl RenderListener {
    /// Create the listener around a renderer.
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl StageListener for RenderListener {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        match &cx.result {
            Some(StageOutput::Response(response)) => {
                cx.response = response.clone();
                Ok(None)
            }
            Some(StageOutput::Model(model)) => match self.renderer.render(model) {
                Ok(body) => {
                    cx.response.set_body(body);
                    Ok(None)
                }
                Err(source) => Err(StageError::exception(source)),
            },
            None => Ok(None),
        }
    }
}
