//! The stage listener trait.

use crate::context::RequestContext;
use crate::error::StageError;
use crate::payload::StageOutput;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// What a listener invocation yields.
///
/// - `Ok(None)`: the stage was observed; continue to the next listener.
/// - `Ok(Some(output))`: the listener produced a payload. The bus records
///   the last non-`None` output as the trigger result.
/// - `Err(stage_error)`: the stage failed; the orchestrator converts the
///   error into a trigger of the matching error channel.
pub type ListenerResult = Result<Option<StageOutput>, StageError>;

/// A subscriber on one stage topic.
///
/// Listeners are stored as trait objects in the event bus and invoked in
/// priority order with exclusive access to the request context. The same
/// listener value may be attached to any number of topics, any number of
/// times.
#[async_trait]
pub trait StageListener: Send + Sync {
    /// Called when the listener's topic is triggered.
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult;
}

/// Adapter wrapping a plain function into a [`StageListener`].
///
/// Created by [`listener_fn`].
pub struct FnListener<F> {
    func: F,
}

/// Wrap a function returning a boxed future into a [`StageListener`].
///
/// ```rust,ignore
/// let listener = listener_fn(|cx: &mut RequestContext| {
///     Box::pin(async move {
///         cx.response.set_header("x-observed", "1");
///         Ok(None)
///     })
/// });
/// ```
pub fn listener_fn<F>(func: F) -> FnListener<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ListenerResult>
        + Send
        + Sync
        + 'static,
{
    FnListener { func }
}

#[async_trait]
impl<F> StageListener for FnListener<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ListenerResult>
        + Send
        + Sync
        + 'static,
{
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        (self.func)(cx).await
    }
}
