//! Dispatch target traits.

use crate::error::BoxError;
use crate::http::{Request, Response};
use crate::payload::{StageOutput, ViewModel};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;

/// What a dispatch target may produce.
///
/// `Values` is the bare associative shape; the dispatch stage normalizes it
/// into a [`ViewModel`] via [`DispatchResult::into_output`] so renderers
/// never see raw maps.
#[derive(Debug, Clone)]
pub enum DispatchResult {
    /// A finished response, terminal for the request.
    Response(Response),
    /// A model destined for rendering.
    Model(ViewModel),
    /// A bare key/value result, wrapped into a model by the dispatch stage.
    Values(HashMap<String, String>),
}

impl DispatchResult {
    /// Normalize into a [`StageOutput`], wrapping bare values into a model.
    pub fn into_output(self) -> StageOutput {
        match self {
            DispatchResult::Response(resp) => StageOutput::Response(resp),
            DispatchResult::Model(model) => StageOutput::Model(model),
            DispatchResult::Values(map) => StageOutput::Model(ViewModel::from(map)),
        }
    }
}

impl From<Response> for DispatchResult {
    fn from(resp: Response) -> Self {
        DispatchResult::Response(resp)
    }
}

impl From<ViewModel> for DispatchResult {
    fn from(model: ViewModel) -> Self {
        DispatchResult::Model(model)
    }
}

impl From<HashMap<String, String>> for DispatchResult {
    fn from(map: HashMap<String, String>) -> Self {
        DispatchResult::Values(map)
    }
}

/// Anything capable of producing a result from a request: a controller, or
/// the middleware bridge.
#[async_trait]
pub trait Dispatchable: Send + Sync {
    /// Handle the request.
    async fn dispatch(&self, request: &Request) -> Result<DispatchResult, BoxError>;
}

/// Adapter wrapping a plain async function into a [`Dispatchable`].
///
/// Created by [`dispatch_fn`].
pub struct FnController<F> {
    func: F,
}

/// Wrap a function returning a boxed future into a [`Dispatchable`].
///
/// ```rust,ignore
/// let controller = dispatch_fn(|req: &Request| {
///     Box::pin(async move {
///         Ok(Response::new().with_body(req.path().to_string()).into())
///     })
/// });
/// ```
pub fn dispatch_fn<F>(func: F) -> FnController<F>
where
    F: for<'a> Fn(&'a Request) -> BoxFuture<'a, Result<DispatchResult, BoxError>>
        + Send
        + Sync
        + 'static,
{
    FnController { func }
}

#[async_trait]
impl<F> Dispatchable for FnController<F>
where
    F: for<'a> Fn(&'a Request) -> BoxFuture<'a, Result<DispatchResult, BoxError>>
        + Send
        + Sync
        + 'static,
{
    async fn dispatch(&self, request: &Request) -> Result<DispatchResult, BoxError> {
        (self.func)(request).await
    }
}
