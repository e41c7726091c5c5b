//! The middleware interface and pipe delegation.
//!
//! A middleware pipe is an ordered list of units, each receiving the request
//! and a [`Next`] handle owning the remainder of the pipe. A unit either
//! produces a [`Response`] (terminating the pipe) or delegates via
//! `next.run(request)`. A pipe that runs out of units without any producing
//! a response fails with [`ReachedFinalHandler`].

use crate::error::{BoxError, ReachedFinalHandler};
use crate::http::{Request, Response};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::Arc;

/// One unit of a middleware pipe.
///
/// This is the single polymorphic middleware shape in Trellis; plain
/// functions adapt into it via [`middleware_fn`].
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request, either producing a response or delegating to
    /// the rest of the pipe via `next`.
    async fn handle(&self, request: Request, next: Next) -> Result<Response, BoxError>;
}

/// The remainder of a middleware pipe.
///
/// Owned by value: calling [`Next::run`] consumes the handle, so a unit can
/// delegate at most once.
pub struct Next {
    stack: VecDeque<Arc<dyn Middleware>>,
}

impl Next {
    /// Build the delegation handle for a full pipe.
    pub fn new(pipe: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            stack: pipe.into(),
        }
    }

    /// Run the remaining pipe against the request.
    ///
    /// An exhausted pipe yields [`ReachedFinalHandler`].
    pub fn run(mut self, request: Request) -> BoxFuture<'static, Result<Response, BoxError>> {
        Box::pin(async move {
            let Some(unit) = self.stack.pop_front() else {
                return Err(ReachedFinalHandler.into());
            };
            unit.handle(request, self).await
        })
    }
}

/// Adapter wrapping a plain function into a [`Middleware`].
///
/// Created by [`middleware_fn`].
pub struct FnMiddleware<F> {
    func: F,
}

/// Wrap a function returning a boxed future into a [`Middleware`].
///
/// ```rust,ignore
/// let unit = middleware_fn(|mut req: Request, next: Next| {
///     Box::pin(async move {
///         req.set_attribute("seen", "yes");
///         next.run(req).await
///     })
/// });
/// ```
pub fn middleware_fn<F>(func: F) -> FnMiddleware<F>
where
    F: Fn(Request, Next) -> BoxFuture<'static, Result<Response, BoxError>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware { func }
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> BoxFuture<'static, Result<Response, BoxError>>
        + Send
        + Sync
        + 'static,
{
    async fn handle(&self, request: Request, next: Next) -> Result<Response, BoxError> {
        (self.func)(request, next).await
    }
}
