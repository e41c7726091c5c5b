//! # trellis-core
//!
//! Core types and collaborator traits for the Trellis request pipeline.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! listeners and extensions that don't need the full `trellis-std`
//! implementation.
//!
//! # Request Lifecycle
//!
//! Trellis drives every request through a fixed sequence of stages, each
//! identified by a [`Topic`]:
//!
//! **Route → Dispatch → Render → Finish**, with two error side channels
//! (**DispatchError**, **RenderError**) reachable when a stage fails.
//!
//! All stages share one mutable [`RequestContext`], threaded explicitly
//! through every listener call. A stage is a set of [`StageListener`]s
//! subscribed to its topic; any listener can produce a terminal
//! [`StageOutput`] that short-circuits the remaining stages, and any listener
//! can halt its own stage via [`RequestContext::stop_propagation`].
//!
//! # Collaborator Seams
//!
//! The pipeline itself is agnostic of routing tables, controllers, and
//! templates. It consumes:
//!
//! - [`RouteMatcher`]: turns a request into a [`RouteMatch`]
//! - [`Container`]: resolves named [`Dispatchable`] and [`Middleware`] units
//! - [`Dispatchable`]: anything capable of producing a [`DispatchResult`]
//!   from a request (a controller, or the middleware bridge)
//! - [`Middleware`]: one unit of a linear pipe, delegating via [`Next`]
//! - [`Renderer`]: turns a [`ViewModel`] into a response body
//!
//! # Error Model
//!
//! Stage failures are explicit values, never unwound exceptions: listeners
//! return [`StageError`] tagged with an [`ErrorKind`], and the orchestrator
//! converts it into a trigger of the matching error topic. Only a failure
//! raised from *inside* a RenderError listener is fatal ([`FatalError`]).

#![warn(missing_docs)]

mod container;
mod context;
mod dispatch;
mod error;
mod http;
mod listener;
mod middleware;
mod payload;
mod render;
mod routing;
mod topic;

// Re-exports
pub use container::Container;
pub use context::{CancelToken, RequestContext};
pub use dispatch::{DispatchResult, Dispatchable, FnController, dispatch_fn};
pub use error::{
    BoxError, ContainerError, ErrorKind, FatalError, ReachedFinalHandler, StageError,
};
pub use http::{Request, Response};
pub use listener::{FnListener, ListenerResult, StageListener, listener_fn};
pub use middleware::{FnMiddleware, Middleware, Next, middleware_fn};
pub use payload::{StageOutput, ViewModel};
pub use render::Renderer;
pub use routing::{MiddlewareSpec, RouteMatch, RouteMatcher};
pub use topic::Topic;
