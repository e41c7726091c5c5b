//! Trellis is an event-driven request pipeline.
//!
//! Every request flows through a fixed set of stages published on an event
//! bus: `Route`, `Dispatch`, `Render`, `Finish`, with `DispatchError` and
//! `RenderError` as side channels. Listeners subscribe to stages by
//! priority and share one mutable [`RequestContext`] per request; the
//! [`Application`] orchestrator owns the ordering and short-circuiting
//! rules between stages.
//!
//! This facade re-exports the contract types from `trellis-core` and the
//! stock implementations from `trellis-std`, and adds the orchestrator.
//!
//! # Quick start
//! ```ignore
//! use trellis::prelude::*;
//!
//! let mut router = PathRouter::new();
//! router.add("home", "/", RouteSpec::new().controller("home"))?;
//!
//! let mut services = ServiceRegistry::new();
//! services.register_controller("home", HomeController);
//!
//! let app = Application::builder()
//!     .matcher(router)
//!     .container(services)
//!     .renderer(MyRenderer)
//!     .build();
//!
//! let response = app.run(Request::get("/")).await?;
//! ```

#![warn(missing_docs)]

pub mod application;

pub use application::{Application, ApplicationBuilder};

pub use trellis_core::{
    BoxError, CancelToken, Container, ContainerError, DispatchResult, Dispatchable, ErrorKind,
    FatalError, FnController, FnListener, FnMiddleware, ListenerResult, Middleware,
    MiddlewareSpec, Next, ReachedFinalHandler, Renderer, Request, RequestContext, Response,
    RouteMatch, RouteMatcher, StageError, StageListener, StageOutput, Topic, ViewModel,
    dispatch_fn, listener_fn, middleware_fn,
};

pub use trellis_std::bus::{BusBuilder, EventBus};
pub use trellis_std::listeners;
pub use trellis_std::registry::ServiceRegistry;
pub use trellis_std::routing::{PathRouter, RouteSpec, RoutingError};
pub use trellis_std::testing;

/// One-stop imports for applications and tests.
pub mod prelude {
    pub use crate::application::{Application, ApplicationBuilder};
    pub use trellis_core::{
        CancelToken, DispatchResult, Dispatchable, ErrorKind, Middleware, MiddlewareSpec, Next,
        Renderer, Request, RequestContext, Response, RouteMatch, RouteMatcher, StageError,
        StageListener, StageOutput, Topic, ViewModel,
    };
    pub use trellis_std::bus::{BusBuilder, EventBus};
    pub use trellis_std::registry::ServiceRegistry;
    pub use trellis_std::routing::{PathRouter, RouteSpec};
}
