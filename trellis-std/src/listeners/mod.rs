//! Built-in stage listeners.

mod dispatch;
mod errors;
mod logging;
mod middleware;
mod render;
mod route;

pub use dispatch::DispatchListener;
pub use errors::ErrorResponder;
pub use logging::LoggingListener;
pub use middleware::{MiddlewareController, MiddlewareListener};
pub use render::RenderListener;
pub use route::RouteListener;
