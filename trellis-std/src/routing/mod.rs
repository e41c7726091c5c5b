//! Routing backends.

mod path;

pub use path::{PathRouter, RouteSpec};

use thiserror::Error;

/// Errors raised while building a route table.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The pattern was rejected by the matching backend.
    #[error("invalid route pattern `{pattern}`")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The backend's rejection.
        #[source]
        source: matchit::InsertError,
    },
}
