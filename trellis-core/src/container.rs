//! Service container collaborator trait.

use crate::dispatch::Dispatchable;
use crate::error::ContainerError;
use crate::middleware::Middleware;
use std::sync::Arc;

/// The registry the dispatch stage resolves named targets through.
///
/// Unknown names are rejected here, at a single well-defined boundary, with
/// distinguishable not-found vs. wrong-type failures (see
/// [`ContainerError`]).
pub trait Container: Send + Sync {
    /// Whether anything is registered under the name.
    fn has(&self, name: &str) -> bool;

    /// Resolve a controller.
    fn controller(&self, name: &str) -> Result<Arc<dyn Dispatchable>, ContainerError>;

    /// Resolve a middleware unit.
    fn middleware(&self, name: &str) -> Result<Arc<dyn Middleware>, ContainerError>;
}
