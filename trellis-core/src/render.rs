//! Rendering collaborator trait.

use crate::error::BoxError;
use crate::payload::ViewModel;

/// Turns a view model into a response body.
///
/// Template resolution and rendering strategy are outside the pipeline
/// core; the render stage only relies on this seam.
pub trait Renderer: Send + Sync {
    /// Render the model into a body string.
    fn render(&self, model: &ViewModel) -> Result<String, BoxError>;
}
