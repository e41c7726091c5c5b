//! Default error-channel responder.

use async_trait::async_trait;
use trellis_core::{
    ErrorKind, ListenerResult, RequestContext, Response, StageListener, StageOutput,
};

/// Builds the default error response on the dispatch and render error
/// channels.
///
/// Routing and controller-resolution failures become a 404; everything else
/// becomes a 500 with a generic message. With
/// [`display_errors`](Self::display_errors) the 500 body carries the error
/// chain instead, for development setups.
pub struct ErrorResponder {
    display_errors: bool,
}

impl ErrorResponder {
    /// Create a responder with generic production bodies.
    pub fn new() -> Self {
        Self {
            display_errors: false,
        }
    }

    /// Include error details in 500 bodies.
    pub fn display_errors(mut self) -> Self {
        self.display_errors = true;
        self
    }
}

impl Default for ErrorResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StageListener for ErrorResponder {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        let Some(kind) = cx.error else {
            return Ok(None);
        };

        let response = match kind {
            ErrorKind::RouterNoMatch | ErrorKind::ControllerNotFound => {
                Response::new().with_status(404).with_body("Page not found.")
            }
            _ => {
                let body = match (&cx.error_detail, self.display_errors) {
                    (Some(detail), true) => format!("An error occurred: {detail}"),
                    _ => "An error occurred.".to_string(),
                };
                Response::new().with_status(500).with_body(body)
            }
        };

        tracing::warn!(error = %kind, status = response.status(), "request failed");
        Ok(Some(StageOutput::Response(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Request, StageError};

    fn cx_with(kind: ErrorKind) -> RequestContext {
        let mut cx = RequestContext::new(Request::get("/"));
        cx.set_error(kind, None);
        cx
    }

    #[tokio::test]
    async fn no_error_is_a_noop() {
        let responder = ErrorResponder::new();
        let mut cx = RequestContext::new(Request::get("/"));
        assert!(responder.on_event(&mut cx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn not_found_kinds_map_to_404() {
        let responder = ErrorResponder::new();
        for kind in [ErrorKind::RouterNoMatch, ErrorKind::ControllerNotFound] {
            let output = responder.on_event(&mut cx_with(kind)).await.unwrap();
            assert_eq!(output.unwrap().as_response().unwrap().status(), 404);
        }
    }

    #[tokio::test]
    async fn other_kinds_map_to_500_with_generic_body() {
        let responder = ErrorResponder::new();
        let mut cx = cx_with(ErrorKind::Exception);
        cx.error_detail = Some(StageError::router_no_match().into());

        let output = responder.on_event(&mut cx).await.unwrap().unwrap();
        let response = output.as_response().unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(response.body(), "An error occurred.");
    }

    #[tokio::test]
    async fn display_errors_exposes_the_detail() {
        let responder = ErrorResponder::new().display_errors();
        let mut cx = cx_with(ErrorKind::Exception);
        cx.error_detail = Some("disk on fire".into());

        let output = responder.on_event(&mut cx).await.unwrap().unwrap();
        assert!(output.as_response().unwrap().body().contains("disk on fire"));
    }
}
