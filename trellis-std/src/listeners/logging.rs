//! Finish-stage request logging.

use async_trait::async_trait;
use trellis_core::{ListenerResult, RequestContext, StageListener};

/// Logs one line per completed request.
pub struct LoggingListener;

#[async_trait]
impl StageListener for LoggingListener {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        tracing::info!(
            method = %cx.request.method(),
            path = %cx.request.path(),
            status = cx.response.status(),
            error = cx.error.map(|kind| kind.as_str()),
            "request finished"
        );
        Ok(None)
    }
}
