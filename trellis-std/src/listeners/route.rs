//! The route stage listener.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_core::{
    ListenerResult, RequestContext, RouteMatcher, StageError, StageListener,
};

/// Matches the request against a [`RouteMatcher`] and records the outcome.
///
/// On a match the route's parameters are merged into the request attributes,
/// replacing the context's request with the enriched value. On no match the
/// stage fails with `error-router-no-match`, which the orchestrator routes
/// into the dispatch error channel.
pub struct RouteListener {
    matcher: Arc<dyn RouteMatcher>,
}

impl RouteListener {
    /// Create the listener around a matcher.
    pub fn new(matcher: Arc<dyn RouteMatcher>) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl StageListener for RouteListener {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        match self.matcher.match_request(&cx.request) {
            Some(matched) => {
                tracing::debug!(route = %matched.route_name(), path = %cx.request.path(), "route matched");
                let request = std::mem::take(&mut cx.request)
                    .with_attributes(matched.params().clone());
                cx.request = request;
                cx.route_match = Some(matched);
                Ok(None)
            }
            None => {
                tracing::debug!(path = %cx.request.path(), "no route matched");
                Err(StageError::router_no_match())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticMatcher;
    use trellis_core::{ErrorKind, Request, RouteMatch};

    #[tokio::test]
    async fn match_merges_params_into_attributes() {
        let matched = RouteMatch::new("user")
            .with_param("id", "7")
            .with_controller("user");
        let listener = RouteListener::new(Arc::new(StaticMatcher::always(matched)));

        let mut cx = RequestContext::new(Request::get("/users/7"));
        listener.on_event(&mut cx).await.unwrap();

        assert_eq!(cx.request.attribute("id"), Some("7"));
        assert_eq!(cx.route_match.as_ref().unwrap().route_name(), "user");
    }

    #[tokio::test]
    async fn no_match_is_a_stage_error() {
        let listener = RouteListener::new(Arc::new(StaticMatcher::never()));
        let mut cx = RequestContext::new(Request::get("/missing"));

        let err = listener.on_event(&mut cx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouterNoMatch);
    }
}
