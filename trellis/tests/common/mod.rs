//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use trellis::prelude::*;
use trellis::{ListenerResult, Middleware, ReachedFinalHandler, middleware_fn};

/// What an [`ErrorSpy`] saw on an error channel.
#[derive(Debug, Clone)]
pub struct Sighting {
    pub kind: ErrorKind,
    pub controller: Option<String>,
    pub pipe_exhausted: bool,
}

/// An error-channel listener recording the context's error state.
///
/// Cloning shares the recording.
pub struct ErrorSpy {
    seen: Arc<Mutex<Vec<Sighting>>>,
}

impl ErrorSpy {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn last(&self) -> Option<Sighting> {
        self.seen.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Clone for ErrorSpy {
    fn clone(&self) -> Self {
        Self {
            seen: self.seen.clone(),
        }
    }
}

#[async_trait]
impl StageListener for ErrorSpy {
    async fn on_event(&self, cx: &mut RequestContext) -> ListenerResult {
        if let Some(kind) = cx.error {
            let pipe_exhausted = cx
                .error_detail
                .as_ref()
                .is_some_and(|detail| detail.downcast_ref::<ReachedFinalHandler>().is_some());
            self.seen.lock().unwrap().push(Sighting {
                kind,
                controller: cx.controller_name.clone(),
                pipe_exhausted,
            });
        }
        Ok(None)
    }
}

/// A listener that always fails its stage.
pub struct FailingListener(pub &'static str);

#[async_trait]
impl StageListener for FailingListener {
    async fn on_event(&self, _cx: &mut RequestContext) -> ListenerResult {
        Err(StageError::exception(self.0))
    }
}

/// Terminal middleware answering with the value of a request attribute.
pub fn attribute_responder(name: &'static str) -> impl Middleware {
    middleware_fn(move |request: Request, _next: Next| {
        Box::pin(async move {
            let value = request.attribute(name).unwrap_or("").to_string();
            Ok(Response::new().with_body(value))
        })
    })
}
