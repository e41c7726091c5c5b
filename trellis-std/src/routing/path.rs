//! Path-pattern route matcher backed by `matchit`.

use super::RoutingError;
use std::collections::HashMap;
use trellis_core::{MiddlewareSpec, Request, RouteMatch, RouteMatcher};

/// What a route resolves to: a controller, a middleware pipe, or both, plus
/// static default parameters.
#[derive(Debug, Clone, Default)]
pub struct RouteSpec {
    controller: Option<String>,
    middleware: Option<Vec<MiddlewareSpec>>,
    defaults: HashMap<String, String>,
}

impl RouteSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch to the named controller.
    pub fn controller(mut self, name: impl Into<String>) -> Self {
        self.controller = Some(name.into());
        self
    }

    /// Dispatch through a middleware pipe.
    pub fn middleware<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MiddlewareSpec>,
    {
        self.middleware = Some(specs.into_iter().map(Into::into).collect());
        self
    }

    /// Add a static default parameter, overridable by matched path params.
    pub fn default_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }
}

struct Entry {
    name: String,
    spec: RouteSpec,
}

/// A [`RouteMatcher`] over `matchit` path patterns (`/users/{id}`).
///
/// # Example
/// ```ignore
/// let mut router = PathRouter::new();
/// router.add("user", "/users/{id}", RouteSpec::new().controller("user"))?;
/// ```
#[derive(Default)]
pub struct PathRouter {
    inner: matchit::Router<Entry>,
}

impl PathRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named route.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        spec: RouteSpec,
    ) -> Result<(), RoutingError> {
        let name = name.into();
        self.inner
            .insert(pattern, Entry { name, spec })
            .map_err(|source| RoutingError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }
}

impl RouteMatcher for PathRouter {
    fn match_request(&self, request: &Request) -> Option<RouteMatch> {
        let matched = self.inner.at(request.path()).ok()?;

        let mut result = RouteMatch::new(matched.value.name.clone());
        for (name, value) in &matched.value.spec.defaults {
            result = result.with_param(name.clone(), value.clone());
        }
        for (name, value) in matched.params.iter() {
            result = result.with_param(name, value);
        }
        if let Some(controller) = &matched.value.spec.controller {
            result = result.with_controller(controller.clone());
        }
        if let Some(middleware) = &matched.value.spec.middleware {
            result = result.with_middleware(middleware.iter().cloned());
        }
        Some(result)
    }
}
