//! Route matching collaborator types.

use crate::http::Request;
use crate::middleware::Middleware;
use std::collections::HashMap;
use std::sync::Arc;

/// The outcome of a successful route match.
///
/// Carries the matched route name, the matched parameters (merged into the
/// request attributes by the route stage), and the dispatch target: a named
/// controller, a middleware pipe, or both (the pipe wins).
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route_name: String,
    params: HashMap<String, String>,
    controller: Option<String>,
    middleware: Option<Vec<MiddlewareSpec>>,
}

impl RouteMatch {
    /// Create a match for the named route.
    pub fn new(route_name: impl Into<String>) -> Self {
        Self {
            route_name: route_name.into(),
            params: HashMap::new(),
            controller: None,
            middleware: None,
        }
    }

    /// The matched route name.
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    /// The matched parameters.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Look up one matched parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Add a matched parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// The controller identifier, if the route names one.
    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    /// Set the controller identifier.
    pub fn with_controller(mut self, name: impl Into<String>) -> Self {
        self.controller = Some(name.into());
        self
    }

    /// The middleware pipe specification, if the route carries one.
    pub fn middleware(&self) -> Option<&[MiddlewareSpec]> {
        self.middleware.as_deref()
    }

    /// Set the middleware pipe specification. An empty list is a valid
    /// (immediately exhausting) pipe.
    pub fn with_middleware<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = MiddlewareSpec>,
    {
        self.middleware = Some(specs.into_iter().collect());
        self
    }
}

/// One entry of a route's middleware specification.
///
/// Names are resolved through the container at dispatch time; instances are
/// used as-is.
#[derive(Clone)]
pub enum MiddlewareSpec {
    /// A container name to resolve.
    Name(String),
    /// A ready middleware unit.
    Instance(Arc<dyn Middleware>),
}

impl std::fmt::Debug for MiddlewareSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareSpec::Name(name) => f.debug_tuple("Name").field(name).finish(),
            MiddlewareSpec::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

impl From<&str> for MiddlewareSpec {
    fn from(name: &str) -> Self {
        MiddlewareSpec::Name(name.to_string())
    }
}

impl From<String> for MiddlewareSpec {
    fn from(name: String) -> Self {
        MiddlewareSpec::Name(name)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareSpec {
    fn from(unit: Arc<dyn Middleware>) -> Self {
        MiddlewareSpec::Instance(unit)
    }
}

/// The route-matching collaborator consumed by the route stage.
pub trait RouteMatcher: Send + Sync {
    /// Match a request, returning `None` when no route applies.
    fn match_request(&self, request: &Request) -> Option<RouteMatch>;
}
