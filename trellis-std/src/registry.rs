//! Typed service registry.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use trellis_core::{Container, ContainerError, Dispatchable, Middleware};

enum Service {
    Controller(Arc<dyn Dispatchable>),
    Middleware(Arc<dyn Middleware>),
    Value(Arc<dyn Any + Send + Sync>),
}

/// A name-keyed registry of controllers, middleware, and plain values.
///
/// Registration is typed: each entry is stored under its role, and lookups
/// asking for the wrong role fail with [`ContainerError::WrongType`] rather
/// than at some arbitrary later point. Registering the same name again
/// replaces the previous entry.
///
/// # Example
/// ```ignore
/// let mut registry = ServiceRegistry::new();
/// registry.register_controller("home", HomeController);
/// registry.register_middleware("auth", AuthMiddleware::new(keys));
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Service>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller.
    pub fn register_controller<C>(&mut self, name: impl Into<String>, controller: C)
    where
        C: Dispatchable + 'static,
    {
        self.register_controller_shared(name, Arc::new(controller));
    }

    /// Register an already shared controller.
    pub fn register_controller_shared(
        &mut self,
        name: impl Into<String>,
        controller: Arc<dyn Dispatchable>,
    ) {
        self.services
            .insert(name.into(), Service::Controller(controller));
    }

    /// Register a middleware unit.
    pub fn register_middleware<M>(&mut self, name: impl Into<String>, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.register_middleware_shared(name, Arc::new(middleware));
    }

    /// Register an already shared middleware unit.
    pub fn register_middleware_shared(
        &mut self,
        name: impl Into<String>,
        middleware: Arc<dyn Middleware>,
    ) {
        self.services
            .insert(name.into(), Service::Middleware(middleware));
    }

    /// Register an arbitrary shared value, retrievable via
    /// [`value`](Self::value).
    pub fn register_value<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) {
        self.services
            .insert(name.into(), Service::Value(Arc::new(value)));
    }

    /// Retrieve a plain value by name and type.
    pub fn value<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        match self.services.get(name) {
            Some(Service::Value(value)) => {
                value
                    .clone()
                    .downcast::<T>()
                    .map_err(|_| ContainerError::WrongType {
                        name: name.to_string(),
                    })
            }
            Some(_) => Err(ContainerError::WrongType {
                name: name.to_string(),
            }),
            None => Err(ContainerError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Container for ServiceRegistry {
    fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    fn controller(&self, name: &str) -> Result<Arc<dyn Dispatchable>, ContainerError> {
        match self.services.get(name) {
            Some(Service::Controller(controller)) => Ok(controller.clone()),
            Some(_) => Err(ContainerError::WrongType {
                name: name.to_string(),
            }),
            None => Err(ContainerError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn middleware(&self, name: &str) -> Result<Arc<dyn Middleware>, ContainerError> {
        match self.services.get(name) {
            Some(Service::Middleware(middleware)) => Ok(middleware.clone()),
            Some(_) => Err(ContainerError::WrongType {
                name: name.to_string(),
            }),
            None => Err(ContainerError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoController;

    #[test]
    fn lookup_distinguishes_missing_from_wrong_type() {
        let mut registry = ServiceRegistry::new();
        registry.register_controller("home", EchoController::new("hi"));
        registry.register_value("limit", 10usize);

        assert!(registry.has("home"));
        assert!(registry.controller("home").is_ok());

        assert!(matches!(
            registry.controller("ghost"),
            Err(ContainerError::NotFound { .. })
        ));
        assert!(matches!(
            registry.controller("limit"),
            Err(ContainerError::WrongType { .. })
        ));
        assert!(matches!(
            registry.middleware("home"),
            Err(ContainerError::WrongType { .. })
        ));
    }

    #[test]
    fn values_are_typed() {
        let mut registry = ServiceRegistry::new();
        registry.register_value("limit", 10usize);

        assert_eq!(*registry.value::<usize>("limit").unwrap(), 10);
        assert!(matches!(
            registry.value::<String>("limit"),
            Err(ContainerError::WrongType { .. })
        ));
    }

    #[test]
    fn re_registration_replaces() {
        let mut registry = ServiceRegistry::new();
        registry.register_value("limit", 10usize);
        registry.register_value("limit", 20usize);

        assert_eq!(registry.len(), 1);
        assert_eq!(*registry.value::<usize>("limit").unwrap(), 20);
    }
}
