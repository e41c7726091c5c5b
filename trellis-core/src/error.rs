//! Error types for Trellis.
//!
//! Stage failures are values, not unwound panics: a listener that cannot
//! complete its stage returns a [`StageError`] tagged with an [`ErrorKind`],
//! and the orchestrator routes it into the matching error channel. The
//! string form of each kind is stable and usable in logs and assertions.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The closed set of stage failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No route matched the request.
    RouterNoMatch,
    /// The matched controller name is not registered.
    ControllerNotFound,
    /// The matched name resolved to something that is not dispatchable.
    ControllerInvalid,
    /// A middleware entry could not be resolved into a pipe unit.
    MiddlewareCannotDispatch,
    /// A dispatch target or renderer failed while executing.
    Exception,
}

impl ErrorKind {
    /// Stable string constant for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RouterNoMatch => "error-router-no-match",
            ErrorKind::ControllerNotFound => "error-controller-not-found",
            ErrorKind::ControllerInvalid => "error-controller-invalid",
            ErrorKind::MiddlewareCannotDispatch => "error-middleware-cannot-dispatch",
            ErrorKind::Exception => "error-exception",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage failure: an [`ErrorKind`] tag, an optional original error, and
/// optional controller diagnostics for the error channel to consume.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct StageError {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
    controller: Option<String>,
}

impl StageError {
    /// Create a stage error of the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: None,
            controller: None,
        }
    }

    /// Routing failure: no route matched.
    pub fn router_no_match() -> Self {
        Self::new(ErrorKind::RouterNoMatch)
    }

    /// The named controller is not registered.
    pub fn controller_not_found(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::ControllerNotFound).with_controller(name)
    }

    /// The named controller is registered but not dispatchable.
    pub fn controller_invalid(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::ControllerInvalid).with_controller(name)
    }

    /// A middleware entry could not be turned into a pipe unit.
    pub fn middleware_cannot_dispatch(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::MiddlewareCannotDispatch).with_controller(name)
    }

    /// Execution failure with the original error attached.
    pub fn exception(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Exception).with_source(source)
    }

    /// Attach the original error.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the controller name the failure relates to.
    pub fn with_controller(mut self, name: impl Into<String>) -> Self {
        self.controller = Some(name.into());
        self
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The controller name, if one was involved.
    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    /// Decompose into kind, original error, and controller name.
    pub fn into_parts(self) -> (ErrorKind, Option<BoxError>, Option<String>) {
        (self.kind, self.source, self.controller)
    }
}

/// Raised when a middleware pipe runs to completion without any unit
/// producing a response. This is a pipeline misconfiguration; it surfaces
/// through the dispatch error channel as [`ErrorKind::Exception`].
#[derive(Debug, Error)]
#[error("middleware pipe exhausted without producing a response")]
pub struct ReachedFinalHandler;

/// Failure to resolve a named service from a [`Container`].
///
/// `NotFound` and `WrongType` are deliberately distinguishable: the dispatch
/// stage maps them to [`ErrorKind::ControllerNotFound`] and
/// [`ErrorKind::ControllerInvalid`] respectively.
///
/// [`Container`]: crate::Container
#[derive(Debug, Error)]
pub enum ContainerError {
    /// No service is registered under the name.
    #[error("no service registered under name `{name}`")]
    NotFound {
        /// The unresolved name.
        name: String,
    },
    /// A service exists but is not of the requested type.
    #[error("service `{name}` is not of the requested type")]
    WrongType {
        /// The offending name.
        name: String,
    },
    /// The service exists but could not be produced.
    #[error("service `{name}` could not be created")]
    Failed {
        /// The offending name.
        name: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

/// The single fatal path out of a request run.
///
/// Every stage failure is recoverable through the error channels except
/// one: a failure raised from within a RenderError listener itself.
#[derive(Debug, Error)]
pub enum FatalError {
    /// A RenderError listener failed while handling a render failure.
    #[error("render error listener failed")]
    RenderListener(#[source] StageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(ErrorKind::RouterNoMatch.as_str(), "error-router-no-match");
        assert_eq!(
            ErrorKind::ControllerNotFound.as_str(),
            "error-controller-not-found"
        );
        assert_eq!(
            ErrorKind::ControllerInvalid.as_str(),
            "error-controller-invalid"
        );
        assert_eq!(
            ErrorKind::MiddlewareCannotDispatch.as_str(),
            "error-middleware-cannot-dispatch"
        );
        assert_eq!(ErrorKind::Exception.as_str(), "error-exception");
    }

    #[test]
    fn stage_error_carries_parts() {
        let err = StageError::controller_not_found("ghost");
        assert_eq!(err.kind(), ErrorKind::ControllerNotFound);
        assert_eq!(err.controller(), Some("ghost"));

        let (kind, source, controller) = StageError::exception(ReachedFinalHandler).into_parts();
        assert_eq!(kind, ErrorKind::Exception);
        assert!(source.unwrap().downcast_ref::<ReachedFinalHandler>().is_some());
        assert!(controller.is_none());
    }
}
