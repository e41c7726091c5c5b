//! Stage identifiers for the request lifecycle.

/// A stage of the request lifecycle.
///
/// Topics form a closed set: listeners subscribe to exactly one of these,
/// and the orchestrator walks them in a fixed order. `DispatchError` and
/// `RenderError` are side channels entered only when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// One-time application startup, fired at most once before the first
    /// request is served.
    Bootstrap,
    /// Match the request against the route table.
    Route,
    /// Resolve and invoke the dispatch target (controller or middleware pipe).
    Dispatch,
    /// Produce the response body from the dispatch result.
    Render,
    /// Side effects after the response is final (logging, emission).
    /// Always fires exactly once per request.
    Finish,
    /// Error channel for routing and dispatch failures.
    DispatchError,
    /// Error channel for rendering failures.
    RenderError,
}

impl Topic {
    /// Stable lowercase name of the topic, usable as a log field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Topic::Bootstrap => "bootstrap",
            Topic::Route => "route",
            Topic::Dispatch => "dispatch",
            Topic::Render => "render",
            Topic::Finish => "finish",
            Topic::DispatchError => "dispatch.error",
            Topic::RenderError => "render.error",
        }
    }

    /// Whether this topic is one of the error side channels.
    pub const fn is_error_channel(&self) -> bool {
        matches!(self, Topic::DispatchError | Topic::RenderError)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_names() {
        assert_eq!(Topic::Route.as_str(), "route");
        assert_eq!(Topic::DispatchError.as_str(), "dispatch.error");
        assert_eq!(Topic::RenderError.as_str(), "render.error");
        assert_eq!(Topic::Finish.to_string(), "finish");
    }

    #[test]
    fn error_channels() {
        assert!(Topic::DispatchError.is_error_channel());
        assert!(Topic::RenderError.is_error_channel());
        assert!(!Topic::Route.is_error_channel());
    }
}
