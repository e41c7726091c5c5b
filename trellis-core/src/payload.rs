//! Stage output and the view model normalization adapter.

use crate::http::Response;
use std::collections::HashMap;

/// The payload a stage produces.
///
/// A `Response` is terminal: the orchestrator short-circuits the remaining
/// stages (the route stage jumps straight to Finish, the dispatch stage
/// skips Render). A `Model` flows on to the render stage.
#[derive(Debug, Clone)]
pub enum StageOutput {
    /// A finished response.
    Response(Response),
    /// An intermediate model destined for rendering.
    Model(ViewModel),
}

impl StageOutput {
    /// Whether this output is a finished response.
    pub fn is_response(&self) -> bool {
        matches!(self, StageOutput::Response(_))
    }

    /// Borrow the response, if this output is one.
    pub fn as_response(&self) -> Option<&Response> {
        match self {
            StageOutput::Response(resp) => Some(resp),
            StageOutput::Model(_) => None,
        }
    }

    /// Borrow the model, if this output is one.
    pub fn as_model(&self) -> Option<&ViewModel> {
        match self {
            StageOutput::Model(model) => Some(model),
            StageOutput::Response(_) => None,
        }
    }
}

impl From<Response> for StageOutput {
    fn from(resp: Response) -> Self {
        StageOutput::Response(resp)
    }
}

impl From<ViewModel> for StageOutput {
    fn from(model: ViewModel) -> Self {
        StageOutput::Model(model)
    }
}

/// The consistent shape renderers receive.
///
/// Dispatch targets may return bare key/value maps; the dispatch stage wraps
/// them into a `ViewModel` so downstream renderers always see one polymorphic
/// shape with named-variable access and ordered iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    template: Option<String>,
    variables: Vec<(String, String)>,
}

impl ViewModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template name, consuming and returning the model.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// The template name, if set.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Set a variable, replacing an existing one with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.variables.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.variables.push((name, value)),
        }
    }

    /// Set a variable, consuming and returning the model.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the model has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl From<HashMap<String, String>> for ViewModel {
    /// Wrap a bare map. Keys are sorted so the resulting model is
    /// deterministic regardless of map iteration order.
    fn from(map: HashMap<String, String>) -> Self {
        let mut variables: Vec<(String, String)> = map.into_iter().collect();
        variables.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self {
            template: None,
            variables,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ViewModel {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut model = Self::new();
        for (k, v) in iter {
            model.set(k, v);
        }
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut model = ViewModel::new().with("a", "1").with("b", "2");
        model.set("a", "3");
        assert_eq!(model.get("a"), Some("3"));
        assert_eq!(model.len(), 2);
        let order: Vec<&str> = model.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn bare_map_wraps_deterministically() {
        let mut map = HashMap::new();
        map.insert("zeta".to_string(), "1".to_string());
        map.insert("alpha".to_string(), "2".to_string());

        let model = ViewModel::from(map);
        let names: Vec<&str> = model.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn output_accessors() {
        let out = StageOutput::from(Response::new().with_status(404));
        assert!(out.is_response());
        assert_eq!(out.as_response().unwrap().status(), 404);
        assert!(out.as_model().is_none());
    }
}
