//! Native request and response representation.
//!
//! Trellis uses a single request/response pair throughout the pipeline.
//! Middleware, controllers, and renderers all speak the same types, so a
//! middleware response carries its status, headers, and body into the
//! context without any conversion step.

use std::collections::HashMap;

/// An in-flight request.
///
/// Besides method, path, headers, and body, a request carries an attribute
/// map. Routing merges matched parameters into the attributes, and
/// middleware can use them to pass values down the pipe.
///
/// Attribute merging is value-producing: [`Request::with_attributes`]
/// returns a new request rather than mutating in place, so a stage that
/// enriches the request replaces it in the context wholesale.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: String,
    attributes: HashMap<String, String>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new("GET", "/")
    }
}

impl Request {
    /// Create a request with the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: String::new(),
            attributes: HashMap::new(),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// The request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Set the body, consuming and returning the request.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Set a header, consuming and returning the request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Set a single attribute in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Merge attributes, producing a new request value.
    ///
    /// Existing attributes with the same name are overwritten.
    pub fn with_attributes<I, K, V>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in attrs {
            self.attributes.insert(k.into(), v.into());
        }
        self
    }
}

/// The response under construction.
///
/// Any stage may replace the context's response wholesale; a `Response`
/// returned by a listener is the terminal signal that short-circuits the
/// remaining stages.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Create an empty 200 response.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the status code in place.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Set the status code, consuming and returning the response.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// The response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Set the body in place.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Set the body, consuming and returning the response.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Set a header in place.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Set a header, consuming and returning the response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
