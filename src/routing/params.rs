//! Path parameters captured by a matched route.

use std::collections::HashMap;

/// Capture name → raw path segment, scoped to a single request.
///
/// Values are taken verbatim from the request path; no percent-decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    /// Value bound to `name`, if the matched pattern captured it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}
