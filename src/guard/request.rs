use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The navigation request a guarded view is asked to render for.
///
/// Everything the router matched travels here explicitly and is handed to the
/// view untouched when access is granted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteRequest {
    pub path: String,
    /// The route template matched the path literally, with no captured parameters.
    pub exact: bool,
    pub matched_props: BTreeMap<String, String>,
}

impl RouteRequest {
    pub fn new(path: impl Into<String>) -> Self {
        RouteRequest {
            path: path.into(),
            exact: false,
            matched_props: BTreeMap::new(),
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.matched_props.insert(key.into(), value.into());
        self
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.matched_props.get(key).map(String::as_str)
    }
}
