//! Query string parsing
//!
//! Turns the raw query component of a request URI into a lookup table of
//! decoded parameters. Handlers read their parameter structs from it instead
//! of touching the request directly.

use std::collections::HashMap;

/// Decoded query parameters
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// Keys without `=` are kept with an empty value so that flags like
    /// `?getTime` are visible. When a key repeats, the last value wins.
    pub fn parse(query: Option<&str>) -> Self {
        let values: HashMap<String, String> = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of `key`, or an empty string when absent
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
