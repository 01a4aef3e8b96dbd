//! External request representation.
//!
//! A [`Parameters`] value is an ordered mapping from field names to string
//! values, as a camera client hands them over. Integer fields are stored as
//! decimal strings and read with [`Parameters::get_int`].

use serde::Serialize;
use std::fmt;

/// Ordered string key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the flattened `key=value;key=value` form.
    ///
    /// Empty segments are ignored; a segment without `=` is kept as a key with
    /// an empty value.
    pub fn unflatten(flattened: &str) -> Self {
        let mut params = Parameters::new();
        for segment in flattened.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.split_once('=') {
                Some((key, value)) => params.set(key.trim(), value.trim()),
                None => params.set(segment, ""),
            }
        }
        params
    }

    /// Flatten into `key=value;key=value`.
    pub fn flatten(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Set `key`, replacing any previous value while keeping its position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set(key, value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Integer value of `key`, or `None` when absent or not an integer.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(|value| value.trim().parse().ok())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// Overlay every entry of `other` on top of `self`.
    pub fn merge(&mut self, other: &Parameters) {
        for (key, value) in &other.entries {
            self.set(key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.set(key.as_ref(), value);
        }
        params
    }
}
