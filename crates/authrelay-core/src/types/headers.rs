//! Case-insensitive request header set.

use crate::error::InvalidInputError;

/// An ordered set of request headers with case-insensitive names.
///
/// Names keep the spelling they were first inserted with; lookups and
/// replacements ignore ASCII case, as HTTP requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Create an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.0[idx].1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.0[idx].1.as_str())
    }

    /// Check whether a header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Overlay `overrides` on top of this set; their values win.
    pub fn merge(mut self, overrides: &Headers) -> Self {
        for (name, value) in overrides.iter() {
            self.insert(name, value);
        }
        self
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every name is an HTTP token and no value carries control
    /// characters, so nothing malformed reaches the wire.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Header`] for the first offending header.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        for (name, value) in self.iter() {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(InvalidInputError::Header {
                    name: name.to_string(),
                    reason: "name must be a non-empty HTTP token".to_string(),
                });
            }
            if value.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7f) {
                return Err(InvalidInputError::Header {
                    name: name.to_string(),
                    reason: "value contains control characters".to_string(),
                });
            }
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
