//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::InvalidInputError;

/// A validated API base URL.
///
/// The URL is absolute, uses HTTPS (or HTTP for localhost), and is
/// normalized without a trailing slash so endpoints can be appended.
///
/// # Example
///
/// ```
/// use authrelay_core::BaseUrl;
///
/// let base = BaseUrl::new("https://api.example.com/v1/").unwrap();
/// assert_eq!(base.endpoint_url("/items"), "https://api.example.com/v1/items");
/// assert_eq!(base.endpoint_url("items"), "https://api.example.com/v1/items");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidInputError> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let mut normalized = url;
        let trimmed = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);
        normalized.set_query(None);
        normalized.set_fragment(None);

        Ok(Self(normalized))
    }

    /// Returns the full URL for an endpoint path.
    ///
    /// Absolute `http(s)://` endpoints are returned unchanged.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        // The URL crate keeps a trailing slash on root paths.
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, endpoint.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), InvalidInputError> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            });
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            });
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseUrl {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let base = BaseUrl::new("https://api.example.com").unwrap();
        assert_eq!(base.host(), Some("api.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let base = BaseUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(base.endpoint_url("/items"), "http://127.0.0.1:8080/items");
    }

    #[test]
    fn keeps_path_prefix() {
        let base = BaseUrl::new("https://api.example.com/v1/").unwrap();
        assert_eq!(
            base.endpoint_url("/items/7"),
            "https://api.example.com/v1/items/7"
        );
    }

    #[test]
    fn absolute_endpoints_pass_through() {
        let base = BaseUrl::new("https://api.example.com").unwrap();
        assert_eq!(
            base.endpoint_url("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(BaseUrl::new("http://api.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(BaseUrl::new("/items").is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        let ok: Result<BaseUrl, _> = serde_json::from_str("\"https://api.example.com\"");
        assert!(ok.is_ok());
        let bad: Result<BaseUrl, _> = serde_json::from_str("\"ftp://api.example.com\"");
        assert!(bad.is_err());
    }
}
