//! Request and response envelopes.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Header map carried by both envelopes. Keys are case-sensitive.
pub type Headers = BTreeMap<String, String>;

/// Well-known status codes.
pub mod status {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Request method.
///
/// Only the exact lowercase wire names are recognised (`"get"`, not
/// `"GET"`). Anything missing or unrecognised becomes [`Method::Unknown`], which no route ever matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    #[default]
    Unknown,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Unknown => "unknown",
        }
    }
}

impl From<&str> for Method {
    fn from(raw: &str) -> Self {
        match raw {
            "get" => Method::Get,
            "post" => Method::Post,
            "put" => Method::Put,
            "delete" => Method::Delete,
            _ => Method::Unknown,
        }
    }
}

impl From<String> for Method {
    fn from(raw: String) -> Self {
        Method::from(raw.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Method::from(s))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fall back to the default when an optional field has the wrong type,
/// so one bad field does not discard the rest of the envelope.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// An inbound request envelope.
///
/// `method` and `path` must have the right type when present. `headers`
/// and `body` fall back to empty on their own if absent, `null`, or
/// mistyped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    #[serde(deserialize_with = "null_as_default")]
    pub method: Method,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "lenient")]
    pub headers: Headers,
    #[serde(deserialize_with = "lenient")]
    pub body: String,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header by its exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// An outbound response envelope.
///
/// Starts life as a 500 with no headers or body, so a handler that forgets
/// to set a status still produces a deterministic server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub status: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: Headers,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: status::INTERNAL_SERVER_ERROR,
            headers: Headers::new(),
            body: String::new(),
        }
    }
}

impl Response {
    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_requires_exact_lowercase() {
        assert_eq!(Method::from("get"), Method::Get);
        assert_eq!(Method::from("post"), Method::Post);
        assert_eq!(Method::from("delete"), Method::Delete);
        assert_eq!(Method::from("GET"), Method::Unknown);
        assert_eq!(Method::from("Delete"), Method::Unknown);
        assert_eq!(Method::from("patch"), Method::Unknown);
        assert_eq!(Method::from(""), Method::Unknown);
    }

    #[test]
    fn default_response_is_server_error() {
        let res = Response::default();
        assert_eq!(res.status, 500);
        assert!(res.headers.is_empty());
        assert!(res.body.is_empty());
        assert!(!res.is_success());
    }

    #[test]
    fn response_setters_chain() {
        let mut res = Response::default();
        res.set_status(status::OK)
            .set_header("content-type", "text/plain")
            .set_body("ok");
        assert!(res.is_success());
        assert_eq!(res.headers["content-type"], "text/plain");
        assert_eq!(res.body, "ok");
    }

    #[test]
    fn request_builder() {
        let req = Request::new(Method::Post, "/items")
            .with_header("X-Trace", "abc")
            .with_body("{}");
        assert_eq!(req.header("X-Trace"), Some("abc"));
        assert_eq!(req.header("x-trace"), None);
        assert_eq!(req.body, "{}");
    }
}
