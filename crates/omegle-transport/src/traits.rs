//! Transport trait and request/response types
//!
//! Defines the generic Transport trait that the session drives, along with
//! the minimal request and response shapes it exchanges.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Content type of every POST body the service accepts.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP request specification
///
/// Represents an HTTP request to be sent via the Transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,

    /// Request URL
    pub url: String,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Request body (optional)
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Add a header to the request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add every header from an iterator of pairs
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.headers.insert(key.into(), value.into());
        }
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a percent-encoded form body and its content type
    pub fn with_form_body<'a, I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.with_header("content-type", FORM_CONTENT_TYPE)
            .with_body(encoded.into_bytes())
    }

    /// Request body as text, if any
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

/// HTTP response
///
/// Represents an HTTP response received from the server.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a response with a text body and no headers
    pub fn text_body(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, HashMap::new(), body.into().into_bytes())
    }

    /// Check if the status is exactly 200, the only status the service uses for success
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Get the response body as a string, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }
}

/// Generic transport trait for different transport mechanisms
///
/// Implementations must not retry: a failed request is reported once and the
/// caller decides what it means.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTTP request and receive a response
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_is_percent_encoded() {
        let request = HttpRequest::post("http://omegle.com/send")
            .with_form_body([("id", "central2:abc"), ("msg", "hi there & bye")]);

        assert_eq!(
            request.body_text().as_deref(),
            Some("id=central2%3Aabc&msg=hi+there+%26+bye")
        );
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some(FORM_CONTENT_TYPE)
        );
    }

    #[test]
    fn test_response_is_ok_only_for_200() {
        assert!(HttpResponse::text_body(200, "win").is_ok());
        assert!(!HttpResponse::text_body(204, "").is_ok());
        assert!(!HttpResponse::text_body(503, "down").is_ok());
    }

    #[test]
    fn test_get_header_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let response = HttpResponse::new(200, headers, Vec::new());

        assert_eq!(response.get_header("content-type"), Some("text/plain"));
        assert_eq!(response.get_header("x-missing"), None);
    }
}
