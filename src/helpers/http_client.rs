use std::time::Duration;
use log::{debug, error};
use serde_json::Value;
use thiserror::Error;

/// Error types that can occur when interacting with HTTP clients
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The server answered with a non-success status code
    #[error("HTTP {0} error: {1}")]
    Status(u16, String),

    #[error("HTTP request error: {0}")]
    RequestError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Empty response from server")]
    EmptyResponse,
}

impl HttpClientError {
    /// True for 4xx answers, which Last.fm uses for unknown users and methods
    pub fn is_client_error(&self) -> bool {
        matches!(self, HttpClientError::Status(code, _) if (400..500).contains(code))
    }
}

/// A trait for HTTP client implementations
/// This version avoids generic methods to enable dynamic dispatch
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Send a GET request and return text response
    fn get_text(&self, url: &str) -> Result<String, HttpClientError>;

    /// Send a GET request and parse the body as JSON
    fn get_json(&self, url: &str) -> Result<Value, HttpClientError> {
        let text = self.get_text(url)?;
        if text.trim().is_empty() {
            return Err(HttpClientError::EmptyResponse);
        }
        serde_json::from_str::<Value>(&text).map_err(|e| {
            debug!("Failed to parse JSON response: {}", e);
            HttpClientError::ParseError(e.to_string())
        })
    }

    /// Clone the client as a boxed trait object
    fn clone_box(&self) -> Box<dyn HttpClient>;
}

impl Clone for Box<dyn HttpClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An HTTP client implementation using ureq
#[derive(Clone, Debug)]
pub struct UreqHttpClient {
    timeout: Duration,
    user_agent: String,
}

impl Default for UreqHttpClient {
    fn default() -> Self {
        Self::new(10)
    }
}

impl UreqHttpClient {
    /// Create a new HTTP client with the specified timeout
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            user_agent: format!("lastfmbot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClient for UreqHttpClient {
    fn get_text(&self, url: &str) -> Result<String, HttpClientError> {
        debug!("GET text request to {}", url);

        let response = match ureq::get(url)
            .timeout(self.timeout)
            .set("User-Agent", &self.user_agent)
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, response)) => {
                let status_text = response.status_text().to_string();
                debug!("GET request to {} returned HTTP {}", url, code);
                return Err(HttpClientError::Status(code, status_text));
            }
            Err(e) => {
                error!("GET request failed: {}", e);
                return Err(HttpClientError::RequestError(e.to_string()));
            }
        };

        match response.into_string() {
            Ok(text) => Ok(text),
            Err(e) => {
                debug!("Failed to read response body: {}", e);
                Err(HttpClientError::ParseError(format!("Failed to read response body: {}", e)))
            }
        }
    }

    fn clone_box(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// Create a new HTTP client using the default implementation
pub fn new_http_client(timeout_secs: u64) -> Box<dyn HttpClient> {
    Box::new(UreqHttpClient::new(timeout_secs))
}

/// Canned-response client for handler tests
#[cfg(test)]
pub(crate) mod mock {
    use super::{HttpClient, HttpClientError};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum Canned {
        Body(String),
        Status(u16),
        Transport,
    }

    /// Answers requests whose URL starts with a registered prefix, records every URL
    #[derive(Debug, Clone, Default)]
    pub struct MockHttpClient {
        routes: Arc<Mutex<Vec<(String, Canned)>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, prefix: &str, body: &str) -> &Self {
            self.routes.lock().unwrap().push((prefix.to_string(), Canned::Body(body.to_string())));
            self
        }

        pub fn fail_status(&self, prefix: &str, code: u16) -> &Self {
            self.routes.lock().unwrap().push((prefix.to_string(), Canned::Status(code)));
            self
        }

        pub fn fail_transport(&self, prefix: &str) -> &Self {
            self.routes.lock().unwrap().push((prefix.to_string(), Canned::Transport));
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get_text(&self, url: &str) -> Result<String, HttpClientError> {
            self.requests.lock().unwrap().push(url.to_string());
            let routes = self.routes.lock().unwrap();
            let canned = routes
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix.as_str()))
                .map(|(_, canned)| canned.clone());
            match canned {
                Some(Canned::Body(body)) => Ok(body),
                Some(Canned::Status(code)) => Err(HttpClientError::Status(code, "Not Found".to_string())),
                Some(Canned::Transport) | None => {
                    Err(HttpClientError::RequestError(format!("no route for {}", url)))
                }
            }
        }

        fn clone_box(&self) -> Box<dyn HttpClient> {
            Box::new(self.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockHttpClient;
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(HttpClientError::Status(404, "Not Found".into()).is_client_error());
        assert!(HttpClientError::Status(400, "Bad Request".into()).is_client_error());
        assert!(!HttpClientError::Status(503, "Unavailable".into()).is_client_error());
        assert!(!HttpClientError::RequestError("dns".into()).is_client_error());
    }

    #[test]
    fn test_get_json_default_method() {
        let client = MockHttpClient::new();
        client.respond("http://json", r#"{"items": []}"#);
        client.respond("http://blank", "  ");
        client.respond("http://broken", "<html>");

        let value = client.get_json("http://json/search").unwrap();
        assert!(value["items"].as_array().unwrap().is_empty());
        assert!(matches!(client.get_json("http://blank"), Err(HttpClientError::EmptyResponse)));
        assert!(matches!(client.get_json("http://broken"), Err(HttpClientError::ParseError(_))));
    }
}
