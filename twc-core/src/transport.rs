use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::model::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response (connect, timeout, body read, ...).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends one HTTP request. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Put => reqwest::Method::PUT,
        };

        let res = self
            .http
            .request(method, &request.url)
            .send()
            .await
            .map_err(|e| TransportError(format!("Failed to send request to TWC API: {e}")))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read TWC API response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    #[tokio::test]
    async fn sends_method_and_query_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/data/loc/12345"))
            .and(query_param("doctype", "json"))
            .and(query_param("country", "UK"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new();
        let res = transport
            .send(&HttpRequest {
                method: HttpMethod::Delete,
                url: format!("{}/data/loc/12345?doctype=json&country=UK", server.uri()),
            })
            .await
            .expect("response");

        assert!(res.is_success());
        assert_eq!(res.body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn error_status_is_a_response_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let res = ReqwestTransport::new()
            .send(&HttpRequest { method: HttpMethod::Get, url: format!("{}/x", server.uri()) })
            .await
            .expect("response");

        assert_eq!(res.status, 404);
        assert!(!res.is_success());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let res = ReqwestTransport::new()
            .send(&HttpRequest { method: HttpMethod::Get, url: "http://127.0.0.1:1/".into() })
            .await;

        assert!(res.is_err());
    }
}
