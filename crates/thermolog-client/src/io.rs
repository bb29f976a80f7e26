//! HTTP client abstraction for testability

use async_trait::async_trait;
use thermolog_protocol::RequestBody;

use crate::error::ClientError;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;

    /// Send a POST request with the given body
    async fn post(&self, url: &str, body: &RequestBody) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    async fn finish(
        method: &str,
        url: &str,
        response: reqwest::Response,
    ) -> crate::Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("GET {} failed: {}", url, e)))?;

        Self::finish("GET", url, response).await
    }

    async fn post(&self, url: &str, body: &RequestBody) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let request = self.client.post(url);
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Form(fields) => request.form(fields),
            RequestBody::Json(value) => request.json(value),
        };
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("POST {} failed: {}", url, e)))?;

        Self::finish("POST", url, response).await
    }
}
