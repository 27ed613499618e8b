//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request with query parameters and an `Authorization` header
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        authorization: &str,
    ) -> crate::Result<HttpResponse>;

    /// Send a POST request with form-encoded body
    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::SentinelError::Http(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        authorization: &str,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| crate::SentinelError::Http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::SentinelError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> crate::Result<HttpResponse> {
        // The Telegram URL embeds the bot token, so only the host is logged
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        tracing::debug!("POST {}", host);
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                crate::SentinelError::Http(format!("POST {} failed: {}", host, e.without_url()))
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::SentinelError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("POST {} -> {} ({} bytes)", host, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
