//! HTTP client for the shardlite API.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::Result;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How long an idle keep-alive connection is kept in the pool.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client issuing insert and get requests against one server.
///
/// Requests return the response status only. The body is drained so the
/// connection goes back to the pool.
#[derive(Debug, Clone)]
pub struct LoadClient {
    client: reqwest::Client,
    base_url: String,
}

impl LoadClient {
    /// Create a client whose idle pool holds up to `concurrency` connections.
    pub fn new(base_url: impl Into<String>, concurrency: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(concurrency)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /insert?id=&username=&payload=`
    pub async fn insert(&self, id: i64, username: &str, payload: &str) -> Result<StatusCode> {
        let response = self
            .client
            .get(self.url("/insert"))
            .query(&[
                ("id", id.to_string().as_str()),
                ("username", username),
                ("payload", payload),
            ])
            .send()
            .await?;
        Self::drain(response).await
    }

    /// `GET /get?id=`
    pub async fn get(&self, id: i64) -> Result<StatusCode> {
        let response = self
            .client
            .get(self.url("/get"))
            .query(&[("id", id)])
            .send()
            .await?;
        Self::drain(response).await
    }

    async fn drain(response: reqwest::Response) -> Result<StatusCode> {
        let status = response.status();
        response.bytes().await?;
        Ok(status)
    }
}
