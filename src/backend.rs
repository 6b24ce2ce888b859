//! Finance backend client
//!
//! One GET per call against `{API_URL}/{endpoint}`. No retries: every
//! failure goes back to the calling action as a typed error.

use crate::config::ActionServerConfig;
use crate::context::Period;
use crate::error::ActionServerError;
use crate::models::Endpoint;
use crate::Result;
use reqwest::{Client, Request};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Seam between actions and the finance backend
#[async_trait::async_trait]
pub trait FinanceApi: Send + Sync {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        user_id: &str,
        period: &Period,
        token: &str,
    ) -> Result<Value>;
}

/// HTTP-backed finance API client (connection-pooled)
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ActionServerConfig) -> Result<Self> {
        Self::new(&config.api_url, config.backend_timeout)
    }

    /// Build the GET request. The Authorization header is only set for a non-empty token.
    pub fn build_request(
        &self,
        endpoint: Endpoint,
        user_id: &str,
        period: &Period,
        token: &str,
    ) -> Result<Request> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        let period = period.to_string();

        let mut builder = self
            .client
            .get(url)
            .query(&[("userId", user_id), ("period", period.as_str())]);

        if !token.is_empty() {
            builder = builder.bearer_auth(token);
        }

        Ok(builder.build()?)
    }
}

#[async_trait::async_trait]
impl FinanceApi for BackendClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        user_id: &str,
        period: &Period,
        token: &str,
    ) -> Result<Value> {
        let request = self.build_request(endpoint, user_id, period, token)?;

        debug!(
            url = %request.url(),
            authorized = !token.is_empty(),
            "Requesting finance backend"
        );

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), body = %body, "Finance backend response");

        if !status.is_success() {
            return Err(ActionServerError::BackendStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ActionServerError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}
