//! Dovetail REST API client
//!
//! Every request is a bearer-authenticated `GET` whose JSON body is returned
//! untouched. Requests run under the configured retry policy: transport
//! failures and 500/502/503/504 responses are retried, everything else is
//! returned to the caller as is.

use std::fmt;
use std::time::Duration;

use dovetail_core::retry::{execute, HttpStatusPredicate, TracingObserver};
use dovetail_core::{DovetailConfig, RetryPolicy};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{ApiError, Result};
use crate::params::{DataListParams, InsightListParams, ProjectListParams};

/// Client for the Dovetail REST API
#[derive(Clone)]
pub struct DovetailClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    retry: RetryPolicy,
}

impl fmt::Debug for DovetailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DovetailClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl DovetailClient {
    /// Create a client from validated configuration
    pub fn new(config: &DovetailConfig) -> Result<Self> {
        let token = config
            .token()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::invalid_parameter("api.token", "an API token is required"))?
            .to_string();

        let base_url = Url::parse(&config.api.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::invalid_parameter(
                "api.base-url",
                format!("'{}' cannot be used as a base URL", base_url),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent(config.api.user_agent.as_str())
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url,
            token,
            retry: config.retry.clone(),
        })
    }

    /// The API base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /insights/{insight_id}`
    pub async fn get_insight(&self, insight_id: &str) -> Result<Value> {
        require_id("insight_id", insight_id)?;
        self.get_json(&["insights", insight_id], None).await
    }

    /// `GET /insights`
    pub async fn list_insights(&self, params: &InsightListParams) -> Result<Value> {
        let query = params.to_query()?;
        self.get_json(&["insights"], query).await
    }

    /// `GET /insights/user/{user_id}`
    pub async fn list_user_insights(
        &self,
        user_id: &str,
        params: &InsightListParams,
    ) -> Result<Value> {
        require_id("user_id", user_id)?;
        let query = params.to_query()?;
        self.get_json(&["insights", "user", user_id], query).await
    }

    /// `GET /data/{data_id}`
    pub async fn get_data(&self, data_id: &str) -> Result<Value> {
        require_id("data_id", data_id)?;
        self.get_json(&["data", data_id], None).await
    }

    /// `GET /data/{data_id}/export/markdown`
    pub async fn get_data_content(&self, data_id: &str) -> Result<Value> {
        require_id("data_id", data_id)?;
        self.get_json(&["data", data_id, "export", "markdown"], None)
            .await
    }

    /// `GET /data`
    pub async fn list_data(&self, params: &DataListParams) -> Result<Value> {
        let query = params.to_query()?;
        self.get_json(&["data"], query).await
    }

    /// `GET /projects`
    pub async fn list_projects(&self, params: &ProjectListParams) -> Result<Value> {
        let query = params.to_query()?;
        self.get_json(&["projects"], query).await
    }

    /// Build the request URL for `segments` below the base URL
    ///
    /// Each segment is percent-encoded as a single path segment.
    pub fn endpoint_url(&self, segments: &[&str], query: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::invalid_parameter("api.base-url", "cannot be used as a base URL")
            })?
            .pop_if_empty()
            .extend(segments);
        url.set_query(query);
        Ok(url)
    }

    /// Retried `GET` of `segments` with an optional query string
    async fn get_json(&self, segments: &[&str], query: Option<String>) -> Result<Value> {
        let url = self.endpoint_url(segments, query.as_deref())?;
        let endpoint = match &query {
            Some(q) => format!("/{}?{}", segments.join("/"), q),
            None => format!("/{}", segments.join("/")),
        };

        let config = self
            .retry
            .to_config::<ApiError>()
            .with_predicate(HttpStatusPredicate::server_errors())
            .with_observer(TracingObserver::new(format!("Dovetail API {}", endpoint)));

        execute(|| self.send(&url, &endpoint), &config).await
    }

    async fn send(&self, url: &Url, endpoint: &str) -> Result<Value> {
        debug!(endpoint, "Sending Dovetail API request");

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::status(status, endpoint));
        }

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }
}

fn require_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_parameter(field, "must not be empty"));
    }
    Ok(())
}
