//! Client for the homework review API.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use review_watch_core::{HomeworkApi, PollCursor, ENDPOINT};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::check_response;
use crate::{build_http_client, ClientError};

/// Fetches homework statuses with an OAuth token.
#[derive(Debug, Clone)]
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Creates a client for the production endpoint.
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_endpoint(ENDPOINT, token)
    }

    /// Creates a client for a custom endpoint URL.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client()?,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Returns the endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests every status change since `cursor`.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn homework_statuses(&self, cursor: PollCursor) -> Result<Value, ClientError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", cursor.value())])
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let resp = check_response(resp).await?;
        let body = resp
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        debug!("Homework statuses received");
        Ok(body)
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, cursor: PollCursor) -> review_watch_core::Result<Value> {
        self.homework_statuses(cursor)
            .await
            .map_err(ClientError::into_fetch_error)
    }
}
