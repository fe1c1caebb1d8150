//! Remote pipeline API client
//!
//! Four POST stages against one queue's endpoint set:
//! submit (multipart) → parse-trigger → synchronize → reconcile.
//!
//! One client is built per job. Its cookie store and keep-alive pool form
//! the logical work session shared by all four stages; it is dropped with
//! the job and never reused.

use crate::config::EndpointSet;
use crate::error::StageError;
use crate::models::{DetectedCounts, SyncState};
use crate::services::response_parser;
use recon_common::config::HttpSettings;
use reqwest::multipart::{Form, Part};

/// Multipart part name carrying the file
const FILE_PART: &str = "edt";
/// Multipart text field carrying the subscription id
const SUBSCRIPTION_FIELD: &str = "subscription_public_id";

/// Per-job pipeline session
pub struct PipelineClient {
    http_client: reqwest::Client,
    endpoints: EndpointSet,
}

impl PipelineClient {
    pub fn new(endpoints: EndpointSet, settings: &HttpSettings) -> Result<Self, StageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| StageError::ClientSetup(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    /// Stage 1: upload the file for a subscription
    pub async fn submit(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        subscription_id: &str,
    ) -> Result<(), StageError> {
        let size = bytes.len();
        let form = Form::new()
            .text(SUBSCRIPTION_FIELD, subscription_id.to_string())
            .part(FILE_PART, Part::bytes(bytes).file_name(filename.to_string()));

        tracing::debug!(
            url = %self.endpoints.submit_url,
            filename = %filename,
            subscription_id = %subscription_id,
            bytes = size,
            "Submitting file"
        );

        let response = self
            .http_client
            .post(&self.endpoints.submit_url)
            .multipart(form)
            .send()
            .await
            .map_err(StageError::from_transport)?;

        Self::read_success_body(response).await.map(|_| ())
    }

    /// Stage 2: trigger server-side parsing and read the detected counts
    pub async fn trigger_parse(&self) -> Result<DetectedCounts, StageError> {
        let body = self.post_empty(&self.endpoints.parse_url).await?;
        Ok(response_parser::parse_detected_counts(&body))
    }

    /// Stage 3: one synchronize call
    pub async fn synchronize(&self) -> Result<SyncState, StageError> {
        let body = self.post_empty(&self.endpoints.sync_url).await?;
        response_parser::parse_sync_state(&body)
    }

    /// Stage 4: one reconcile call, returning the reconciled-id count
    pub async fn reconcile(&self) -> Result<u64, StageError> {
        tracing::debug!(url = %self.endpoints.reconcile_url, "POST");

        let response = self
            .http_client
            .post(&self.endpoints.reconcile_url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(StageError::from_transport)?;

        let body = Self::read_success_body(response).await?;
        response_parser::parse_reconciled_count(&body)
    }

    async fn post_empty(&self, url: &str) -> Result<String, StageError> {
        tracing::debug!(url = %url, "POST");

        let response = self
            .http_client
            .post(url)
            .send()
            .await
            .map_err(StageError::from_transport)?;

        Self::read_success_body(response).await
    }

    async fn read_success_body(response: reqwest::Response) -> Result<String, StageError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StageError::Api(status.as_u16(), error_text));
        }

        response.text().await.map_err(StageError::from_transport)
    }
}
