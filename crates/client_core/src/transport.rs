//! Outbound exchange with the workflow endpoint.

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::SubmissionPayload;
use tracing::debug;
use url::Url;

use crate::{
    config::SubmissionSettings,
    error::{SettingsError, TransportError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one POST of a submission. Dropping the returned future must abort the request.
#[async_trait]
pub trait WorkflowTransport: Send + Sync + 'static {
    async fn post_submission(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportReply, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpWorkflowTransport {
    http: Client,
    endpoint: Url,
}

impl HttpWorkflowTransport {
    pub fn from_settings(settings: &SubmissionSettings) -> Result<Self, SettingsError> {
        let endpoint = settings.endpoint()?;
        let http = Client::builder()
            .build()
            .map_err(SettingsError::HttpClient)?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl WorkflowTransport for HttpWorkflowTransport {
    async fn post_submission(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportReply, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(
            endpoint = %self.endpoint,
            status,
            body_len = body.len(),
            "workflow endpoint responded"
        );
        Ok(TransportReply::new(status, body.to_vec()))
    }
}
