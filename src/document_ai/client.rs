//! Google Cloud Document AI REST client.
//!
//! Sends raw documents to `{endpoint}/v1/{processor}:process` and decodes the
//! returned `document` into a [`RemoteDocument`].

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::credentials::CredentialsProvider;
use super::document::RemoteDocument;
use super::provider::{DocumentService, ProcessRequest, ProcessingError};

/// Regional endpoint serving processors in `location`.
pub fn regional_endpoint(location: &str) -> String {
    format!("https://{location}-documentai.googleapis.com")
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    document: RemoteDocument,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Document service backed by the Document AI v1 REST API.
pub struct DocumentAiClient {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Arc<dyn CredentialsProvider>,
}

impl std::fmt::Debug for DocumentAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials.provider_name())
            .finish()
    }
}

impl DocumentAiClient {
    /// Create a client for `endpoint` authenticating with `credentials`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL, usually [`regional_endpoint`]
    /// * `credentials` - Token source for every request
    /// * `timeout` - Optional whole-request timeout
    pub fn new(
        endpoint: &str,
        credentials: Arc<dyn CredentialsProvider>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProcessingError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ProcessingError::Configuration(format!("Invalid endpoint {endpoint}: {e}"))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProcessingError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn process_url(&self, processor_name: &str) -> String {
        format!(
            "{}/v1/{}:process",
            self.endpoint.as_str().trim_end_matches('/'),
            processor_name
        )
    }
}

fn describe_error(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) if !error.status.is_empty() => {
            format!("{}: {}", error.status, error.message)
        }
        Ok(ErrorEnvelope { error }) => error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl DocumentService for DocumentAiClient {
    async fn process_document(
        &self,
        processor_name: &str,
        request: ProcessRequest,
    ) -> Result<RemoteDocument, ProcessingError> {
        let token = self.credentials.access_token().await?;
        let url = self.process_url(processor_name);

        let body = serde_json::json!({
            "rawDocument": {
                "content": STANDARD.encode(&request.content),
                "mimeType": request.mime_type,
            }
        });

        tracing::debug!(
            name: "docai.remote.request",
            url = %url,
            bytes = request.content.len(),
            mime_type = %request.mime_type,
            "Sending document to Document AI"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProcessingError::transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = describe_error(&error_text);
            tracing::warn!(
                name: "docai.remote.failed",
                status = status.as_u16(),
                message = %message,
                "Document AI rejected the request"
            );
            return Err(ProcessingError::RemoteService {
                status: Some(status.as_u16()),
                message,
            });
        }

        let result: ProcessResponse = response
            .json()
            .await
            .map_err(|e| ProcessingError::transport(format!("Malformed response: {e}")))?;

        Ok(result.document)
    }

    fn service_name(&self) -> &'static str {
        "Document AI"
    }
}
