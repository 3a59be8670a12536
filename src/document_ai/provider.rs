//! Core trait and types shared by the Document AI adapter and its collaborators.

use async_trait::async_trait;
use std::path::PathBuf;

use super::document::RemoteDocument;

/// Raw document payload forwarded to the remote processor.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Full file content, buffered in memory.
    pub content: Vec<u8>,
    /// MIME type declared for the content (e.g., "application/pdf").
    pub mime_type: String,
}

/// Errors that can occur while configuring or running the adapter.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// A required identifier, credential, or endpoint is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input file could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The remote call (or the token exchange preceding it) failed.
    #[error("{}", remote_message(*status, message))]
    RemoteService {
        /// HTTP status returned by the service, when one was received.
        status: Option<u16>,
        /// Message reported by the service or the transport.
        message: String,
    },
}

fn remote_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Remote service error ({code}): {message}"),
        None => format!("Remote service error: {message}"),
    }
}

impl ProcessingError {
    /// Build a [`ProcessingError::RemoteService`] for a failure with no HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::RemoteService {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status attached to a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteService { status, .. } => *status,
            _ => None,
        }
    }
}

/// The remote document-processing collaborator.
///
/// The adapter only depends on this request/response contract. The production
/// implementation is [`DocumentAiClient`](super::DocumentAiClient); tests and
/// embedders can inject their own.
#[async_trait]
pub trait DocumentService: Send + Sync + std::fmt::Debug {
    /// Send `request` to the processor addressed by `processor_name` and return
    /// the processed document.
    ///
    /// # Arguments
    ///
    /// * `processor_name` - Full processor resource path
    ///   (`projects/{p}/locations/{l}/processors/{id}`)
    /// * `request` - Raw content and its MIME type
    async fn process_document(
        &self,
        processor_name: &str,
        request: ProcessRequest,
    ) -> Result<RemoteDocument, ProcessingError>;

    /// Get the service name for logging and debugging.
    fn service_name(&self) -> &'static str;
}
