//! The document extraction adapter.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::client::{DocumentAiClient, regional_endpoint};
use super::credentials::{self, CredentialsProvider};
use super::extract::ProcessedDocument;
use super::provider::{DocumentService, ProcessRequest, ProcessingError};

/// MIME type assumed when the caller does not provide one.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

/// Identifiers and connection options for a Document AI processor.
#[derive(Debug, Clone, Default)]
pub struct ProcessorSettings {
    pub project_id: String,
    /// Processor region (e.g., "us", "eu").
    pub location: String,
    pub processor_id: String,
    /// Pin a specific processor version instead of the default one.
    pub processor_version: Option<String>,
    /// Credentials file to use instead of ambient resolution.
    pub credentials_path: Option<PathBuf>,
    /// Override for the regional endpoint.
    pub endpoint: Option<String>,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Option<Duration>,
}

impl ProcessorSettings {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        processor_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            processor_id: processor_id.into(),
            ..Default::default()
        }
    }

    /// Check required identifiers, listing every missing one.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        let missing: Vec<&str> = [
            ("project_id", &self.project_id),
            ("location", &self.location),
            ("processor_id", &self.processor_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ProcessingError::Configuration(format!(
                "Missing required configuration values: {}",
                missing.join(", ")
            )));
        }

        let location = self.location.trim();
        if !location
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ProcessingError::Configuration(format!(
                "Invalid processor location: {location}"
            )));
        }

        Ok(())
    }

    /// Full resource path of the configured processor.
    pub fn processor_name(&self) -> String {
        let mut name = format!(
            "projects/{}/locations/{}/processors/{}",
            self.project_id.trim(),
            self.location.trim(),
            self.processor_id.trim()
        );
        if let Some(version) = self
            .processor_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            name.push_str("/processorVersions/");
            name.push_str(version);
        }
        name
    }

    fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| regional_endpoint(self.location.trim()))
    }
}

/// Adapter that sends a file to a Document AI processor and reshapes the result.
///
/// Holds only immutable configuration; concurrent calls share nothing mutable.
///
/// # Example
///
/// ```rust,ignore
/// let settings = ProcessorSettings::new("my-project", "us", "c0f3830de84c6d96");
/// let processor = DocumentAiProcessor::new(settings)?;
/// let result = processor.process(Path::new("notes.pdf"), DEFAULT_MIME_TYPE).await?;
/// println!("{} pages", result.pages);
/// ```
#[derive(Debug)]
pub struct DocumentAiProcessor {
    processor_name: String,
    service: Arc<dyn DocumentService>,
}

impl DocumentAiProcessor {
    /// Build an adapter talking to the Document AI REST API.
    ///
    /// Uses the credentials file from `settings` when given, ambient
    /// credentials otherwise.
    pub fn new(settings: ProcessorSettings) -> Result<Self, ProcessingError> {
        settings.validate()?;

        let credentials: Arc<dyn CredentialsProvider> = match &settings.credentials_path {
            Some(path) => credentials::load_credentials_file(path)?,
            None => credentials::resolve_ambient()?,
        };

        Self::with_credentials(settings, credentials)
    }

    /// Build an adapter with an explicit credentials provider.
    pub fn with_credentials(
        settings: ProcessorSettings,
        credentials: Arc<dyn CredentialsProvider>,
    ) -> Result<Self, ProcessingError> {
        settings.validate()?;

        let provider = credentials.provider_name();
        let client = DocumentAiClient::new(&settings.endpoint(), credentials, settings.timeout)?;
        tracing::debug!(
            name: "docai.client.created",
            endpoint = %client.endpoint(),
            credentials = provider,
            "Document AI client created"
        );
        Self::with_service(settings, Arc::new(client))
    }

    /// Build an adapter around a custom remote collaborator.
    pub fn with_service(
        settings: ProcessorSettings,
        service: Arc<dyn DocumentService>,
    ) -> Result<Self, ProcessingError> {
        settings.validate()?;

        let processor_name = settings.processor_name();
        tracing::debug!(
            name: "docai.processor.configured",
            processor = %processor_name,
            service = service.service_name(),
            "Document AI processor configured"
        );

        Ok(Self {
            processor_name,
            service,
        })
    }

    /// Resource path requests are addressed to.
    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }

    /// Process a file with the default MIME type.
    pub async fn process_default(&self, path: &Path) -> Result<ProcessedDocument, ProcessingError> {
        self.process(path, DEFAULT_MIME_TYPE).await
    }

    /// Read `path`, send it to the processor, and reshape the response.
    ///
    /// Nothing is sent if the file cannot be read.
    pub async fn process(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<ProcessedDocument, ProcessingError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ProcessingError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(
            name: "docai.process.started",
            file = %path.display(),
            bytes = content.len(),
            mime_type = %mime_type,
            processor = %self.processor_name,
            "Processing document"
        );

        let request = ProcessRequest {
            content,
            mime_type: mime_type.to_string(),
        };
        let document = self
            .service
            .process_document(&self.processor_name, request)
            .await?;

        let result = ProcessedDocument::from(&document);

        tracing::info!(
            name: "docai.process.completed",
            pages = result.pages,
            entities = result.entities.len(),
            has_summary = result.summary.is_some(),
            "Document processed"
        );

        Ok(result)
    }
}
