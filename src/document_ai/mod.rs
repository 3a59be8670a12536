//! Google Cloud Document AI adapter.
//!
//! Reads a document from disk, sends it to a Document AI processor, and
//! reshapes the processed document into a flat [`ProcessedDocument`] record
//! (text, page count, entities, MIME type, optional summary).
//!
//! # Components
//!
//! - [`DocumentAiProcessor`] - the adapter callers use
//! - [`DocumentService`] - remote collaborator seam, implemented by [`DocumentAiClient`]
//! - [`CredentialsProvider`] - bearer token source injected into the client
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::document_ai::{DocumentAiProcessor, ProcessorSettings};
//!
//! let processor = DocumentAiProcessor::new(ProcessorSettings::new("project", "us", "abc123"))?;
//! let result = processor.process(Path::new("notes.pdf"), "application/pdf").await?;
//! if let Some(summary) = &result.summary {
//!     println!("{summary}");
//! }
//! ```

mod client;
pub mod credentials;
mod document;
mod extract;
mod processor;
mod provider;

pub use client::{DocumentAiClient, regional_endpoint};
pub use credentials::{CredentialsProvider, StaticToken};
pub use document::{
    Block, Entity, Layout, NOTES_SUMMARY_TYPE, Page, RemoteDocument, TextAnchor, TextSegment,
};
pub use extract::{ExtractedEntity, ProcessedDocument, extract_entities, extract_summary};
pub use processor::{DEFAULT_MIME_TYPE, DocumentAiProcessor, ProcessorSettings};
pub use provider::{DocumentService, ProcessRequest, ProcessingError};

/// Guess a MIME type from the file extension.
pub fn guess_mime_type(path: &std::path::Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}
