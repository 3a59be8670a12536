//! Wire model for the processed document returned by Document AI.
//!
//! Every field is optional on the wire. Absent values deserialize to empty
//! strings, empty vectors, or `None` so the extraction code never has to
//! probe for the presence of a field.

use serde::{Deserialize, Deserializer, Serialize};

/// Document type reported by notes-summarizer processors.
pub const NOTES_SUMMARY_TYPE: &str = "notes_summary";

/// A document as returned by the remote processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteDocument {
    /// Full text extracted from the document.
    pub text: String,
    /// MIME type echoed by the service.
    pub mime_type: String,
    /// Processor-specific document kind (e.g., "notes_summary").
    pub document_type: Option<String>,
    pub pages: Vec<Page>,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub page_number: Option<u32>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    /// Block classification label, when the processor emits one.
    pub block_type: Option<String>,
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    pub text_anchor: Option<TextAnchor>,
    pub confidence: Option<f32>,
}

/// Reference to a span of the document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextAnchor {
    /// Inline copy of the anchored text, if the service provided one.
    pub content: Option<String>,
    pub text_segments: Vec<TextSegment>,
}

/// Half-open character range `[start_index, end_index)` into [`RemoteDocument::text`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSegment {
    #[serde(deserialize_with = "int64_lenient")]
    pub start_index: u64,
    #[serde(deserialize_with = "int64_lenient")]
    pub end_index: u64,
}

/// A labeled span of extracted information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mention_text: String,
    pub confidence: f32,
}

impl TextAnchor {
    /// Resolve the anchored text.
    ///
    /// Prefers the inline `content`; otherwise concatenates the text segments
    /// sliced out of `document_text`. Indices are clamped to the text length.
    pub fn resolve(&self, document_text: &str) -> String {
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            return content.to_string();
        }

        self.text_segments
            .iter()
            .map(|segment| {
                let start = usize::try_from(segment.start_index).unwrap_or(usize::MAX);
                let end = usize::try_from(segment.end_index).unwrap_or(usize::MAX);
                document_text
                    .chars()
                    .skip(start)
                    .take(end.saturating_sub(start))
                    .collect::<String>()
            })
            .collect()
    }
}

impl Block {
    /// Text covered by this block, empty when the block has no anchor.
    pub fn text(&self, document_text: &str) -> String {
        self.layout
            .as_ref()
            .and_then(|layout| layout.text_anchor.as_ref())
            .map(|anchor| anchor.resolve(document_text))
            .unwrap_or_default()
    }
}

/// The REST API encodes int64 fields as JSON strings; accept numbers too.
fn int64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
