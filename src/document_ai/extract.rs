//! Reshaping of a [`RemoteDocument`] into the flat [`ProcessedDocument`] record.

use serde::{Deserialize, Serialize};

use super::document::{Entity, NOTES_SUMMARY_TYPE, RemoteDocument};

const SUMMARY_LABEL: &str = "summary";

/// Result of processing a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Full document text, as returned by the service.
    pub text: String,
    /// Number of pages in the processed document.
    pub pages: usize,
    /// Non-summary entities, in the order the service returned them.
    pub entities: Vec<ExtractedEntity>,
    /// MIME type echoed by the service.
    pub mime_type: String,
    /// Summary text, present only when one of the summary rules matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// An entity carried over from the remote document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mention_text: String,
    pub confidence: f32,
}

impl From<&Entity> for ExtractedEntity {
    fn from(entity: &Entity) -> Self {
        Self {
            entity_type: entity.entity_type.clone(),
            mention_text: entity.mention_text.clone(),
            confidence: entity.confidence,
        }
    }
}

impl From<&RemoteDocument> for ProcessedDocument {
    fn from(document: &RemoteDocument) -> Self {
        Self {
            text: document.text.clone(),
            pages: document.pages.len(),
            entities: extract_entities(document),
            mime_type: document.mime_type.clone(),
            summary: extract_summary(document),
        }
    }
}

fn is_summary_label(label: &str) -> bool {
    label.to_lowercase().contains(SUMMARY_LABEL)
}

/// Find the document summary.
///
/// Rules are tried in order and the first match wins:
///
/// 1. Notes-summary documents: the first entity typed exactly `summary`.
/// 2. Every entity whose type contains "summary" (any case), joined by newlines.
/// 3. The first page block whose block type contains "summary" (any case).
pub fn extract_summary(document: &RemoteDocument) -> Option<String> {
    if document.document_type.as_deref() == Some(NOTES_SUMMARY_TYPE) {
        if let Some(entity) = document
            .entities
            .iter()
            .find(|e| e.entity_type == SUMMARY_LABEL)
        {
            return Some(entity.mention_text.clone());
        }
    }

    let summaries: Vec<&str> = document
        .entities
        .iter()
        .filter(|e| is_summary_label(&e.entity_type))
        .map(|e| e.mention_text.as_str())
        .collect();
    if !summaries.is_empty() {
        return Some(summaries.join("\n"));
    }

    document
        .pages
        .iter()
        .flat_map(|page| page.blocks.iter())
        .find(|block| block.block_type.as_deref().is_some_and(is_summary_label))
        .map(|block| block.text(&document.text))
}

/// Collect every entity that is not a summary, preserving order.
pub fn extract_entities(document: &RemoteDocument) -> Vec<ExtractedEntity> {
    document
        .entities
        .iter()
        .filter(|e| !is_summary_label(&e.entity_type))
        .map(ExtractedEntity::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_ai::document::{Block, Layout, Page, TextAnchor, TextSegment};

    fn entity(entity_type: &str, mention_text: &str, confidence: f32) -> Entity {
        Entity {
            entity_type: entity_type.to_string(),
            mention_text: mention_text.to_string(),
            confidence,
        }
    }

    fn block(block_type: Option<&str>, content: &str) -> Block {
        Block {
            block_type: block_type.map(str::to_string),
            layout: Some(Layout {
                text_anchor: Some(TextAnchor {
                    content: Some(content.to_string()),
                    text_segments: vec![],
                }),
                confidence: None,
            }),
        }
    }

    fn doc_with_entities(entities: Vec<Entity>) -> RemoteDocument {
        RemoteDocument {
            text: "body".to_string(),
            mime_type: "application/pdf".to_string(),
            entities,
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_entity_split_from_entities() {
        let doc = doc_with_entities(vec![
            entity("summary", "Meeting recap", 0.98),
            entity("date", "2024-05-01", 0.91),
        ]);

        let result = ProcessedDocument::from(&doc);
        assert_eq!(result.summary.as_deref(), Some("Meeting recap"));
        assert_eq!(
            result.entities,
            vec![ExtractedEntity {
                entity_type: "date".to_string(),
                mention_text: "2024-05-01".to_string(),
                confidence: 0.91,
            }]
        );
    }

    #[test]
    fn test_summary_substring_matches_are_joined() {
        let doc = doc_with_entities(vec![
            entity("Summary_Short", "A", 0.5),
            entity("summary_long", "B", 0.5),
        ]);

        assert_eq!(extract_summary(&doc).as_deref(), Some("A\nB"));
        assert!(extract_entities(&doc).is_empty());
    }

    #[test]
    fn test_notes_summary_takes_first_exact_match_only() {
        let mut doc = doc_with_entities(vec![
            entity("summary_title", "Title", 0.4),
            entity("summary", "First", 0.9),
            entity("summary", "Second", 0.8),
        ]);
        doc.document_type = Some(NOTES_SUMMARY_TYPE.to_string());

        assert_eq!(extract_summary(&doc).as_deref(), Some("First"));
    }

    #[test]
    fn test_notes_summary_without_exact_match_falls_through() {
        let mut doc = doc_with_entities(vec![entity("Summary", "Capitalized", 0.9)]);
        doc.document_type = Some(NOTES_SUMMARY_TYPE.to_string());

        assert_eq!(extract_summary(&doc).as_deref(), Some("Capitalized"));
    }

    #[test]
    fn test_exact_match_ignored_for_other_document_types() {
        let mut doc = doc_with_entities(vec![
            entity("summary", "First", 0.9),
            entity("summary", "Second", 0.8),
        ]);
        doc.document_type = Some("invoice".to_string());

        assert_eq!(extract_summary(&doc).as_deref(), Some("First\nSecond"));
    }

    #[test]
    fn test_entity_summary_beats_block_summary() {
        let mut doc = doc_with_entities(vec![entity("summary", "From entity", 0.9)]);
        doc.pages = vec![Page {
            page_number: Some(1),
            blocks: vec![block(Some("SUMMARY"), "From block")],
        }];

        assert_eq!(extract_summary(&doc).as_deref(), Some("From entity"));
    }

    #[test]
    fn test_first_summary_block_in_page_order() {
        let mut doc = doc_with_entities(vec![entity("person", "Ada", 0.7)]);
        doc.pages = vec![
            Page {
                page_number: Some(1),
                blocks: vec![block(None, "untyped"), block(Some("paragraph"), "body")],
            },
            Page {
                page_number: Some(2),
                blocks: vec![
                    block(Some("Executive_Summary"), "Page two summary"),
                    block(Some("summary"), "Later summary"),
                ],
            },
        ];

        assert_eq!(extract_summary(&doc).as_deref(), Some("Page two summary"));
    }

    #[test]
    fn test_summary_block_resolved_from_segments() {
        let doc = RemoteDocument {
            text: "Header Recap of the call".to_string(),
            pages: vec![Page {
                page_number: Some(1),
                blocks: vec![Block {
                    block_type: Some("summary".to_string()),
                    layout: Some(Layout {
                        text_anchor: Some(TextAnchor {
                            content: None,
                            text_segments: vec![TextSegment {
                                start_index: 7,
                                end_index: 24,
                            }],
                        }),
                        confidence: None,
                    }),
                }],
            }],
            ..Default::default()
        };

        assert_eq!(extract_summary(&doc).as_deref(), Some("Recap of the call"));
    }

    #[test]
    fn test_no_summary_when_nothing_matches() {
        let mut doc = doc_with_entities(vec![entity("date", "2024-05-01", 0.91)]);
        doc.pages = vec![Page {
            page_number: Some(1),
            blocks: vec![block(Some("paragraph"), "text")],
        }];

        let result = ProcessedDocument::from(&doc);
        assert_eq!(result.summary, None);
        assert_eq!(result.pages, 1);
    }

    #[test]
    fn test_empty_document() {
        let result = ProcessedDocument::from(&RemoteDocument::default());
        assert!(result.entities.is_empty());
        assert_eq!(result.summary, None);
        assert_eq!(result.pages, 0);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("summary").is_none());
        assert_eq!(json["entities"], serde_json::json!([]));
    }

    #[test]
    fn test_entities_keep_relative_order() {
        let doc = doc_with_entities(vec![
            entity("person", "Ada", 0.7),
            entity("meeting_summary", "skip", 0.9),
            entity("date", "2024-05-01", 0.91),
            entity("person", "Ada", 0.7),
            entity("SUMMARY", "skip too", 0.9),
            entity("location", "Room 4", 0.2),
        ]);

        let entities = extract_entities(&doc);
        let labels: Vec<(&str, &str)> = entities
            .iter()
            .map(|e| (e.entity_type.as_str(), e.mention_text.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("person", "Ada"),
                ("date", "2024-05-01"),
                ("person", "Ada"),
                ("location", "Room 4"),
            ]
        );
    }

    #[test]
    fn test_record_serializes_in_field_order() {
        let doc = doc_with_entities(vec![
            entity("summary", "Recap", 0.98),
            entity("date", "2024-05-01", 0.91),
        ]);
        let json = serde_json::to_string(&ProcessedDocument::from(&doc)).unwrap();
        assert_eq!(
            json,
            r#"{"text":"body","pages":0,"entities":[{"type":"date","mention_text":"2024-05-01","confidence":0.91}],"mime_type":"application/pdf","summary":"Recap"}"#
        );
    }
}
