//! Human-readable and machine-readable rendering of processing results.
//!
//! The machine-readable form is one JSON record on its own line, bracketed by
//! [`RESULT_START`] and [`RESULT_END`] sentinel lines so a parent process can
//! pick it out of mixed stdout.

use std::fmt::Write;

use crate::document_ai::ProcessedDocument;

/// Line preceding the JSON record.
pub const RESULT_START: &str = "RESULT_JSON_START";
/// Line following the JSON record.
pub const RESULT_END: &str = "RESULT_JSON_END";

const TEXT_PREVIEW_CHARS: usize = 500;
const ENTITY_PREVIEW_COUNT: usize = 10;

/// Render the summary report printed by the CLI.
pub fn render_report(result: &ProcessedDocument) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Document Processing Results:");
    let _ = writeln!(out, "Number of pages: {}", result.pages);
    let _ = writeln!(out, "MIME type: {}", result.mime_type);

    if let Some(summary) = &result.summary {
        let _ = writeln!(out, "\nDocument Summary:");
        let _ = writeln!(out, "{summary}");
    }

    let _ = writeln!(out, "\nExtracted Text Sample:");
    if result.text.is_empty() {
        let _ = writeln!(out, "No text extracted.");
    } else {
        let preview: String = result.text.chars().take(TEXT_PREVIEW_CHARS).collect();
        let _ = writeln!(out, "{preview}...");
    }

    if result.entities.is_empty() {
        let _ = writeln!(out, "\nNo entities extracted.");
    } else {
        let _ = writeln!(out, "\nExtracted Entities:");
        for (i, entity) in result.entities.iter().take(ENTITY_PREVIEW_COUNT).enumerate() {
            let _ = writeln!(
                out,
                "{}. {}: {} (confidence: {:.2})",
                i + 1,
                entity.entity_type,
                entity.mention_text,
                entity.confidence
            );
        }
    }

    out
}

/// Serialize `result` between the sentinel lines.
pub fn frame_result(result: &ProcessedDocument) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(result)?;
    Ok(format!("{RESULT_START}\n{json}\n{RESULT_END}"))
}

/// Recover the record from captured output.
///
/// Markers only count as whole lines, so text containing them inside the
/// report or the record does not confuse the parser. When several frames are
/// present the last one wins. Returns `Ok(None)` when no complete frame is
/// present.
pub fn parse_framed_result(output: &str) -> Result<Option<ProcessedDocument>, serde_json::Error> {
    let lines: Vec<&str> = output.lines().map(str::trim_end).collect();

    let frame = lines
        .windows(3)
        .rev()
        .find(|w| w[0] == RESULT_START && w[2] == RESULT_END);

    match frame {
        Some(w) => serde_json::from_str(w[1]).map(Some),
        None => Ok(None),
    }
}
