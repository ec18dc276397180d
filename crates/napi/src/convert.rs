//! Conversions between binding types and the core/preview types.

use crate::types::{DocumentInput, EnablementSettings, Finding, RemovalSpan};
use doco_core::{
    ArtifactError, ArtifactSpan, DiagnosticFinding, DocoError, DocumentDescriptor, EnablementConfig,
};
use doco_preview::StylesheetError;
use napi::{Error, Status};

impl From<DocumentInput> for DocumentDescriptor {
    fn from(input: DocumentInput) -> Self {
        DocumentDescriptor {
            uri: input.uri,
            language_id: input.language_id,
            file_name: input.file_name,
            is_untitled: input.is_untitled.unwrap_or(false),
        }
    }
}

impl From<DocumentDescriptor> for DocumentInput {
    fn from(document: DocumentDescriptor) -> Self {
        DocumentInput {
            uri: document.uri,
            language_id: document.language_id,
            file_name: document.file_name,
            is_untitled: Some(document.is_untitled),
        }
    }
}

impl From<EnablementSettings> for EnablementConfig {
    fn from(settings: EnablementSettings) -> Self {
        EnablementConfig {
            enabled: settings.enabled.unwrap_or(false),
            enabled_patterns: settings.enabled_patterns.unwrap_or_default(),
        }
    }
}

impl From<&DiagnosticFinding> for Finding {
    fn from(finding: &DiagnosticFinding) -> Self {
        Finding {
            line: finding.line as u32,
            column_start: finding.column_start as u32,
            column_end: finding.column_end as u32,
            code: finding.code.as_str().to_string(),
            severity: finding.severity.as_str().to_string(),
            message: finding.message.to_string(),
        }
    }
}

/// Converts a byte span to editor offsets within `text`.
pub fn removal_span(text: &str, span: &ArtifactSpan) -> RemovalSpan {
    let (start, end) = span.to_utf16(text);
    RemovalSpan {
        start: start as u32,
        end: end as u32,
    }
}

/// Maps core errors onto NAPI statuses.
pub fn convert_error(err: DocoError) -> Error {
    match err {
        DocoError::MarkdownAdapter { message, location } => Error::from_reason(format!(
            "Markdown parser error at {}: {}",
            location, message
        )),
        DocoError::RenderError(msg) => Error::from_reason(format!("Render error: {}", msg)),
    }
}

/// Invalid removal spans are caller mistakes.
pub fn convert_artifact_error(err: ArtifactError) -> Error {
    Error::new(Status::InvalidArg, format!("Invalid removal: {}", err))
}

/// Stylesheet rebuild failures.
pub fn convert_stylesheet_error(err: StylesheetError) -> Error {
    Error::from_reason(format!("Stylesheet rebuild failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doco_core::scan_text;
    use serde_json::json;

    #[test]
    fn settings_default_to_disabled() {
        let config = EnablementConfig::from(EnablementSettings::default());
        assert!(!config.enabled);
        assert!(config.enabled_patterns.is_empty());
    }

    #[test]
    fn settings_keep_non_string_patterns() {
        let config = EnablementConfig::from(EnablementSettings {
            enabled: None,
            enabled_patterns: Some(vec![json!(3), json!("*.md")]),
        });
        assert_eq!(config.string_patterns().collect::<Vec<_>>(), vec!["*.md"]);
    }

    #[test]
    fn findings_use_editor_names() {
        let findings = scan_text("ok\nI think");
        let finding = Finding::from(&findings[0]);
        assert_eq!(finding.line, 1);
        assert_eq!(finding.code, "FIRST_PERSON_I");
        assert_eq!(finding.severity, "warning");
    }

    #[test]
    fn removal_spans_are_utf16() {
        let text = "é<!-- x -->";
        let span = ArtifactSpan::new(2, text.len());
        assert_eq!(removal_span(text, &span), RemovalSpan { start: 1, end: 10 });
    }
}
