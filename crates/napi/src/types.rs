//! NAPI-exposed data structures.

use napi_derive::napi;
use serde_json::Value as JsonValue;

/// Identity of an editor document.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Document URI.
    pub uri: String,
    /// Content type identifier (`markdown`, `plaintext`, ...).
    pub language_id: String,
    /// Path used for glob matching.
    pub file_name: String,
    /// Whether the document has never been saved.
    pub is_untitled: Option<bool>,
}

/// Toolkit settings as read from the editor.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct EnablementSettings {
    /// Enable for every document.
    pub enabled: Option<bool>,
    /// Ordered glob patterns; non-string entries are ignored.
    pub enabled_patterns: Option<Vec<JsonValue>>,
}

/// Options for a [`crate::DocoSession`].
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Initial settings.
    pub settings: Option<EnablementSettings>,
    /// Stylesheet locator placed on the preview wrapper.
    pub css_uri: Option<String>,
}

/// Result of the pure enablement resolver.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Whether the toolkit applies.
    pub verdict: bool,
    /// Sticky Markdown document after resolution.
    pub sticky: Option<DocumentInput>,
}

/// One first-person finding.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct Finding {
    /// Line index (0-based).
    pub line: u32,
    /// Start column in UTF-16 code units.
    pub column_start: u32,
    /// End column (exclusive) in UTF-16 code units.
    pub column_end: u32,
    /// Diagnostic code.
    pub code: String,
    /// Severity name.
    pub severity: String,
    /// Message shown to the author.
    pub message: String,
}

/// Quick-fix for a single finding.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct QuickFixResult {
    /// Action title.
    pub title: String,
    /// Replacement for the matched text.
    pub replacement: String,
    /// The line with the fix applied.
    pub line: String,
}

/// A draft artifact slated for removal.
#[napi(object)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalSpan {
    /// Start offset in UTF-16 code units.
    pub start: u32,
    /// End offset (exclusive) in UTF-16 code units.
    pub end: u32,
}

/// Result of stripping draft artifacts.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct StripResult {
    /// Text after removal.
    pub text: String,
    /// Number of spans removed.
    pub removed: u32,
}

/// Rendered preview output.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Verdict the render ran under.
    pub enabled: bool,
}
