//! First-person pronoun diagnostics and their quick-fix.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

/// Standalone `I`: at line start followed by a space, between spaces, or ending the line.
static FIRST_PERSON_I: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^i | i | i$").expect("Invalid first-person regex"));

/// Title of the quick-fix action offered for [`DiagnosticCode::FirstPersonI`].
pub const FIRST_PERSON_FIX_TITLE: &str = "Replace with 'you'";

/// Diagnostic codes emitted by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Use of the first-person "I".
    #[serde(rename = "FIRST_PERSON_I")]
    FirstPersonI,
}

impl DiagnosticCode {
    /// Wire name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::FirstPersonI => "FIRST_PERSON_I",
        }
    }

    /// Fixed message for the code.
    pub fn message(self) -> &'static str {
        match self {
            DiagnosticCode::FirstPersonI => "Try to avoid the use of the first-person \"I\".",
        }
    }

    /// Fixed severity for the code.
    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            DiagnosticCode::FirstPersonI => DiagnosticSeverity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editor diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Error
    Error,
    /// Warning
    Warning,
    /// Information
    Information,
    /// Hint
    Hint,
}

impl DiagnosticSeverity {
    /// Lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Information => "information",
            DiagnosticSeverity::Hint => "hint",
        }
    }
}

/// A single finding on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticFinding {
    /// Line index (0-based).
    pub line: usize,
    /// Start column in UTF-16 code units.
    pub column_start: usize,
    /// End column (exclusive) in UTF-16 code units.
    pub column_end: usize,
    /// Byte range of the match within the line.
    #[serde(skip)]
    pub span: Range<usize>,
    /// Diagnostic code.
    pub code: DiagnosticCode,
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// Human-readable message.
    pub message: &'static str,
}

impl DiagnosticFinding {
    fn first_person(line: usize, text: &str, span: Range<usize>) -> Self {
        let column_start = text[..span.start].encode_utf16().count();
        let column_end = column_start + text[span.clone()].encode_utf16().count();
        let code = DiagnosticCode::FirstPersonI;
        Self {
            line,
            column_start,
            column_end,
            span,
            code,
            severity: code.severity(),
            message: code.message(),
        }
    }
}

/// Scan one line for standalone first-person "I" occurrences.
pub fn scan_line(line: usize, text: &str) -> Vec<DiagnosticFinding> {
    FIRST_PERSON_I
        .find_iter(text)
        .map(|found| DiagnosticFinding::first_person(line, text, found.range()))
        .collect()
}

/// Scan a document given as lines.
pub fn scan<S: AsRef<str>>(lines: &[S]) -> Vec<DiagnosticFinding> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(index, line)| scan_line(index, line.as_ref()))
        .collect()
}

/// Scan full document text, splitting lines on `\n` and dropping a trailing `\r`.
pub fn scan_text(text: &str) -> Vec<DiagnosticFinding> {
    text.split('\n')
        .enumerate()
        .flat_map(|(index, line)| scan_line(index, line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// A text replacement offered for a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickFix {
    /// Action title.
    pub title: &'static str,
    /// Replacement for the finding's exact text.
    pub replacement: String,
}

/// Build the replacement for `finding` on `line`.
///
/// A match that begins the line starts a sentence and becomes `You`; any other
/// match becomes `you`. Whitespace captured by the match is kept.
pub fn quick_fix(line: &str, finding: &DiagnosticFinding) -> Option<QuickFix> {
    let matched = line.get(finding.span.clone())?;
    let pronoun = matched.find(['i', 'I'])?;
    let word = if finding.span.start == 0 { "You" } else { "you" };

    let mut replacement = String::with_capacity(matched.len() + 2);
    replacement.push_str(&matched[..pronoun]);
    replacement.push_str(word);
    replacement.push_str(&matched[pronoun + 1..]);

    Some(QuickFix {
        title: FIRST_PERSON_FIX_TITLE,
        replacement,
    })
}

/// Apply the quick-fix for `finding` to `line`, returning the rewritten line.
pub fn apply_quick_fix(line: &str, finding: &DiagnosticFinding) -> Option<String> {
    let fix = quick_fix(line, finding)?;
    let mut out = String::with_capacity(line.len() + 2);
    out.push_str(&line[..finding.span.start]);
    out.push_str(&fix.replacement);
    out.push_str(&line[finding.span.end..]);
    Some(out)
}

/// Findings per document, replaced wholesale on every scan.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    documents: HashMap<String, Vec<DiagnosticFinding>>,
}

impl DiagnosticCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all findings for `uri`.
    pub fn set(&mut self, uri: &str, findings: Vec<DiagnosticFinding>) {
        self.documents.insert(uri.to_string(), findings);
    }

    /// Findings for `uri`; empty when never scanned.
    pub fn get(&self, uri: &str) -> &[DiagnosticFinding] {
        self.documents.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forget `uri` entirely.
    pub fn delete(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// Number of documents tracked.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is tracked.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
