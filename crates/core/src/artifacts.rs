//! Draft artifact stripping.
//!
//! Draft artifacts are authoring-only markup that must not reach the published
//! article: HTML comments and `<$>[draft]` notes. Each match also consumes one
//! adjacent line terminator on either side so removal does not leave a blank
//! line behind.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;

static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:\r\n|\n)?<!--.*?-->(?:\r\n|\n)?").expect("Invalid HTML comment regex")
});

static DRAFT_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:\r\n|\n)?<\$>\[draft\].+?<\$>(?:\r\n|\n)?")
        .expect("Invalid draft note regex")
});

/// A half-open byte range of document text slated for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactSpan {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl ArtifactSpan {
    /// Create a span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to UTF-16 offsets within `text`, the unit editors address text in.
    pub fn to_utf16(&self, text: &str) -> (usize, usize) {
        let start = text[..self.start].encode_utf16().count();
        let len = text[self.start..self.end].encode_utf16().count();
        (start, start + len)
    }
}

/// Errors emitted while applying removals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    /// Span start is not before its end.
    #[error("malformed span {start}..{end}")]
    Malformed {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
    },
    /// Span reaches past the end of the document.
    #[error("span {start}..{end} exceeds document length {len}")]
    OutOfBounds {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
        /// Document length in bytes
        len: usize,
    },
    /// Span boundary splits a UTF-8 character.
    #[error("span boundary {offset} is not on a character boundary")]
    NotCharBoundary {
        /// Offending offset
        offset: usize,
    },
    /// Two spans cover the same text.
    #[error("span starting at {start} overlaps another removal")]
    Overlapping {
        /// Start of the later span
        start: usize,
    },
}

/// Find every draft artifact in `text`.
///
/// Returns non-overlapping spans sorted by descending start offset, ready for
/// back-to-front application. Spans from the two pattern families that overlap
/// (a draft note inside a comment, say) are merged.
pub fn compute_removals(text: &str) -> Vec<ArtifactSpan> {
    let mut spans: Vec<ArtifactSpan> = [&*HTML_COMMENT, &*DRAFT_NOTE]
        .into_iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|found| ArtifactSpan::new(found.start(), found.end()))
        .collect();

    spans.sort_by_key(|span| span.start);
    let mut merged: Vec<ArtifactSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }

    merged.reverse();
    merged
}

/// Delete `spans` from `text` as one batch.
///
/// Every span is validated against the original text before anything is
/// removed; on error `text` is left untouched. Returns the number of bytes
/// removed.
pub fn apply_removals(text: &mut String, spans: &[ArtifactSpan]) -> Result<usize, ArtifactError> {
    if spans.is_empty() {
        return Ok(0);
    }

    let mut ordered = spans.to_vec();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let len = text.len();
    let mut floor = len;
    for span in &ordered {
        if span.start >= span.end {
            return Err(ArtifactError::Malformed {
                start: span.start,
                end: span.end,
            });
        }
        if span.end > len {
            return Err(ArtifactError::OutOfBounds {
                start: span.start,
                end: span.end,
                len,
            });
        }
        for offset in [span.start, span.end] {
            if !text.is_char_boundary(offset) {
                return Err(ArtifactError::NotCharBoundary { offset });
            }
        }
        if span.end > floor {
            return Err(ArtifactError::Overlapping { start: span.start });
        }
        floor = span.start;
    }

    let mut removed = 0;
    for span in &ordered {
        text.replace_range(span.start..span.end, "");
        removed += span.len();
    }
    Ok(removed)
}

/// Remove all draft artifacts from `text`.
pub fn strip_draft_artifacts(text: &str) -> Cow<'_, str> {
    let spans = compute_removals(text);
    if spans.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = text.to_string();
    match apply_removals(&mut out, &spans) {
        Ok(_) => Cow::Owned(out),
        Err(err) => {
            log::warn!("draft artifact removal failed: {err}");
            Cow::Borrowed(text)
        }
    }
}
