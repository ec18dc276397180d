#![deny(missing_docs)]
//! Node.js bindings that surface the DO-CO toolkit's Rust implementation.

use napi_derive::napi;
use std::path::Path;

/// Conversions between binding and library types.
mod convert;
/// The stateful editor session.
pub mod session;
/// NAPI-exposed data structures.
pub mod types;

use convert::{convert_error, convert_stylesheet_error, removal_span};
pub use session::DocoSession;
pub use types::*;

/// Removes HTML comments and `<$>[draft]` notes from `text`.
#[napi(js_name = "stripDraftArtifacts")]
pub fn strip_draft_artifacts(text: String) -> StripResult {
    let removed = doco_core::compute_removals(&text).len() as u32;
    let stripped = doco_core::strip_draft_artifacts(&text).into_owned();
    StripResult {
        text: stripped,
        removed,
    }
}

/// Lists draft artifacts as editor offsets, last first.
#[napi(js_name = "computeDraftRemovals")]
pub fn compute_draft_removals(text: String) -> Vec<RemovalSpan> {
    doco_core::compute_removals(&text)
        .iter()
        .map(|span| removal_span(&text, span))
        .collect()
}

/// Scans `text` for standalone first-person "I".
#[napi(js_name = "scanFirstPerson")]
pub fn scan_first_person(text: String) -> Vec<Finding> {
    doco_core::scan_text(&text)
        .iter()
        .map(Finding::from)
        .collect()
}

/// Builds the quick-fix for the finding starting at `column_start` on `line`.
#[napi(js_name = "firstPersonQuickFix")]
pub fn first_person_quick_fix(line: String, column_start: u32) -> Option<QuickFixResult> {
    let finding = doco_core::scan_line(0, &line)
        .into_iter()
        .find(|finding| finding.column_start == column_start as usize)?;
    let fix = doco_core::quick_fix(&line, &finding)?;
    let fixed = doco_core::apply_quick_fix(&line, &finding)?;
    Some(QuickFixResult {
        title: fix.title.to_string(),
        replacement: fix.replacement,
        line: fixed,
    })
}

/// Pure enablement resolution with caller-held sticky state.
#[napi(js_name = "resolveEnablement")]
pub fn resolve_enablement(
    settings: EnablementSettings,
    active: Option<DocumentInput>,
    sticky: Option<DocumentInput>,
) -> ResolutionResult {
    let config = doco_core::EnablementConfig::from(settings);
    let active = active.map(doco_core::DocumentDescriptor::from);
    let sticky = sticky.map(doco_core::DocumentDescriptor::from);
    let resolution = doco_core::resolve(&config, active.as_ref(), sticky.as_ref());
    ResolutionResult {
        verdict: resolution.verdict,
        sticky: resolution.sticky.map(DocumentInput::from),
    }
}

/// Turns the raw site stylesheet into the preview stylesheet.
#[napi(js_name = "transformStylesheet")]
pub fn transform_stylesheet(raw: String, overrides: String) -> String {
    doco_preview::transform_stylesheet(&raw, &overrides)
}

/// Rebuilds the preview stylesheet from a cached raw copy.
///
/// Returns the output path. The previous output survives a failure.
#[napi(js_name = "rebuildStylesheet")]
pub fn rebuild_stylesheet(
    raw_path: String,
    overrides: String,
    output_path: String,
) -> napi::Result<String> {
    let source = doco_preview::CachedStylesheet::new(raw_path);
    doco_preview::rebuild_stylesheet(&source, &overrides, Path::new(&output_path))
        .map(|path| path.to_string_lossy().into_owned())
        .map_err(convert_stylesheet_error)
}

/// Links the wrapper's stylesheet into a rendered document.
#[napi(js_name = "injectStylesheet")]
pub fn inject_stylesheet(html: String) -> napi::Result<String> {
    doco_preview::inject_stylesheet(&html)
        .map(|out| out.into_owned())
        .map_err(convert_error)
}

/// Full command id for a short command name.
#[napi(js_name = "commandId")]
pub fn command_id(name: String) -> Option<String> {
    doco_core::Command::parse(&name).map(|command| command.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_and_counts_artifacts() {
        let result = strip_draft_artifacts("A<!-- x -->B\n<$>[draft]\nnote\n<$>\nC".to_string());
        assert_eq!(result.removed, 2);
        assert_eq!(result.text, "ABC");
    }

    #[test]
    fn removals_come_last_first() {
        let spans = compute_draft_removals("<!--a-->x<!--b-->".to_string());
        assert_eq!(spans.len(), 2);
        assert!(spans[0].start > spans[1].start);
    }

    #[test]
    fn quick_fix_rewrites_the_line() {
        let fix = first_person_quick_fix("so i did".to_string(), 2).expect("fix");
        assert_eq!(fix.title, "Replace with 'you'");
        assert_eq!(fix.replacement, " you ");
        assert_eq!(fix.line, "so you did");
        assert!(first_person_quick_fix("so i did".to_string(), 0).is_none());
    }

    #[test]
    fn command_ids_are_namespaced() {
        assert_eq!(
            command_id("rebuildCss".to_string()),
            Some("do-authoring-toolkit.rebuildCss".to_string())
        );
        assert_eq!(command_id("nope".to_string()), None);
    }

    #[test]
    fn pure_resolution_tracks_sticky() {
        let settings = EnablementSettings {
            enabled: None,
            enabled_patterns: Some(vec![serde_json::json!("*.md")]),
        };
        let doc = DocumentInput {
            uri: "file:///a.md".to_string(),
            language_id: "markdown".to_string(),
            file_name: "/a.md".to_string(),
            is_untitled: None,
        };
        let result = resolve_enablement(settings, Some(doc), None);
        assert!(result.verdict);
        assert_eq!(result.sticky.map(|d| d.uri), Some("file:///a.md".to_string()));
    }
}
