#![deny(missing_docs)]
//! DO-CO core: enablement resolution, draft artifact stripping, first-person
//! diagnostics, and the markdown-rs parsing adapter.

/// Draft artifact detection and removal.
pub mod artifacts;
/// Editor command identifiers.
pub mod commands;
/// First-person diagnostics and quick-fixes.
pub mod diagnostics;
/// Enablement resolution and persisted toolkit state.
pub mod enablement;
/// Core error types.
pub mod error;
/// Markdown parsing utilities and text transform hooks.
pub mod parse;
/// Editor event handling.
pub mod session;

pub use artifacts::{
    ArtifactError, ArtifactSpan, apply_removals, compute_removals, strip_draft_artifacts,
};
pub use commands::{Command, PLUGIN_NAME};
pub use diagnostics::{
    DiagnosticCode, DiagnosticCollection, DiagnosticFinding, DiagnosticSeverity, QuickFix,
    apply_quick_fix, quick_fix, scan, scan_line, scan_text,
};
pub use enablement::{
    ConfigSource, DocumentDescriptor, EnablementConfig, EnablementResolver, MemoryStore,
    PatternSet, Resolution, StateStore, Store, resolve,
};
pub use error::{DocoError, SourceLocation};
pub use parse::{ParseOptions, TextTransform, render_html};
pub use session::Session;
