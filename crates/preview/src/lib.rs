#![deny(missing_docs)]
//! DO-CO preview engine: rule registry, verdict-driven rule pack toggling,
//! wrapper tokens, and stylesheet handling for the rendered surface.

/// Stylesheet injection into rendered documents.
pub mod inject;
/// Markdown pipeline contract and the markdown-rs processor.
pub mod processor;
/// Named rule registry and the default DO-CO pack.
pub mod registry;
/// Preview stylesheet transform and rebuild.
pub mod stylesheet;
/// Rule pack toggle and the toggled pipeline decorator.
pub mod toggle;
/// Source rewrites used by the DO-CO pack.
pub mod transform;
/// Wrapper marker tokens.
pub mod wrapper;

pub use inject::inject_stylesheet;
pub use processor::{Env, MarkdownPipeline, MarkdownProcessor, RuleHost, Token};
pub use registry::{
    PackOptions, RuleError, RulePack, RuleScope, RuleSelection, Ruler, builtin_rules,
    default_doco_pack,
};
pub use stylesheet::{
    CachedStylesheet, PREVIEW_SCOPE_PREFIX, StylesheetError, StylesheetSource, prefix_css_lines,
    rebuild_stylesheet, transform_stylesheet,
};
pub use toggle::{
    ENABLED_ENV_KEY, RuleToggle, ToggleOutcome, ToggleState, ToggledPipeline, VerdictSource,
};
pub use wrapper::{CSS_URI_ATTR, WRAPPER_CLASS, Wrapper};
