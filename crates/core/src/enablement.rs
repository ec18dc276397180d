//! Enablement resolution: decides whether DO-CO behavior applies to a document.
//!
//! The verdict depends on the configuration scoped to the active document, on
//! the document itself, and on one piece of carried-over state: the last
//! Markdown document that was active. The rendered preview is not itself a
//! Markdown document, so without that sticky document, pattern-based enabling
//! would never apply to the surface users actually look at.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

use crate::PLUGIN_NAME;

/// Content type that marks a document as Markdown.
pub const MARKDOWN_CONTENT_TYPE: &str = "markdown";

/// Persistence key for the mirrored enabled flag.
pub const ENABLED_KEY: &str = "do-authoring-toolkit.enabled";
/// Persistence key for the sticky last-Markdown document.
pub const LAST_MARKDOWN_DOCUMENT_KEY: &str = "do-authoring-toolkit.lastMdFile";

/// Configuration read from the `do-authoring-toolkit` settings namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnablementConfig {
    /// Enables DO-CO behavior for every document, skipping pattern checks.
    pub enabled: bool,
    /// Ordered glob patterns; entries that are not strings are ignored.
    pub enabled_patterns: Vec<JsonValue>,
}

impl EnablementConfig {
    /// Config that enables everything.
    pub fn always() -> Self {
        Self {
            enabled: true,
            enabled_patterns: Vec::new(),
        }
    }

    /// Config that enables documents matching any of `patterns`.
    pub fn with_patterns<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            enabled: false,
            enabled_patterns: patterns
                .into_iter()
                .map(|p| JsonValue::String(p.into()))
                .collect(),
        }
    }

    /// Iterate the string patterns in order.
    pub fn string_patterns(&self) -> impl Iterator<Item = &str> {
        self.enabled_patterns.iter().filter_map(JsonValue::as_str)
    }
}

/// Trimmed document identity: just enough to scope configuration and match globs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    /// Document identity (URI).
    pub uri: String,
    /// Content type identifier (`markdown`, `plaintext`, ...).
    pub language_id: String,
    /// Lookup key used for glob matching.
    pub file_name: String,
    /// Whether the document has never been saved.
    #[serde(default)]
    pub is_untitled: bool,
}

impl DocumentDescriptor {
    /// Create a descriptor whose URI is derived from the file name.
    pub fn new(file_name: impl Into<String>, language_id: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            uri: format!("file://{}", file_name),
            language_id: language_id.into(),
            file_name,
            is_untitled: false,
        }
    }

    /// Shorthand for a Markdown document.
    pub fn markdown(file_name: impl Into<String>) -> Self {
        Self::new(file_name, MARKDOWN_CONTENT_TYPE)
    }

    /// Whether this document is typed as Markdown.
    pub fn is_markdown(&self) -> bool {
        self.language_id == MARKDOWN_CONTENT_TYPE
    }
}

/// Source of configuration scoped to a document.
pub trait ConfigSource {
    /// Read the configuration that applies to `document`.
    fn config_for(&self, document: &DocumentDescriptor) -> EnablementConfig;
}

/// A single configuration applies to every document.
impl ConfigSource for EnablementConfig {
    fn config_for(&self, _document: &DocumentDescriptor) -> EnablementConfig {
        self.clone()
    }
}

impl<F> ConfigSource for F
where
    F: Fn(&DocumentDescriptor) -> EnablementConfig,
{
    fn config_for(&self, document: &DocumentDescriptor) -> EnablementConfig {
        (self)(document)
    }
}

/// Workspace-scoped key-value persistence.
pub trait StateStore {
    /// Read a value.
    fn get(&self, key: &str) -> Option<JsonValue>;
    /// Write a value; `Null` clears it.
    fn set(&mut self, key: &str, value: JsonValue);
}

/// In-memory [`StateStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, JsonValue>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: JsonValue) {
        if value.is_null() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), value);
        }
    }
}

/// Typed view over a [`StateStore`] for the enabled flag and sticky document.
#[derive(Debug, Clone, Default)]
pub struct Store<S> {
    inner: S,
}

impl<S: StateStore> Store<S> {
    /// Wrap a raw state store.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Last persisted verdict. Informational only; never an input to resolution.
    pub fn is_enabled(&self) -> bool {
        self.inner
            .get(ENABLED_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Persist the verdict.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.inner.set(ENABLED_KEY, JsonValue::Bool(enabled));
    }

    /// The most recently active Markdown document, if any.
    pub fn last_markdown_document(&self) -> Option<DocumentDescriptor> {
        let value = self.inner.get(LAST_MARKDOWN_DOCUMENT_KEY)?;
        match serde_json::from_value(value) {
            Ok(doc) => Some(doc),
            Err(err) => {
                log::debug!("ignoring malformed sticky document: {err}");
                None
            }
        }
    }

    /// Replace the sticky document.
    pub fn set_last_markdown_document(&mut self, document: Option<&DocumentDescriptor>) {
        let value = document
            .and_then(|doc| serde_json::to_value(doc).ok())
            .unwrap_or(JsonValue::Null);
        self.inner.set(LAST_MARKDOWN_DOCUMENT_KEY, value);
    }

    /// Access the underlying store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Whether DO-CO behavior applies.
    pub verdict: bool,
    /// Sticky document to carry into the next resolution.
    pub sticky: Option<DocumentDescriptor>,
}

/// Resolve the verdict for `active` under `config`.
///
/// Pure: the sticky document goes in and comes out through [`Resolution`].
pub fn resolve(
    config: &EnablementConfig,
    active: Option<&DocumentDescriptor>,
    sticky: Option<&DocumentDescriptor>,
) -> Resolution {
    resolve_with(config, active, sticky, |config, key| {
        PatternSet::from_config(config).is_match(key)
    })
}

fn resolve_with<F>(
    config: &EnablementConfig,
    active: Option<&DocumentDescriptor>,
    sticky: Option<&DocumentDescriptor>,
    matches: F,
) -> Resolution
where
    F: FnOnce(&EnablementConfig, &str) -> bool,
{
    let sticky = sticky.cloned();
    let Some(active) = active else {
        return Resolution {
            verdict: false,
            sticky,
        };
    };

    if config.enabled {
        return Resolution {
            verdict: true,
            sticky,
        };
    }

    let (subject, sticky) = if active.is_markdown() {
        (active.clone(), Some(active.clone()))
    } else {
        match sticky {
            Some(previous) => (previous.clone(), Some(previous)),
            None => {
                log::debug!(
                    "{} is not markdown and no markdown document was active before",
                    active.uri
                );
                return Resolution {
                    verdict: false,
                    sticky: None,
                };
            }
        }
    };

    let verdict = matches(config, &subject.file_name);
    Resolution { verdict, sticky }
}

/// Compiled `enabledPatterns`.
///
/// Every pattern is matched against the full lookup key. Patterns without a
/// `/` are also matched against the bare file name. Invalid globs are skipped.
#[derive(Debug, Clone)]
pub struct PatternSet {
    full: GlobSet,
    bare: GlobSet,
}

impl PatternSet {
    /// Compile `patterns` once.
    pub fn new<'a, I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut full = GlobSetBuilder::new();
        let mut bare = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    if !pattern.contains('/') {
                        bare.add(glob.clone());
                    }
                    full.add(glob);
                }
                Err(err) => {
                    log::debug!("skipping invalid enablement pattern {pattern:?}: {err}");
                }
            }
        }
        Self {
            full: build_set(full),
            bare: build_set(bare),
        }
    }

    /// Compile the string patterns of `config`.
    pub fn from_config(config: &EnablementConfig) -> Self {
        Self::new(config.string_patterns())
    }

    /// Whether any pattern matches `lookup_key`.
    pub fn is_match(&self, lookup_key: &str) -> bool {
        self.full.is_match(lookup_key)
            || Path::new(lookup_key)
                .file_name()
                .is_some_and(|name| self.bare.is_match(name))
    }
}

fn build_set(builder: GlobSetBuilder) -> GlobSet {
    builder.build().unwrap_or_else(|err| {
        log::debug!("failed to compile enablement patterns: {err}");
        GlobSet::empty()
    })
}

/// Glob-match a single `pattern` against a document lookup key.
pub fn pattern_matches(pattern: &str, lookup_key: &str) -> bool {
    PatternSet::new([pattern]).is_match(lookup_key)
}

/// Stateful resolver: reads scoped configuration and persists verdict and sticky state.
///
/// Compiled patterns are cached and rebuilt only when the scoped
/// configuration's pattern list changes.
pub struct EnablementResolver<C> {
    config: C,
    compiled: Option<(Vec<JsonValue>, PatternSet)>,
}

impl<C: ConfigSource> EnablementResolver<C> {
    /// Create a resolver over a configuration source.
    pub fn new(config: C) -> Self {
        Self {
            config,
            compiled: None,
        }
    }

    /// Replace the configuration source.
    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    /// Resolve the verdict for the newly `active` document, updating the
    /// sticky document and enabled flag.
    pub fn resolve<S: StateStore>(
        &mut self,
        active: Option<&DocumentDescriptor>,
        store: &mut Store<S>,
    ) -> bool {
        let verdict = match active {
            None => false,
            Some(doc) => {
                let previous = store.last_markdown_document();
                let resolution = self.resolve_document(doc, previous.as_ref());
                if doc.is_markdown() && resolution.sticky != previous {
                    store.set_last_markdown_document(resolution.sticky.as_ref());
                }
                resolution.verdict
            }
        };

        log::debug!("{PLUGIN_NAME} enablement verdict: {verdict}");
        store.set_enabled(verdict);
        verdict
    }

    /// Verdict for `document` without touching the store.
    ///
    /// For documents that are not (or not yet) the active one, such as a
    /// background document whose text changed.
    pub fn verdict_for<S: StateStore>(
        &mut self,
        document: &DocumentDescriptor,
        store: &Store<S>,
    ) -> bool {
        let previous = store.last_markdown_document();
        self.resolve_document(document, previous.as_ref()).verdict
    }

    fn resolve_document(
        &mut self,
        doc: &DocumentDescriptor,
        sticky: Option<&DocumentDescriptor>,
    ) -> Resolution {
        let config = self.config.config_for(doc);
        let compiled = &mut self.compiled;
        resolve_with(&config, Some(doc), sticky, |config, key| {
            let stale = compiled
                .as_ref()
                .is_none_or(|(patterns, _)| *patterns != config.enabled_patterns);
            if stale {
                *compiled = Some((
                    config.enabled_patterns.clone(),
                    PatternSet::from_config(config),
                ));
            }
            compiled
                .as_ref()
                .is_some_and(|(_, set)| set.is_match(key))
        })
    }
}
