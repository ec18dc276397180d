//! Host-agnostic handling of editor events.
//!
//! A [`Session`] owns everything that persists between editor events: the
//! resolver, the workspace store carrying the sticky document and enabled
//! flag, and the per-document diagnostics. Only [`Session::resolve`] moves the
//! sticky document and flag. Document handlers compute a verdict for their
//! own document and leave both alone.

use crate::artifacts::{ArtifactError, apply_removals, compute_removals};
use crate::diagnostics::{DiagnosticCollection, DiagnosticFinding, scan_text};
use crate::enablement::{ConfigSource, DocumentDescriptor, EnablementResolver, StateStore, Store};

/// Editor session state.
pub struct Session<C, S> {
    resolver: EnablementResolver<C>,
    store: Store<S>,
    diagnostics: DiagnosticCollection,
}

impl<C: ConfigSource, S: StateStore> Session<C, S> {
    /// Create a session over a configuration source and workspace store.
    pub fn new(config: C, store: S) -> Self {
        Self {
            resolver: EnablementResolver::new(config),
            store: Store::new(store),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Mutable access to the configuration source, e.g. after settings change.
    pub fn config_mut(&mut self) -> &mut C {
        self.resolver.config_mut()
    }

    /// Resolve the verdict for the active document.
    pub fn resolve(&mut self, active: Option<&DocumentDescriptor>) -> bool {
        self.resolver.resolve(active, &mut self.store)
    }

    /// Last persisted verdict, for status surfaces.
    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// The typed workspace store.
    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Verdict for `document` without moving the sticky document or flag.
    pub fn verdict_for(&mut self, document: &DocumentDescriptor) -> bool {
        self.resolver.verdict_for(document, &self.store)
    }

    /// Rescan `document` after it changed.
    ///
    /// The findings for the document are replaced as a whole; when disabled
    /// they are replaced by an empty set. The document need not be active.
    pub fn refresh_diagnostics(
        &mut self,
        document: &DocumentDescriptor,
        text: &str,
    ) -> &[DiagnosticFinding] {
        let findings = if self.verdict_for(document) {
            scan_text(text)
        } else {
            Vec::new()
        };
        log::debug!("{} findings for {}", findings.len(), document.uri);
        self.diagnostics.set(&document.uri, findings);
        self.diagnostics.get(&document.uri)
    }

    /// Drop findings for a closed document.
    pub fn close_document(&mut self, uri: &str) {
        self.diagnostics.delete(uri);
    }

    /// Current findings for `uri`.
    pub fn diagnostics(&self, uri: &str) -> &[DiagnosticFinding] {
        self.diagnostics.get(uri)
    }

    /// Run the remove-draft-artifacts command on `text`.
    ///
    /// Returns `Ok(false)` without touching `text` when the toolkit is disabled
    /// for `document`.
    pub fn remove_draft_artifacts(
        &mut self,
        document: &DocumentDescriptor,
        text: &mut String,
    ) -> Result<bool, ArtifactError> {
        if !self.verdict_for(document) {
            return Ok(false);
        }
        let spans = compute_removals(text);
        apply_removals(text, &spans)?;
        Ok(true)
    }
}
