//! Stateful editor session exposed to Node callers.

use crate::convert::{convert_artifact_error, convert_error};
use crate::types::*;
use doco_core::{DocumentDescriptor, EnablementConfig, MemoryStore, Session};
use doco_preview::{
    Env, MarkdownPipeline, MarkdownProcessor, PackOptions, ToggledPipeline, VerdictSource, Wrapper,
    default_doco_pack,
};
use napi_derive::napi;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Verdict cell the session writes and the preview pipeline reads.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedVerdict(Arc<AtomicBool>);

impl SharedVerdict {
    fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

impl VerdictSource for SharedVerdict {
    fn verdict(&mut self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Editor session: enablement, diagnostics, commands, and preview rendering.
#[napi]
pub struct DocoSession {
    session: Session<EnablementConfig, MemoryStore>,
    verdict: SharedVerdict,
    pipeline: ToggledPipeline<MarkdownProcessor, SharedVerdict>,
}

#[napi]
impl DocoSession {
    #[napi(constructor)]
    /// Creates a session with an empty workspace store.
    pub fn new(options: Option<SessionOptions>) -> Self {
        let options = options.unwrap_or_default();
        let config = options.settings.map(EnablementConfig::from).unwrap_or_default();
        let verdict = SharedVerdict::default();

        let mut pipeline = ToggledPipeline::new(
            MarkdownProcessor::new(),
            default_doco_pack(),
            PackOptions::default(),
            verdict.clone(),
        );
        if let Some(css_uri) = options.css_uri {
            pipeline = pipeline.with_wrapper(Wrapper::new().with_css_uri(css_uri));
        }

        Self {
            session: Session::new(config, MemoryStore::new()),
            verdict,
            pipeline,
        }
    }

    /// Replaces the settings; applies from the next event on.
    #[napi(js_name = "updateSettings")]
    pub fn update_settings(&mut self, settings: EnablementSettings) {
        *self.session.config_mut() = settings.into();
    }

    /// Resolves the verdict for the active document (or none).
    #[napi]
    pub fn resolve(&mut self, active: Option<DocumentInput>) -> bool {
        let active = active.map(DocumentDescriptor::from);
        let enabled = self.session.resolve(active.as_ref());
        self.verdict.set(enabled);
        enabled
    }

    /// Last persisted verdict.
    #[napi(js_name = "isEnabled")]
    pub fn is_enabled(&self) -> bool {
        self.session.is_enabled()
    }

    /// Sticky Markdown document, if any.
    #[napi(js_name = "lastMarkdownDocument")]
    pub fn last_markdown_document(&self) -> Option<DocumentInput> {
        self.session
            .store()
            .last_markdown_document()
            .map(DocumentInput::from)
    }

    /// Renders `source` for the preview under the verdict for `active`.
    #[napi]
    pub fn render(
        &mut self,
        source: String,
        active: Option<DocumentInput>,
    ) -> napi::Result<RenderOutput> {
        let enabled = self.resolve(active);
        let html = self
            .pipeline
            .render(&source, &mut Env::new())
            .map_err(convert_error)?;
        Ok(RenderOutput { html, enabled })
    }

    /// Rescans `text` and replaces the findings stored for the document.
    #[napi(js_name = "refreshDiagnostics")]
    pub fn refresh_diagnostics(&mut self, document: DocumentInput, text: String) -> Vec<Finding> {
        let document = DocumentDescriptor::from(document);
        self.session
            .refresh_diagnostics(&document, &text)
            .iter()
            .map(Finding::from)
            .collect()
    }

    /// Current findings for `uri`.
    #[napi]
    pub fn diagnostics(&self, uri: String) -> Vec<Finding> {
        self.session
            .diagnostics(&uri)
            .iter()
            .map(Finding::from)
            .collect()
    }

    /// Drops findings for a closed document.
    #[napi(js_name = "closeDocument")]
    pub fn close_document(&mut self, uri: String) {
        self.session.close_document(&uri);
    }

    /// Runs the remove-draft-artifacts command.
    ///
    /// Returns the stripped text, or `null` when the toolkit is disabled for
    /// the document.
    #[napi(js_name = "removeDraftArtifacts")]
    pub fn remove_draft_artifacts(
        &mut self,
        document: DocumentInput,
        text: String,
    ) -> napi::Result<Option<String>> {
        let document = DocumentDescriptor::from(document);
        let mut text = text;
        let applied = self
            .session
            .remove_draft_artifacts(&document, &mut text)
            .map_err(convert_artifact_error)?;
        Ok(applied.then_some(text))
    }
}
