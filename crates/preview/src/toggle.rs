//! Conditional activation of a rule pack on a markdown pipeline.
//!
//! [`RuleToggle`] is a two-state machine driven by the enablement verdict. It
//! touches the registry only when the verdict changes, so running it before
//! every parse costs nothing while the verdict is stable. [`ToggledPipeline`]
//! composes an inner pipeline with one toggle and runs the toggle first.

use doco_core::DocoError;

use crate::processor::{Env, MarkdownPipeline, RuleHost, Token};
use crate::registry::{CONFLICTING_RULE, PackOptions, RulePack, RuleScope};
use crate::wrapper::Wrapper;

/// Env key set to the verdict on every parse.
pub const ENABLED_ENV_KEY: &str = "docoEnabled";

/// Supplies the current enablement verdict.
pub trait VerdictSource {
    /// Whether the toolkit is enabled right now.
    fn verdict(&mut self) -> bool;
}

impl<F: FnMut() -> bool> VerdictSource for F {
    fn verdict(&mut self) -> bool {
        self()
    }
}

/// Whether the pack is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    /// Pack rules off.
    #[default]
    Disabled,
    /// Pack rules on.
    Enabled,
}

/// What a call to [`RuleToggle::conditionally_apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Verdict matched the current state.
    Unchanged,
    /// Pack activated.
    Enabled,
    /// Pack deactivated.
    Disabled,
    /// Activation failed; state stays disabled and the next call retries.
    Failed,
}

/// Verdict-driven switch for one rule pack.
#[derive(Debug, Clone)]
pub struct RuleToggle {
    state: ToggleState,
    pack: RulePack,
    options: PackOptions,
    conflicting: Vec<(String, Vec<RuleScope>)>,
}

impl RuleToggle {
    /// A disabled toggle for `pack` that suppresses inline math on enable.
    pub fn new(pack: RulePack, options: PackOptions) -> Self {
        Self {
            state: ToggleState::Disabled,
            pack,
            options,
            conflicting: vec![(CONFLICTING_RULE.to_string(), vec![RuleScope::Inline])],
        }
    }

    /// Current state.
    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Bring `host` in line with `enabled`.
    ///
    /// Registry errors are logged and never returned. Conflicting built-ins
    /// switched off on enable stay off after disable.
    pub fn conditionally_apply<H: RuleHost + ?Sized>(
        &mut self,
        host: &mut H,
        enabled: bool,
    ) -> ToggleOutcome {
        match (enabled, self.state) {
            (true, ToggleState::Enabled) | (false, ToggleState::Disabled) => {
                ToggleOutcome::Unchanged
            }
            (true, ToggleState::Disabled) => {
                for (name, scopes) in &self.conflicting {
                    if let Err(err) = host.set_rule_enabled(name, false, scopes) {
                        log::warn!("could not disable conflicting rule `{name}`: {err}");
                    }
                }
                match host.use_pack(&self.pack, &self.options) {
                    Ok(count) => {
                        log::debug!("enabled {count} rules from `{}`", self.pack.name());
                        self.state = ToggleState::Enabled;
                        ToggleOutcome::Enabled
                    }
                    Err(err) => {
                        log::warn!("failed to enable rule pack `{}`: {err}", self.pack.name());
                        ToggleOutcome::Failed
                    }
                }
            }
            (false, ToggleState::Enabled) => {
                for name in self.pack.selected_names(&self.options.rules) {
                    if let Err(err) = host.set_rule_enabled(name, false, &RuleScope::ALL) {
                        log::warn!("could not disable rule `{name}`: {err}");
                    }
                }
                log::debug!("disabled rule pack `{}`", self.pack.name());
                self.state = ToggleState::Disabled;
                ToggleOutcome::Disabled
            }
        }
    }
}

/// Pipeline decorator that toggles a rule pack before every parse.
pub struct ToggledPipeline<P, V> {
    inner: P,
    toggle: RuleToggle,
    verdict: V,
    wrapper: Option<Wrapper>,
}

impl<P, V> ToggledPipeline<P, V>
where
    P: MarkdownPipeline + RuleHost,
    V: VerdictSource,
{
    /// Decorate `inner`, asking `verdict` before every parse.
    pub fn new(inner: P, pack: RulePack, options: PackOptions, verdict: V) -> Self {
        Self {
            inner,
            toggle: RuleToggle::new(pack, options),
            verdict,
            wrapper: None,
        }
    }

    /// Bracket output with `wrapper` while the pack is active.
    pub fn with_wrapper(mut self, wrapper: Wrapper) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// The decorated pipeline.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Current toggle state.
    pub fn toggle_state(&self) -> ToggleState {
        self.toggle.state()
    }

    /// Ask for the verdict and apply it. Returns the verdict and what changed.
    pub fn conditionally_apply(&mut self) -> (bool, ToggleOutcome) {
        let enabled = self.verdict.verdict();
        let outcome = self.toggle.conditionally_apply(&mut self.inner, enabled);
        (enabled, outcome)
    }
}

impl<P, V> MarkdownPipeline for ToggledPipeline<P, V>
where
    P: MarkdownPipeline + RuleHost,
    V: VerdictSource,
{
    fn parse(&mut self, source: &str, env: &mut Env) -> Result<Vec<Token>, DocoError> {
        let (enabled, _) = self.conditionally_apply();
        env.insert(ENABLED_ENV_KEY.to_string(), enabled.into());

        let tokens = self.inner.parse(source, env)?;
        Ok(match &self.wrapper {
            Some(wrapper) if self.toggle.state() == ToggleState::Enabled => wrapper.wrap(tokens),
            _ => tokens,
        })
    }

    fn render_tokens(&self, tokens: &[Token], env: &Env) -> String {
        self.inner.render_tokens(tokens, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::MarkdownProcessor;
    use crate::registry::{
        Construct, RuleEntry, RuleError, Ruler, builtin_rules, default_doco_pack,
    };
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CountingHost {
        ruler: Ruler,
        pack_calls: usize,
        disable_calls: usize,
    }

    impl RuleHost for CountingHost {
        fn ruler(&self) -> &Ruler {
            &self.ruler
        }

        fn ruler_mut(&mut self) -> &mut Ruler {
            &mut self.ruler
        }

        fn use_pack(&mut self, pack: &RulePack, options: &PackOptions) -> Result<usize, RuleError> {
            self.pack_calls += 1;
            self.ruler.use_pack(pack, options)
        }

        fn set_rule_enabled(
            &mut self,
            name: &str,
            enabled: bool,
            scopes: &[RuleScope],
        ) -> Result<usize, RuleError> {
            if !enabled {
                self.disable_calls += 1;
            }
            self.ruler.set_enabled_all(name, enabled, scopes)
        }
    }

    fn toggle() -> RuleToggle {
        RuleToggle::new(default_doco_pack(), PackOptions::default())
    }

    #[test]
    fn registers_once_per_verdict_change() {
        let mut host = CountingHost {
            ruler: builtin_rules(),
            ..CountingHost::default()
        };
        let mut toggle = toggle();

        assert_eq!(toggle.conditionally_apply(&mut host, false), ToggleOutcome::Unchanged);
        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Enabled);
        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Unchanged);
        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Unchanged);
        assert_eq!(host.pack_calls, 1);
        assert_eq!(toggle.state(), ToggleState::Enabled);
    }

    #[test]
    fn deactivates_once_per_verdict_change() {
        let mut host = CountingHost {
            ruler: builtin_rules(),
            ..CountingHost::default()
        };
        let mut toggle = toggle();
        toggle.conditionally_apply(&mut host, true);
        let after_enable = host.disable_calls;
        assert_eq!(after_enable, 1);

        assert_eq!(toggle.conditionally_apply(&mut host, false), ToggleOutcome::Disabled);
        assert_eq!(toggle.conditionally_apply(&mut host, false), ToggleOutcome::Unchanged);
        assert_eq!(toggle.conditionally_apply(&mut host, false), ToggleOutcome::Unchanged);
        assert_eq!(host.disable_calls - after_enable, 2);
        assert_eq!(host.pack_calls, 1);
    }

    #[test]
    fn inline_math_stays_off_after_disable() {
        let mut host = CountingHost {
            ruler: builtin_rules(),
            ..CountingHost::default()
        };
        let mut toggle = toggle();

        toggle.conditionally_apply(&mut host, true);
        assert!(!host.ruler.is_enabled(CONFLICTING_RULE));
        assert!(host.ruler.is_enabled("do_notes"));

        assert_eq!(toggle.conditionally_apply(&mut host, false), ToggleOutcome::Disabled);
        assert!(!host.ruler.is_enabled("do_notes"));
        assert!(!host.ruler.is_enabled("do_highlight"));
        assert!(!host.ruler.is_enabled(CONFLICTING_RULE));

        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Enabled);
        assert_eq!(host.pack_calls, 2);
        assert_eq!(host.ruler.entries().len(), builtin_rules().entries().len() + 2);
    }

    #[test]
    fn missing_conflicting_rule_is_not_fatal() {
        let mut host = CountingHost::default();
        let mut toggle = toggle();
        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Enabled);
    }

    #[test]
    fn registry_conflict_fails_silently_and_retries() {
        let mut host = CountingHost::default();
        host.ruler
            .push(RuleEntry::builtin("do_notes", RuleScope::Block, Construct::HtmlFlow));
        let mut toggle = toggle();

        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Failed);
        assert_eq!(toggle.state(), ToggleState::Disabled);
        assert_eq!(toggle.conditionally_apply(&mut host, true), ToggleOutcome::Failed);
        assert_eq!(host.pack_calls, 2);
    }

    fn pipeline(flag: Rc<Cell<bool>>) -> ToggledPipeline<MarkdownProcessor, impl FnMut() -> bool> {
        ToggledPipeline::new(
            MarkdownProcessor::new(),
            default_doco_pack(),
            PackOptions::default(),
            move || flag.get(),
        )
        .with_wrapper(Wrapper::new().with_css_uri("do.css"))
    }

    #[test]
    fn disabled_pipeline_renders_plain_output() {
        let flag = Rc::new(Cell::new(false));
        let mut pipeline = pipeline(Rc::clone(&flag));
        let mut env = Env::new();
        let html = pipeline.render("Price $x$ <^>y<^>", &mut env).expect("render");

        assert!(html.contains("language-math"), "{html}");
        assert!(!html.contains("do-co-authoring-toolkit-wrapper"));
        assert_eq!(env.get(ENABLED_ENV_KEY), Some(&false.into()));
    }

    #[test]
    fn enabled_pipeline_wraps_and_applies_pack() {
        let flag = Rc::new(Cell::new(true));
        let mut pipeline = pipeline(Rc::clone(&flag));
        let html = pipeline
            .render("<$>[note]\nRead <^>this<^>.\n<$>", &mut Env::new())
            .expect("render");

        assert!(
            html.starts_with(
                "<div class=\"do-co-authoring-toolkit-wrapper\" data-css-uri=\"do.css\"><div class=\"note\">"
            ),
            "{html}"
        );
        assert!(html.contains("<p>Read <span class=\"highlight\">this</span>.</p>"), "{html}");
        assert!(html.ends_with("</div>"), "{html}");
        assert_eq!(html.matches("</div>").count(), 2, "{html}");
    }

    #[test]
    fn failed_activation_renders_without_wrapper() {
        let mut ruler = builtin_rules();
        ruler.push(RuleEntry::builtin("do_notes", RuleScope::Block, Construct::HtmlFlow));
        let mut pipeline = ToggledPipeline::new(
            MarkdownProcessor::with_ruler(ruler),
            default_doco_pack(),
            PackOptions::default(),
            || true,
        )
        .with_wrapper(Wrapper::new().with_css_uri("do.css"));
        let mut env = Env::new();

        let html = pipeline.render("Use <^>x<^>", &mut env).expect("render");
        assert_eq!(pipeline.toggle_state(), ToggleState::Disabled);
        assert!(!html.contains("do-co-authoring-toolkit-wrapper"), "{html}");
        assert!(!html.contains("class=\"highlight\""), "{html}");
        assert_eq!(env.get(ENABLED_ENV_KEY), Some(&true.into()));
    }

    #[test]
    fn wrapper_follows_the_verdict() {
        let flag = Rc::new(Cell::new(true));
        let mut pipeline = pipeline(Rc::clone(&flag));
        let mut env = Env::new();

        let tokens = pipeline.parse("text", &mut env).expect("parse");
        assert!(matches!(tokens.first(), Some(Token::WrapperOpen { .. })));
        assert_eq!(pipeline.toggle_state(), ToggleState::Enabled);

        flag.set(false);
        let tokens = pipeline.parse("text", &mut env).expect("parse");
        assert_eq!(tokens.len(), 1);
        assert_eq!(pipeline.toggle_state(), ToggleState::Disabled);
        assert!(!pipeline.inner().ruler().is_enabled(CONFLICTING_RULE));
    }
}
