//! Rule registry type definitions.

use doco_core::{ParseOptions, TextTransform};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Stage of the pipeline a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    /// Whole-document rules.
    Core,
    /// Block-level rules.
    Block,
    /// Inline rules.
    Inline,
}

impl RuleScope {
    /// Every scope, in execution order.
    pub const ALL: [RuleScope; 3] = [RuleScope::Core, RuleScope::Block, RuleScope::Inline];
}

/// Parser construct backing a built-in rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    /// `$inline$` math.
    MathText,
    /// `$$` block math.
    MathFlow,
    /// GFM tables.
    Table,
    /// GFM strikethrough.
    Strikethrough,
    /// Block-level raw HTML.
    HtmlFlow,
    /// Inline raw HTML.
    HtmlText,
}

impl Construct {
    fn apply(self, options: &mut ParseOptions, enabled: bool) {
        let slot = match self {
            Construct::MathText => &mut options.math_text,
            Construct::MathFlow => &mut options.math_flow,
            Construct::Table => &mut options.table,
            Construct::Strikethrough => &mut options.strikethrough,
            Construct::HtmlFlow => &mut options.html_flow,
            Construct::HtmlText => &mut options.html_text,
        };
        *slot |= enabled;
    }
}

/// Shared source rewrite run before parsing.
pub type SourceRule = Arc<dyn TextTransform + Send + Sync>;

/// What a rule does when enabled.
#[derive(Clone)]
pub enum RuleKind {
    /// Switches a parser construct on.
    Construct(Construct),
    /// Rewrites source text before parsing.
    Source(SourceRule),
}

impl std::fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Construct(construct) => f.debug_tuple("Construct").field(construct).finish(),
            RuleKind::Source(_) => f.write_str("Source(..)"),
        }
    }
}

/// A registered rule.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    /// Rule name; several entries may share one.
    pub name: String,
    /// Pipeline stage.
    pub scope: RuleScope,
    /// Whether the rule currently runs.
    pub enabled: bool,
    /// Behavior.
    pub kind: RuleKind,
    /// Pack that registered the rule; `None` for built-ins.
    pub owner: Option<String>,
}

impl RuleEntry {
    /// An enabled built-in construct rule.
    pub fn builtin(name: impl Into<String>, scope: RuleScope, construct: Construct) -> Self {
        Self {
            name: name.into(),
            scope,
            enabled: true,
            kind: RuleKind::Construct(construct),
            owner: None,
        }
    }
}

/// Errors raised by the rule registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// No rule with this name exists in the requested scopes.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),
    /// A toggle was requested over no scopes at all.
    #[error("no scopes given for rule `{0}`")]
    EmptyScopes(String),
    /// A pack tried to claim a name owned by someone else.
    #[error("rule `{name}` is already registered by {owner}")]
    ConflictingRegistration {
        /// Rule name
        name: String,
        /// Current owner
        owner: String,
    },
    /// The selection names a rule the pack does not ship.
    #[error("pack `{pack}` has no rule `{rule}`")]
    NotInPack {
        /// Pack name
        pack: String,
        /// Requested rule
        rule: String,
    },
}

/// `"all"` keyword for [`RuleSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKeyword {
    /// Every rule in the pack.
    All,
}

/// Which pack rules to use: `"all"` or a list of rule names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSelection {
    /// Keyword selection.
    Keyword(SelectionKeyword),
    /// Explicit rule names.
    Named(Vec<String>),
}

impl RuleSelection {
    /// Select every rule.
    pub fn all() -> Self {
        RuleSelection::Keyword(SelectionKeyword::All)
    }

    /// Whether `name` is selected.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            RuleSelection::Keyword(SelectionKeyword::All) => true,
            RuleSelection::Named(names) => names.iter().any(|n| n == name),
        }
    }
}

impl Default for RuleSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Options accepted when a pack is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackOptions {
    /// Selected rules.
    #[serde(default)]
    pub rules: RuleSelection,
}

/// A rule shipped by a pack.
#[derive(Clone)]
pub struct PackRule {
    /// Rule name.
    pub name: String,
    /// Pipeline stage.
    pub scope: RuleScope,
    /// Source rewrite.
    pub rule: SourceRule,
}

/// A named, ordered collection of rules toggled as a unit.
#[derive(Clone)]
pub struct RulePack {
    name: String,
    rules: Vec<PackRule>,
}

impl RulePack {
    /// Create an empty pack.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule, builder style.
    pub fn with_rule<T>(mut self, name: impl Into<String>, scope: RuleScope, rule: T) -> Self
    where
        T: TextTransform + Send + Sync + 'static,
    {
        self.rules.push(PackRule {
            name: name.into(),
            scope,
            rule: Arc::new(rule),
        });
        self
    }

    /// Pack name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in registration order.
    pub fn rules(&self) -> &[PackRule] {
        &self.rules
    }

    /// Names of the rules `selection` picks, in order.
    pub fn selected_names<'a>(
        &'a self,
        selection: &'a RuleSelection,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(|rule| selection.includes(&rule.name))
            .map(|rule| rule.name.as_str())
    }
}

impl std::fmt::Debug for RulePack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulePack")
            .field("name", &self.name)
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Ordered registry of named rules.
///
/// Names are not unique: a pack may register a rule under a name a built-in
/// already uses, and toggling by name affects every entry carrying it.
#[derive(Debug, Clone, Default)]
pub struct Ruler {
    entries: Vec<RuleEntry>,
}

impl Ruler {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: RuleEntry) {
        self.entries.push(entry);
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Whether any entry is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Whether any entry named `name` is enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name && e.enabled)
    }

    /// Set every entry named `name` within `scopes` to `enabled`.
    ///
    /// Returns how many entries changed state.
    pub fn set_enabled_all(
        &mut self,
        name: &str,
        enabled: bool,
        scopes: &[RuleScope],
    ) -> Result<usize, RuleError> {
        if scopes.is_empty() {
            return Err(RuleError::EmptyScopes(name.to_string()));
        }

        let mut matched = false;
        let mut changed = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.name == name && scopes.contains(&e.scope))
        {
            matched = true;
            if entry.enabled != enabled {
                entry.enabled = enabled;
                changed += 1;
            }
        }

        if matched {
            Ok(changed)
        } else {
            Err(RuleError::UnknownRule(name.to_string()))
        }
    }

    /// Enable every entry named `name`.
    pub fn enable(&mut self, name: &str) -> Result<usize, RuleError> {
        self.set_enabled_all(name, true, &RuleScope::ALL)
    }

    /// Disable every entry named `name`.
    pub fn disable(&mut self, name: &str) -> Result<usize, RuleError> {
        self.set_enabled_all(name, false, &RuleScope::ALL)
    }

    /// Register and enable the selected rules of `pack` in one step.
    ///
    /// Rules the pack registered earlier are re-enabled rather than added
    /// again. Nothing changes if any selected rule conflicts.
    pub fn use_pack(&mut self, pack: &RulePack, options: &PackOptions) -> Result<usize, RuleError> {
        if let RuleSelection::Named(names) = &options.rules
            && let Some(missing) = names
                .iter()
                .find(|name| !pack.rules().iter().any(|r| &r.name == *name))
        {
            return Err(RuleError::NotInPack {
                pack: pack.name().to_string(),
                rule: missing.clone(),
            });
        }

        let selected: Vec<&PackRule> = pack
            .rules()
            .iter()
            .filter(|rule| options.rules.includes(&rule.name))
            .collect();

        for rule in &selected {
            if let Some(entry) = self
                .entries
                .iter()
                .find(|e| e.name == rule.name && e.owner.as_deref() != Some(pack.name()))
            {
                return Err(RuleError::ConflictingRegistration {
                    name: rule.name.clone(),
                    owner: entry.owner.clone().unwrap_or_else(|| "built-in".to_string()),
                });
            }
        }

        for rule in &selected {
            let existing = self
                .entries
                .iter_mut()
                .find(|e| e.name == rule.name && e.owner.as_deref() == Some(pack.name()));
            match existing {
                Some(entry) => entry.enabled = true,
                None => self.entries.push(RuleEntry {
                    name: rule.name.clone(),
                    scope: rule.scope,
                    enabled: true,
                    kind: RuleKind::Source(Arc::clone(&rule.rule)),
                    owner: Some(pack.name().to_string()),
                }),
            }
        }

        Ok(selected.len())
    }

    /// Parser options implied by the enabled construct rules.
    pub fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions {
            table: false,
            strikethrough: false,
            html_flow: false,
            html_text: false,
            math_text: false,
            math_flow: false,
        };
        for entry in &self.entries {
            if let RuleKind::Construct(construct) = entry.kind {
                construct.apply(&mut options, entry.enabled);
            }
        }
        options
    }

    /// Enabled source rules, by scope and then registration order.
    pub fn active_source_rules(&self) -> Vec<&SourceRule> {
        RuleScope::ALL
            .iter()
            .flat_map(|scope| {
                self.entries.iter().filter(move |e| e.enabled && e.scope == *scope)
            })
            .filter_map(|entry| match &entry.kind {
                RuleKind::Source(rule) => Some(rule),
                RuleKind::Construct(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn shout(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.to_uppercase())
    }

    fn echo(input: &str) -> Cow<'_, str> {
        Cow::Borrowed(input)
    }

    fn pack() -> RulePack {
        RulePack::new("test-pack")
            .with_rule("shout", RuleScope::Inline, shout)
            .with_rule("echo", RuleScope::Block, echo)
    }

    #[test]
    fn toggles_every_same_named_entry() {
        let mut ruler = Ruler::new();
        ruler.push(RuleEntry::builtin("math_inline", RuleScope::Inline, Construct::MathText));
        ruler.push(RuleEntry::builtin("math_inline", RuleScope::Inline, Construct::MathText));
        ruler.push(RuleEntry::builtin("math_inline", RuleScope::Block, Construct::MathFlow));

        assert_eq!(ruler.set_enabled_all("math_inline", false, &[RuleScope::Inline]), Ok(2));
        assert_eq!(ruler.set_enabled_all("math_inline", false, &[RuleScope::Inline]), Ok(0));
        assert!(ruler.is_enabled("math_inline"));
        assert!(!ruler.parse_options().math_text);
        assert!(ruler.parse_options().math_flow);
    }

    #[test]
    fn unknown_names_and_empty_scopes_are_errors() {
        let mut ruler = Ruler::new();
        assert_eq!(ruler.disable("missing"), Err(RuleError::UnknownRule("missing".into())));
        assert_eq!(
            ruler.set_enabled_all("x", true, &[]),
            Err(RuleError::EmptyScopes("x".into()))
        );
    }

    #[test]
    fn use_pack_registers_then_reenables() {
        let mut ruler = Ruler::new();
        assert_eq!(ruler.use_pack(&pack(), &PackOptions::default()), Ok(2));
        assert_eq!(ruler.entries().len(), 2);

        ruler.disable("shout").expect("disable");
        assert!(!ruler.is_enabled("shout"));
        assert_eq!(ruler.use_pack(&pack(), &PackOptions::default()), Ok(2));
        assert_eq!(ruler.entries().len(), 2);
        assert!(ruler.is_enabled("shout"));
    }

    #[test]
    fn use_pack_is_atomic_on_conflict() {
        let mut ruler = Ruler::new();
        ruler.push(RuleEntry::builtin("echo", RuleScope::Core, Construct::Table));
        let err = ruler.use_pack(&pack(), &PackOptions::default()).unwrap_err();
        assert!(matches!(err, RuleError::ConflictingRegistration { .. }));
        assert!(!ruler.contains("shout"));
    }

    #[test]
    fn named_selection_limits_registration() {
        let mut ruler = Ruler::new();
        let options = PackOptions {
            rules: RuleSelection::Named(vec!["shout".into()]),
        };
        assert_eq!(ruler.use_pack(&pack(), &options), Ok(1));
        assert!(!ruler.contains("echo"));

        let bad = PackOptions {
            rules: RuleSelection::Named(vec!["nope".into()]),
        };
        assert!(matches!(
            ruler.use_pack(&pack(), &bad),
            Err(RuleError::NotInPack { .. })
        ));
    }

    #[test]
    fn source_rules_run_in_scope_order() {
        let mut ruler = Ruler::new();
        ruler.use_pack(&pack(), &PackOptions::default()).expect("use");
        let rules = ruler.active_source_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].transform("a"), "a");
        assert_eq!(rules[1].transform("a"), "A");
    }

    #[test]
    fn selection_deserializes_keyword_or_list() {
        let all: PackOptions = serde_json::from_str(r#"{"rules":"all"}"#).expect("all");
        assert_eq!(all.rules, RuleSelection::all());
        let named: PackOptions = serde_json::from_str(r#"{"rules":["a","b"]}"#).expect("named");
        assert!(named.rules.includes("b"));
        assert!(!named.rules.includes("c"));
        let empty: PackOptions = serde_json::from_str("{}").expect("default");
        assert!(empty.rules.includes("anything"));
    }
}
