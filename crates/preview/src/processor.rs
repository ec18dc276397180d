//! Markdown pipeline contract and the markdown-rs backed processor.

use doco_core::{DocoError, render_html};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use crate::registry::{PackOptions, RuleError, RulePack, RuleScope, Ruler, builtin_rules};

/// Per-render environment shared between parse and render.
pub type Env = serde_json::Map<String, Value>;

/// Output token of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Token {
    /// Opening wrapper element with attributes in order.
    #[serde(rename_all = "camelCase")]
    WrapperOpen {
        /// Element name.
        tag: String,
        /// Attribute name/value pairs.
        attrs: Vec<(String, String)>,
    },
    /// Closing wrapper element.
    WrapperClose {
        /// Element name.
        tag: String,
    },
    /// Rendered HTML.
    Html {
        /// HTML fragment.
        content: String,
    },
}

impl Token {
    /// Append this token's HTML to `out`.
    pub fn render_into(&self, out: &mut String) {
        match self {
            Token::WrapperOpen { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
            }
            Token::WrapperClose { tag } => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Token::Html { content } => out.push_str(content),
        }
    }
}

/// A processor whose rules can be toggled by name.
pub trait RuleHost {
    /// The rule registry.
    fn ruler(&self) -> &Ruler;

    /// Mutable access to the rule registry.
    fn ruler_mut(&mut self) -> &mut Ruler;

    /// Register and enable the selected rules of `pack` in one step.
    fn use_pack(&mut self, pack: &RulePack, options: &PackOptions) -> Result<usize, RuleError> {
        self.ruler_mut().use_pack(pack, options)
    }

    /// Switch every rule named `name` within `scopes`.
    fn set_rule_enabled(
        &mut self,
        name: &str,
        enabled: bool,
        scopes: &[RuleScope],
    ) -> Result<usize, RuleError> {
        self.ruler_mut().set_enabled_all(name, enabled, scopes)
    }
}

/// Markdown to HTML in two phases.
pub trait MarkdownPipeline {
    /// Turn `source` into tokens.
    fn parse(&mut self, source: &str, env: &mut Env) -> Result<Vec<Token>, DocoError>;

    /// Turn tokens into HTML.
    fn render_tokens(&self, tokens: &[Token], _env: &Env) -> String {
        let mut out = String::new();
        for token in tokens {
            token.render_into(&mut out);
        }
        out
    }

    /// Parse then render.
    fn render(&mut self, source: &str, env: &mut Env) -> Result<String, DocoError> {
        let tokens = self.parse(source, env)?;
        Ok(self.render_tokens(&tokens, env))
    }
}

/// Pipeline over markdown-rs.
///
/// Construct rules decide which markdown-rs constructs are on. Source rules
/// rewrite the text before it reaches the parser.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
    ruler: Ruler,
}

impl MarkdownProcessor {
    /// A processor with the stock built-in rules.
    pub fn new() -> Self {
        Self::with_ruler(builtin_rules())
    }

    /// A processor over a custom registry.
    pub fn with_ruler(ruler: Ruler) -> Self {
        Self { ruler }
    }

    /// Run the enabled source rules over `source`.
    pub fn preprocess<'a>(&self, source: &'a str) -> Cow<'a, str> {
        let mut text = Cow::Borrowed(source);
        for rule in self.ruler.active_source_rules() {
            let rewritten = match rule.transform(&text) {
                Cow::Owned(rewritten) => Some(rewritten),
                Cow::Borrowed(_) => None,
            };
            if let Some(rewritten) = rewritten {
                text = Cow::Owned(rewritten);
            }
        }
        text
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleHost for MarkdownProcessor {
    fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    fn ruler_mut(&mut self) -> &mut Ruler {
        &mut self.ruler
    }
}

impl MarkdownPipeline for MarkdownProcessor {
    fn parse(&mut self, source: &str, _env: &mut Env) -> Result<Vec<Token>, DocoError> {
        let text = self.preprocess(source);
        let content = render_html(&text, &self.ruler.parse_options())?;
        Ok(vec![Token::Html { content }])
    }
}
