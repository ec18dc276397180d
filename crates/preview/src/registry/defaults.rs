//! Default rule configuration.
//!
//! The built-in rules mirror the constructs a stock preview parser enables.
//! The DO-CO pack adds the authoring syntax: `<$>[kind]` notes and `<^>`
//! highlights.

use super::types::{Construct, RuleEntry, RulePack, RuleScope, Ruler};
use crate::transform::{highlight, notes};

/// Name of the default DO-CO rule pack.
pub const DOCO_PACK_NAME: &str = "do-authoring";

/// Built-in inline rule that competes with the DO-CO syntax for `$`.
pub const CONFLICTING_RULE: &str = "math_inline";

/// A registry holding the stock preview rules, all enabled.
pub fn builtin_rules() -> Ruler {
    let mut ruler = Ruler::new();
    for entry in [
        RuleEntry::builtin("table", RuleScope::Block, Construct::Table),
        RuleEntry::builtin("math_block", RuleScope::Block, Construct::MathFlow),
        RuleEntry::builtin("html_block", RuleScope::Block, Construct::HtmlFlow),
        RuleEntry::builtin(CONFLICTING_RULE, RuleScope::Inline, Construct::MathText),
        RuleEntry::builtin("strikethrough", RuleScope::Inline, Construct::Strikethrough),
        RuleEntry::builtin("html_inline", RuleScope::Inline, Construct::HtmlText),
    ] {
        ruler.push(entry);
    }
    ruler
}

/// The DO-CO authoring pack.
///
/// Rule names: `do_notes` (block) and `do_highlight` (inline).
pub fn default_doco_pack() -> RulePack {
    RulePack::new(DOCO_PACK_NAME)
        .with_rule("do_notes", RuleScope::Block, notes::rewrite_notes)
        .with_rule("do_highlight", RuleScope::Inline, highlight::rewrite_highlights)
}
