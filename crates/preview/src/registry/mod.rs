//! Named rule registry and the default DO-CO rule pack.

/// Built-in rules and the default pack.
pub mod defaults;
/// Registry type definitions.
pub mod types;

pub use defaults::{CONFLICTING_RULE, DOCO_PACK_NAME, builtin_rules, default_doco_pack};
pub use types::{
    Construct, PackOptions, PackRule, RuleEntry, RuleError, RuleKind, RulePack, RuleScope,
    RuleSelection, Ruler, SelectionKeyword, SourceRule,
};
