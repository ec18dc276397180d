//! Editor command identifiers.

/// Extension name; prefixes command ids and names the settings namespace.
pub const PLUGIN_NAME: &str = "do-authoring-toolkit";

/// Commands the toolkit registers with the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Force-refresh the preview stylesheet.
    RebuildCss,
    /// Strip draft artifacts from the active document.
    RemoveDraftArtifacts,
}

impl Command {
    /// All commands, in registration order.
    pub const ALL: [Command; 2] = [Command::RebuildCss, Command::RemoveDraftArtifacts];

    /// Short name of the command.
    pub fn name(self) -> &'static str {
        match self {
            Command::RebuildCss => "rebuildCss",
            Command::RemoveDraftArtifacts => "removeDraftArtifacts",
        }
    }

    /// Fully-qualified command id.
    pub fn id(self) -> String {
        format!("{}.{}", PLUGIN_NAME, self.name())
    }

    /// Look a command up by short name or full id.
    pub fn parse(name: &str) -> Option<Self> {
        let short = name
            .strip_prefix(PLUGIN_NAME)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);
        Self::ALL.into_iter().find(|command| command.name() == short)
    }
}
