//! # Domain Types
//!
//! The action plan produced from model output, the per-session state that survives
//! between turns, and the immutable per-turn configuration.

use serde::{Deserialize, Serialize};

/// A single file-system step requested by the model.
///
/// Tagged on the wire by the `action` field, e.g.
/// `{"action":"write_file","path":"./a.txt","content":"hi"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    WriteFile {
        path: String,
        content: String,
    },
    EditFile {
        path: String,
        #[serde(default)]
        find: String,
        #[serde(default)]
        replace: String,
    },
    ReadFile {
        path: String,
    },
    #[serde(alias = "list_dir")]
    ListDirectory {
        #[serde(default = "default_directory")]
        path: String,
    },
}

fn default_directory() -> String {
    ".".to_string()
}

impl Action {
    /// Wire name of the action, used in previews and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::WriteFile { .. } => "write_file",
            Action::EditFile { .. } => "edit_file",
            Action::ReadFile { .. } => "read_file",
            Action::ListDirectory { .. } => "list_directory",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Action::WriteFile { path, .. }
            | Action::EditFile { path, .. }
            | Action::ReadFile { path }
            | Action::ListDirectory { path } => path,
        }
    }
}

/// The ordered list of actions for one turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
    #[serde(
        default,
        rename = "primaryFile",
        alias = "primary_file",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_file: Option<String>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// State carried across turns of one CLI process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Most recently touched file. Only used as prompt context.
    pub last_file: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, path: impl Into<String>) {
        self.last_file = Some(path.into());
    }
}

/// Per-invocation settings for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnConfiguration {
    pub provider: String,
    pub model: Option<String>,
    pub port: u16,
    pub auto: bool,
    pub dry_run: bool,
}

impl TurnConfiguration {
    /// Whether the turn may go ahead without asking the user.
    pub fn skips_confirmation(&self) -> bool {
        self.auto || self.dry_run
    }
}

/// Body of a successful `/read_file` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileContent {
    pub content: String,
}

/// Result of a command run by the companion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CommandOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
