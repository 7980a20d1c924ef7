//! # Workspace
//!
//! File and shell primitives served by the companion service.
//! Every path is resolved against the workspace root and rejected if it escapes it.

use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

use crate::domain::types::CommandOutput;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("access denied: {0} is outside the workspace root")]
    OutsideRoot(PathBuf),
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("command timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One entry of a directory listing.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: &'static str,
}

/// Sandboxed view of one directory tree.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    command_timeout: Duration,
}

impl Workspace {
    pub fn new(root: &Path, command_timeout: Duration) -> Result<Self, WorkspaceError> {
        let root = root.canonicalize()?;
        Ok(Self {
            root,
            command_timeout,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` (relative to the root, or absolute) to a path inside the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, WorkspaceError> {
        let requested = Path::new(path);
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        // Canonicalize the deepest existing ancestor, then re-append the rest.
        let mut existing = joined.clone();
        let mut remainder = Vec::new();
        while !existing.exists() {
            match (existing.file_name(), existing.parent()) {
                (Some(name), Some(parent)) => {
                    remainder.push(name.to_owned());
                    existing = parent.to_path_buf();
                }
                _ => return Err(WorkspaceError::OutsideRoot(joined)),
            }
        }

        let mut resolved = existing.canonicalize()?;
        for part in remainder.iter().rev() {
            resolved.push(part);
        }

        // `..` components that could not be canonicalized (non-existent tail) are refused.
        let escapes = resolved
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !resolved.starts_with(&self.root) {
            return Err(WorkspaceError::OutsideRoot(joined));
        }
        Ok(resolved)
    }

    pub async fn read_file(&self, path: &str) -> Result<String, WorkspaceError> {
        let resolved = self.resolve(path)?;
        if !resolved.is_file() {
            return Err(WorkspaceError::NotFound(resolved));
        }
        Ok(tokio::fs::read_to_string(resolved).await?)
    }

    /// Write a file, creating missing parent directories. Returns bytes written.
    pub async fn write_file(&self, path: &str, content: &str) -> Result<usize, WorkspaceError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&resolved, content).await?;
        Ok(content.len())
    }

    pub async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, WorkspaceError> {
        let resolved = self.resolve(path)?;
        if !resolved.is_dir() {
            return Err(WorkspaceError::NotFound(resolved));
        }

        let mut entries = tokio::fs::read_dir(resolved).await?;
        let mut listing = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let kind = if entry.file_type().await?.is_dir() {
                "dir"
            } else {
                "file"
            };
            listing.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
            });
        }
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    /// Execute a shell command in a directory inside the workspace.
    pub async fn execute_command(
        &self,
        command: &str,
        cwd: Option<&str>,
    ) -> Result<CommandOutput, WorkspaceError> {
        let safe_cwd = match cwd {
            Some(dir) => self.resolve(dir)?,
            None => self.root.clone(),
        };

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = tokio::process::Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(safe_cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let output = tokio::time::timeout(self.command_timeout, child.wait_with_output())
            .await
            .map_err(|_| WorkspaceError::Timeout(self.command_timeout.as_secs()))??;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }
}
