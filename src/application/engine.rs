//! # Execution Engine
//!
//! Runs one turn of a parsed plan: preview, confirmation, availability check, then
//! each action in order against the companion service. A failing action is reported
//! and the remaining actions still run.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::application::edit::apply_edit;
use crate::application::supervisor::AvailabilitySupervisor;
use crate::domain::traits::{Terminal, Tone};
use crate::domain::types::{Action, Plan, SessionState, TurnConfiguration};
use crate::infrastructure::mcp::SharedCompanion;
use crate::strings::messages;

/// Characters of a read file shown by default.
pub const DEFAULT_EXCERPT_CHARS: usize = 2000;

/// An action that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    /// Zero-based position in the plan.
    pub index: usize,
    pub kind: &'static str,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub succeeded: usize,
    pub failures: Vec<ActionFailure>,
    pub active_file: Option<String>,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The user said no (or could not be asked).
    Declined,
    /// The companion service could not be reached or started.
    Unavailable,
    /// Previewed only.
    DryRun,
    Executed(TurnReport),
    /// The model call failed before a plan existed.
    LlmFailed(String),
    /// The model replied, but no plan could be recovered from it.
    Unparsed,
}

pub struct ExecutionEngine {
    service: SharedCompanion,
    supervisor: Arc<AvailabilitySupervisor>,
    terminal: Arc<dyn Terminal>,
    excerpt_chars: usize,
}

impl ExecutionEngine {
    pub fn new(
        service: SharedCompanion,
        supervisor: Arc<AvailabilitySupervisor>,
        terminal: Arc<dyn Terminal>,
    ) -> Self {
        Self {
            service,
            supervisor,
            terminal,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    pub async fn run_turn(
        &self,
        plan: Plan,
        config: &TurnConfiguration,
        session: &mut SessionState,
    ) -> TurnOutcome {
        self.preview(&plan);

        if !config.skips_confirmation() {
            let proceed = match self.terminal.confirm(messages::CONFIRM_APPLY, true) {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("Confirmation prompt failed: {:#}", e);
                    false
                }
            };
            if !proceed {
                self.terminal.print(Tone::Warning, messages::TURN_DECLINED);
                return TurnOutcome::Declined;
            }
        }

        if config.dry_run {
            if let Some(primary) = &plan.primary_file {
                session.remember(primary.clone());
            }
            self.terminal.print(Tone::Muted, messages::DRY_RUN_NOTICE);
            self.print_active_file(session);
            return TurnOutcome::DryRun;
        }

        if !self.supervisor.ensure_available().await {
            self.terminal
                .print(Tone::Error, &messages::service_unavailable(config.port));
            return TurnOutcome::Unavailable;
        }

        let mut report = TurnReport::default();
        for (index, action) in plan.actions.iter().enumerate() {
            debug!("Running action {} ({} {})", index + 1, action.kind(), action.path());
            match self.execute(action).await {
                Ok(touched) => {
                    report.succeeded += 1;
                    if let Some(path) = touched {
                        session.remember(path);
                    }
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    warn!("Action {} failed: {}", index + 1, message);
                    self.terminal
                        .print(Tone::Error, &messages::action_failed(index, action, &message));
                    report.failures.push(ActionFailure {
                        index,
                        kind: action.kind(),
                        path: action.path().to_string(),
                        message,
                    });
                }
            }
        }

        if let Some(primary) = &plan.primary_file {
            session.remember(primary.clone());
        }
        report.active_file = session.last_file.clone();

        info!(
            "Turn finished: {} succeeded, {} failed",
            report.succeeded,
            report.failures.len()
        );
        self.terminal.print(
            Tone::Heading,
            &messages::turn_summary(report.succeeded, report.failures.len()),
        );
        self.print_active_file(session);

        TurnOutcome::Executed(report)
    }

    fn preview(&self, plan: &Plan) {
        self.terminal.print(Tone::Heading, messages::PLAN_HEADING);
        for (index, action) in plan.actions.iter().enumerate() {
            self.terminal
                .print(Tone::Info, &messages::preview_line(index, action));
        }
    }

    fn print_active_file(&self, session: &SessionState) {
        if let Some(path) = &session.last_file {
            self.terminal.print(Tone::Muted, &messages::active_file(path));
        }
    }

    /// Runs one action. Returns the file it touched, if any.
    async fn execute(&self, action: &Action) -> Result<Option<String>> {
        match action {
            Action::WriteFile { path, content } => {
                self.service.write_file(path, content).await?;
                self.terminal
                    .print(Tone::Success, &messages::wrote_file(path, content.len()));
                Ok(Some(path.clone()))
            }
            Action::EditFile {
                path,
                find,
                replace,
            } => {
                let original = match self.service.read_file(path).await {
                    Some(file) => file.content,
                    None => {
                        debug!("{} is unreadable, editing from empty content", path);
                        String::new()
                    }
                };
                let updated = apply_edit(&original, find, replace);
                self.service.write_file(path, &updated).await?;
                self.terminal.print(
                    Tone::Success,
                    &messages::edited_file(path, updated != original),
                );
                Ok(Some(path.clone()))
            }
            Action::ReadFile { path } => {
                let file = self
                    .service
                    .read_file(path)
                    .await
                    .ok_or_else(|| anyhow!("could not read {}", path))?;
                let total = file.content.chars().count();
                let (shown, cut) = excerpt(&file.content, self.excerpt_chars);

                self.terminal
                    .print(Tone::Heading, &messages::read_file_heading(path, total));
                self.terminal.print(Tone::Plain, shown);
                if cut {
                    self.terminal.print(
                        Tone::Muted,
                        &messages::truncated(self.excerpt_chars, total),
                    );
                }
                Ok(Some(path.clone()))
            }
            Action::ListDirectory { path } => {
                let listing = self
                    .service
                    .list_directory(path)
                    .await
                    .ok_or_else(|| anyhow!("could not list {}", path))?;
                let pretty = serde_json::to_string_pretty(&listing)?;

                self.terminal
                    .print(Tone::Heading, &messages::listing_heading(path));
                self.terminal.print(Tone::Plain, &pretty);
                Ok(None)
            }
        }
    }
}

/// First `max_chars` characters of `text`, and whether anything was cut.
fn excerpt(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => (&text[..end], true),
        None => (text, false),
    }
}
