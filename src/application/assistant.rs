//! # Assistant
//!
//! One conversational turn end to end: prompt the model with the session's current
//! file, recover a plan from the reply and hand it to the execution engine.
//! Also drives the interactive read-eval loop.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::engine::{ExecutionEngine, TurnOutcome, TurnReport};
use crate::application::parsing::extract_plan;
use crate::domain::traits::{LlmProvider, Terminal, Tone};
use crate::domain::types::{SessionState, TurnConfiguration};
use crate::infrastructure::mcp::SharedCompanion;
use crate::strings::{messages, prompts};

pub struct Assistant {
    llm: Arc<dyn LlmProvider>,
    engine: ExecutionEngine,
    service: SharedCompanion,
    terminal: Arc<dyn Terminal>,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        engine: ExecutionEngine,
        service: SharedCompanion,
        terminal: Arc<dyn Terminal>,
    ) -> Self {
        Self {
            llm,
            engine,
            service,
            terminal,
        }
    }

    /// Handle one user request. Every failure is reported on the terminal.
    pub async fn handle(
        &self,
        request: &str,
        config: &TurnConfiguration,
        session: &mut SessionState,
    ) -> TurnOutcome {
        let prompt = prompts::turn_prompt(request, session.last_file.as_deref());

        let reply = match self
            .llm
            .completion(prompts::PLAN_SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("LLM request failed: {}", e);
                self.terminal.print(Tone::Error, &messages::llm_failed(&e));
                if !self.service.health().await {
                    self.terminal
                        .print(Tone::Warning, &messages::service_down_hint(config.port));
                }
                return TurnOutcome::LlmFailed(e);
            }
        };

        let plan = match extract_plan(&reply) {
            Ok(plan) => plan,
            Err(e) => {
                info!("No plan in model output: {}", e);
                self.terminal.print(Tone::Warning, messages::UNPARSED_HEADING);
                self.terminal.print(Tone::Plain, &reply);
                self.terminal
                    .print(Tone::Muted, &messages::unparsed_reason(&e.to_string()));
                return TurnOutcome::Unparsed;
            }
        };

        if plan.is_empty() {
            self.terminal.print(Tone::Info, messages::EMPTY_PLAN);
            if let Some(primary) = plan.primary_file {
                session.remember(primary);
            }
            return TurnOutcome::Executed(TurnReport {
                active_file: session.last_file.clone(),
                ..TurnReport::default()
            });
        }

        self.engine.run_turn(plan, config, session).await
    }

    /// Read requests until `exit`, `quit` or end of input.
    pub async fn run_interactive(&self, config: &TurnConfiguration, session: &mut SessionState) {
        self.terminal.print(Tone::Heading, messages::INTERACTIVE_BANNER);
        loop {
            let line = match self.terminal.read_line("raze") {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Input failed: {:#}", e);
                    break;
                }
            };

            let request = line.trim();
            if request.is_empty() {
                continue;
            }
            if matches!(request, "exit" | "quit") {
                break;
            }

            self.handle(request, config, session).await;
        }
        self.terminal.print(Tone::Muted, messages::GOODBYE);
    }
}
