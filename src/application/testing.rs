//! In-memory doubles for the engine's collaborators.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::errors::ServiceError;
use crate::domain::traits::{CompanionService, LlmProvider, Terminal, Tone};
use crate::domain::types::{CommandOutput, FileContent};

/// Companion service backed by a map, recording every write.
pub struct FakeCompanion {
    files: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    failing_writes: HashSet<String>,
    healthy: AtomicBool,
    reads: AtomicUsize,
    health_probes: AtomicUsize,
}

impl FakeCompanion {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            failing_writes: HashSet::new(),
            healthy: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
            health_probes: AtomicUsize::new(0),
        }
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn failing_write(mut self, path: &str) -> Self {
        self.failing_writes.insert(path.to_string());
        self
    }

    pub fn down(self) -> Self {
        self.healthy.store(false, Ordering::SeqCst);
        self
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn health_probes(&self) -> usize {
        self.health_probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanionService for FakeCompanion {
    async fn read_file(&self, path: &str) -> Option<FileContent> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|content| FileContent {
                content: content.clone(),
            })
    }

    async fn write_file(
        &self,
        path: &str,
        content: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_string(), content.to_string()));
        if self.failing_writes.contains(path) {
            return Err(ServiceError::Status {
                status: 500,
                body: "disk full".into(),
            });
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(serde_json::json!({"ok": true}))
    }

    async fn list_directory(&self, path: &str) -> Option<serde_json::Value> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<&String> = files.keys().collect();
        names.sort();
        Some(serde_json::json!({"path": path, "entries": names}))
    }

    async fn execute_command(
        &self,
        command: &str,
        _cwd: Option<&str>,
    ) -> Result<CommandOutput, ServiceError> {
        Ok(CommandOutput {
            stdout: command.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    async fn health(&self) -> bool {
        self.health_probes.fetch_add(1, Ordering::SeqCst);
        self.healthy.load(Ordering::SeqCst)
    }

    fn port(&self) -> u16 {
        7878
    }
}

/// Terminal that records output and replays scripted answers.
pub struct RecordingTerminal {
    lines: Mutex<Vec<(Tone, String)>>,
    answer: Option<bool>,
    inputs: Mutex<VecDeque<String>>,
    questions: AtomicUsize,
}

impl RecordingTerminal {
    /// `answer` is the reply to every confirmation; `None` makes confirmation fail.
    pub fn new(answer: Option<bool>) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            answer,
            inputs: Mutex::new(VecDeque::new()),
            questions: AtomicUsize::new(0),
        }
    }

    pub fn with_inputs(self, inputs: &[&str]) -> Self {
        self.inputs
            .lock()
            .unwrap()
            .extend(inputs.iter().map(|s| s.to_string()));
        self
    }

    pub fn output(&self) -> String {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn lines_with(&self, tone: Tone) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn questions(&self) -> usize {
        self.questions.load(Ordering::SeqCst)
    }
}

impl Terminal for RecordingTerminal {
    fn print(&self, tone: Tone, text: &str) {
        self.lines.lock().unwrap().push((tone, text.to_string()));
    }

    fn confirm(&self, _question: &str, _default: bool) -> anyhow::Result<bool> {
        self.questions.fetch_add(1, Ordering::SeqCst);
        self.answer
            .ok_or_else(|| anyhow::anyhow!("not a terminal"))
    }

    fn read_line(&self, _prompt: &str) -> anyhow::Result<Option<String>> {
        Ok(self.inputs.lock().unwrap().pop_front())
    }
}

/// LLM that replies with canned text (or an error) and records prompts.
pub struct ScriptedLlm {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: &str) -> Self {
        Self {
            reply: Err(err.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn completion(&self, _system: &str, prompt: &str) -> Result<String, String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}
