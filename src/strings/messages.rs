//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.

use crate::domain::types::Action;

pub const PLAN_HEADING: &str = "Planned actions:";
pub const CONFIRM_APPLY: &str = "Apply these changes?";
pub const TURN_DECLINED: &str = "Cancelled. No changes were made.";
pub const DRY_RUN_NOTICE: &str = "Dry run: nothing was executed.";
pub const EMPTY_PLAN: &str = "The model returned an empty plan. Nothing to do.";
pub const UNPARSED_HEADING: &str = "Could not find an action plan in the model output. Raw reply:";
pub const INTERACTIVE_BANNER: &str = "raze interactive mode. Type `exit` to quit.";
pub const GOODBYE: &str = "Bye.";

pub fn preview_line(index: usize, action: &Action) -> String {
    format!("  {}. {} {}", index + 1, action.kind(), action.path())
}

pub fn service_unavailable(port: u16) -> String {
    format!(
        "Companion service is not reachable on port {port}.\n\
         Start it with `raze-mcp --port {port}` (or `raze mcp start --port {port}`) and retry."
    )
}

pub fn service_down_hint(port: u16) -> String {
    format!("Hint: the companion service on port {port} is also down. Run `raze mcp start --port {port}`.")
}

pub fn llm_failed(err: &str) -> String {
    format!("LLM request failed: {err}")
}

pub fn unparsed_reason(reason: &str) -> String {
    format!("({reason})")
}

pub fn wrote_file(path: &str, bytes: usize) -> String {
    format!("✔ wrote {path} ({bytes} bytes)")
}

pub fn edited_file(path: &str, changed: bool) -> String {
    if changed {
        format!("✔ edited {path}")
    } else {
        format!("✔ edited {path} (no match, content unchanged)")
    }
}

pub fn read_file_heading(path: &str, total_chars: usize) -> String {
    format!("── {path} ({total_chars} chars) ──")
}

pub fn truncated(shown: usize, total: usize) -> String {
    format!("… truncated, showing {shown} of {total} chars")
}

pub fn listing_heading(path: &str) -> String {
    format!("── {path} ──")
}

pub fn action_failed(index: usize, action: &Action, err: &str) -> String {
    format!("✘ {}. {} {} failed: {err}", index + 1, action.kind(), action.path())
}

pub fn turn_summary(succeeded: usize, failed: usize) -> String {
    if failed == 0 {
        format!("Done: {succeeded} action(s) applied.")
    } else {
        format!("Done: {succeeded} succeeded, {failed} failed.")
    }
}

pub fn active_file(path: &str) -> String {
    format!("Active file: {path}")
}

pub fn service_status(port: u16, healthy: bool) -> String {
    if healthy {
        format!("Companion service is running on port {port}.")
    } else {
        format!("Companion service is not running on port {port}.")
    }
}

pub fn command_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("[exit code: {code}]"),
        None => "[terminated by signal]".to_string(),
    }
}
