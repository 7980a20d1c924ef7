//! # Parsing Utils
//!
//! Extracts the JSON action plan from raw LLM output. Models are told to answer with a
//! single JSON object but routinely wrap it in markdown fences or prose. Exactly one
//! candidate is taken: the first `json` (or untagged) fenced block, otherwise the
//! object opened by the first `{`. If that candidate is not a well-formed plan the
//! parse fails. Malformed JSON is never repaired and nothing else is tried.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::errors::ParseFailure;
use crate::domain::types::Plan;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
    })
}

/// Extract a plan from model output.
pub fn extract_plan(raw: &str) -> Result<Plan, ParseFailure> {
    let candidate = candidate(raw).ok_or(ParseFailure::NoCandidate)?;
    parse_candidate(candidate).inspect_err(|failure| {
        tracing::debug!("Rejected plan candidate: {}", failure);
    })
}

/// The single JSON candidate in `raw`, if any.
fn candidate(raw: &str) -> Option<&str> {
    if let Some(inner) = fenced_block(raw) {
        return Some(inner);
    }

    let start = raw.find('{')?;
    matching_brace(raw, start).map(|end| &raw[start..=end])
}

/// Inner text of the first fence tagged `json` or not tagged at all.
/// Fences in other languages (```html, ```rust, ...) are skipped.
fn fenced_block(raw: &str) -> Option<&str> {
    fence_regex()
        .captures_iter(raw)
        .find(|caps| {
            let tag = &caps[1];
            tag.is_empty() || tag.eq_ignore_ascii_case("json")
        })
        .and_then(|caps| caps.get(2))
        .map(|inner| inner.as_str().trim())
        .filter(|inner| !inner.is_empty())
}

/// Byte index of the `}` closing the `{` at `start`, ignoring braces inside strings.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_candidate(candidate: &str) -> Result<Plan, ParseFailure> {
    let value: serde_json::Value = serde_json::from_str(candidate)
        .map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;

    match value.get("actions") {
        Some(serde_json::Value::Array(_)) => {}
        _ => return Err(ParseFailure::MissingActions),
    }

    serde_json::from_value(value).map_err(|e| ParseFailure::InvalidAction(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Action;

    fn sample_plan() -> Plan {
        Plan {
            actions: vec![
                Action::WriteFile {
                    path: "./a.txt".into(),
                    content: "fn main() { println!(\"}\"); }".into(),
                },
                Action::EditFile {
                    path: "./index.html".into(),
                    find: "/red/g".into(),
                    replace: "blue".into(),
                },
            ],
            primary_file: Some("./index.html".into()),
        }
    }

    #[test]
    fn test_bare_json() {
        let json = r#"{"actions":[{"action":"write_file","path":"./a.txt","content":"hi"}]}"#;
        let plan = extract_plan(json).unwrap();
        assert_eq!(
            plan.actions,
            vec![Action::WriteFile {
                path: "./a.txt".into(),
                content: "hi".into()
            }]
        );
        assert!(plan.primary_file.is_none());
    }

    #[test]
    fn test_prose_around_json() {
        let plan = sample_plan();
        let json = serde_json::to_string(&plan).unwrap();
        let raw = format!("Sure! Here is the plan:\n{json}\nLet me know if you need more.");
        assert_eq!(extract_plan(&raw).unwrap(), plan);
    }

    #[test]
    fn test_fenced_json() {
        let plan = sample_plan();
        let json = serde_json::to_string_pretty(&plan).unwrap();

        let tagged = format!("Here you go:\n```json\n{json}\n```\nDone.");
        assert_eq!(extract_plan(&tagged).unwrap(), plan);

        let untagged = format!("```\n{json}\n```");
        assert_eq!(extract_plan(&untagged).unwrap(), plan);

        let upper = format!("```JSON\n{json}\n```");
        assert_eq!(extract_plan(&upper).unwrap(), plan);
    }

    #[test]
    fn test_non_json_fence_is_skipped() {
        let raw = "Example markup:\n```html\n<p>hello</p>\n```\nPlan: {\"actions\":[{\"action\":\"read_file\",\"path\":\"./x\"}]}";
        let plan = extract_plan(raw).unwrap();
        assert_eq!(plan.actions, vec![Action::ReadFile { path: "./x".into() }]);
    }

    #[test]
    fn test_braces_in_prose_before_plan_fail() {
        let raw = "Use {curly} carefully. {\"actions\":[{\"action\":\"list_directory\",\"path\":\"src\"}]}";
        assert!(matches!(
            extract_plan(raw),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn test_nested_plan_is_not_lifted_out() {
        let wrapped = r#"{"response": {"actions":[{"action":"write_file","path":"./x","content":"pwn"}]}}"#;
        assert_eq!(extract_plan(wrapped), Err(ParseFailure::MissingActions));

        let malformed = r#"{"thought":"ok","plan":{"actions":[{"action":"write_file","path":"./x","content":"pwn"}]},}"#;
        assert!(matches!(
            extract_plan(malformed),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn test_broken_fence_does_not_fall_back_to_prose_json() {
        let raw = "```json\n{\"actions\": [\n```\nOr maybe: {\"actions\":[{\"action\":\"read_file\",\"path\":\"./x\"}]}";
        assert!(matches!(
            extract_plan(raw),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn test_unclosed_braces_fail_fast() {
        let started = std::time::Instant::now();
        assert_eq!(
            extract_plan(&"{".repeat(100_000)),
            Err(ParseFailure::NoCandidate)
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_no_json_at_all() {
        assert_eq!(
            extract_plan("I could not understand that request."),
            Err(ParseFailure::NoCandidate)
        );
        assert_eq!(extract_plan(""), Err(ParseFailure::NoCandidate));
    }

    #[test]
    fn test_broken_json_is_a_failure() {
        let raw = "```json\n{\"actions\": [{\"action\": \"write_file\", \"path\": }\n```";
        assert!(matches!(
            extract_plan(raw),
            Err(ParseFailure::InvalidJson(_))
        ));

        assert!(extract_plan("{{{{").is_err());
        assert!(extract_plan("}{").is_err());
        assert!(extract_plan("{\"actions\": [").is_err());
    }

    #[test]
    fn test_missing_actions() {
        assert_eq!(
            extract_plan(r#"{"steps":[]}"#),
            Err(ParseFailure::MissingActions)
        );
        assert_eq!(
            extract_plan(r#"{"actions":"write everything"}"#),
            Err(ParseFailure::MissingActions)
        );
    }

    #[test]
    fn test_unknown_action_rejects_plan() {
        let raw = r#"{"actions":[{"action":"write_file","path":"a","content":""},{"action":"rm","path":"/"}]}"#;
        assert!(matches!(
            extract_plan(raw),
            Err(ParseFailure::InvalidAction(_))
        ));
    }

    #[test]
    fn test_matching_brace_ignores_strings() {
        let text = r#"{"a":"}{","b":{"c":"\"}"}} tail"#;
        let end = matching_brace(text, 0).unwrap();
        assert_eq!(&text[..=end], r#"{"a":"}{","b":{"c":"\"}"}}"#);
        assert_eq!(matching_brace("{ unclosed", 0), None);
    }
}
