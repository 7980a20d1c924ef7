//! # Edit Resolver
//!
//! Applies a model-supplied find/replace to file content. `find` is either a literal
//! substring or a `/pattern/flags` regex literal.

use regex::RegexBuilder;
use std::sync::OnceLock;

fn regex_literal() -> &'static regex::Regex {
    static LITERAL: OnceLock<regex::Regex> = OnceLock::new();
    LITERAL.get_or_init(|| {
        regex::Regex::new(r"(?s)^/(.+)/([gimsuy]*)$").expect("regex literal pattern is valid")
    })
}

/// Replace the first occurrence of `find` in `original` (every match with the `g` flag).
pub fn apply_edit(original: &str, find: &str, replace: &str) -> String {
    if find.is_empty() {
        return original.to_string();
    }

    if let Some(caps) = regex_literal().captures(find) {
        let pattern = &caps[1];
        let flags = &caps[2];

        match RegexBuilder::new(pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
        {
            Ok(re) => {
                let limit = if flags.contains('g') { 0 } else { 1 };
                return re.replacen(original, limit, replace).into_owned();
            }
            Err(e) => {
                tracing::warn!("Edit pattern {} failed to compile, using literal match: {}", find, e);
            }
        }
    }

    original.replacen(find, replace, 1)
}
