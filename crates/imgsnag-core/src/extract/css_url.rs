//! Tolerant `url(...)` token matching for computed background values.

use regex::Regex;
use std::sync::OnceLock;

fn url_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)]*?))\s*\)"#)
            .expect("url() token pattern is valid")
    })
}

/// Returns the inner value of every `url(...)` token in `value`, in order.
///
/// Handles double-quoted, single-quoted and unquoted forms, so layered
/// values like `linear-gradient(...), url("a.png")` yield just `a.png`.
/// Empty tokens are skipped.
pub fn css_url_tokens(value: &str) -> Vec<String> {
    url_token_regex()
        .captures_iter(value)
        .filter_map(|caps| {
            let inner = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))?
                .as_str()
                .trim();
            let inner = inner.trim_matches(|c| c == '"' || c == '\'');
            (!inner.is_empty()).then(|| inner.to_string())
        })
        .collect()
}
