//! Base-name and folder-name sanitization.

/// Used when a base name sanitizes to nothing.
pub const DEFAULT_BASE_NAME: &str = "file";

/// Longest folder name accepted, in characters.
const FOLDER_NAME_MAX: usize = 100;

/// Longest base name kept, in characters. Leaves room under NAME_MAX for
/// `-N.ext`, a ` (N)` uniquifier and the `.<id>.part` temp suffix.
const BASE_NAME_MAX: usize = 100;

fn is_reserved(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

fn replace_reserved(s: &str) -> String {
    s.chars()
        .map(|c| if is_reserved(c) { '-' } else { c })
        .collect()
}

/// Sanitizes the per-batch base name used in `base-N.ext`.
///
/// Trims surrounding whitespace, replaces `\ / : * ? " < > |` with `-` and
/// truncates to 100 characters. An empty result falls back to
/// [`DEFAULT_BASE_NAME`].
pub fn sanitize_base_name(raw: &str) -> String {
    let replaced = replace_reserved(raw.trim());
    let safe: String = replaced.chars().take(BASE_NAME_MAX).collect();
    let safe = safe.trim_end().to_string();
    if safe.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        safe
    }
}

/// Sanitizes a subfolder name. Returns an empty string for "no subfolder".
///
/// - Trims, then replaces reserved characters with `-`
/// - Collapses any run of `.` to a single `.` (so `a..b` becomes `a.b`)
/// - Collapses whitespace runs to one space
/// - Strips leading/trailing dots; `.` and `..` become empty
/// - Truncates to 100 characters
pub fn sanitize_folder_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut collapsed = String::with_capacity(trimmed.len());
    let mut prev_dot = false;
    let mut prev_space = false;
    for c in replace_reserved(trimmed).chars() {
        if c == '.' {
            if !prev_dot {
                collapsed.push('.');
            }
            prev_dot = true;
            prev_space = false;
        } else if c.is_whitespace() {
            if !prev_space {
                collapsed.push(' ');
            }
            prev_space = true;
            prev_dot = false;
        } else {
            collapsed.push(c);
            prev_dot = false;
            prev_space = false;
        }
    }

    let stripped = collapsed.trim_matches('.');
    if stripped == "." || stripped == ".." {
        return String::new();
    }
    stripped.chars().take(FOLDER_NAME_MAX).collect()
}
