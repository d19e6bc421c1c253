//! Input sanitization for environment names and prompt answers.
//!
//! Sanitized values end up inside quoted HCL strings and filesystem paths,
//! so none of the variants below ever keep quotes, `$`, braces or whitespace.

use std::sync::OnceLock;

use regex::Regex;

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).unwrap())
}

/// Keep only word characters and hyphens, with surrounding whitespace removed.
///
/// An empty result is returned as-is; callers fall back to their default.
pub fn sanitize_input(value: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    pattern(&UNSAFE, r"[^\w\-]")
        .replace_all(value.trim(), "")
        .into_owned()
}

/// Like [`sanitize_input`], additionally keeping dots (`example-dev.com`).
pub fn sanitize_dns_name(value: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    pattern(&UNSAFE, r"[^\w\-.]")
        .replace_all(value.trim(), "")
        .into_owned()
}

/// Like [`sanitize_input`], additionally keeping `.`, `/` and `~`.
pub fn sanitize_path(value: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    pattern(&UNSAFE, r"[^\w\-./~]")
        .replace_all(value.trim(), "")
        .into_owned()
}

/// Whether `value` is non-empty and made only of ASCII alphanumerics, `-` and `_`.
pub fn is_safe_name(value: &str) -> bool {
    static SAFE: OnceLock<Regex> = OnceLock::new();
    pattern(&SAFE, r"^[A-Za-z0-9_-]+$").is_match(value)
}
