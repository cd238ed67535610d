use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use regex::Regex;
use tracing::error;

/// Default pattern: the first run of non-whitespace
pub const DEFAULT_PATTERN: &str = r"[^\s]+";

/// Compiled patterns, keyed by the source pattern
static REGEX_CACHE: LazyLock<RwLock<HashMap<String, Regex>>> = LazyLock::new(|| RwLock::new(HashMap::new()));

fn cached_regex(pattern: &str) -> Option<Regex> {
    if let Some(regex) = REGEX_CACHE.read().ok().and_then(|cache| cache.get(pattern).cloned()) {
        return Some(regex);
    }

    // Anchored at the start and case-insensitive, like a `match` lookup
    let regex = match Regex::new(&format!("(?i)^(?:{pattern})")) {
        Ok(regex) => regex,
        Err(e) => {
            error!(pattern = %pattern, error = %e, "Invalid validation pattern");
            return None;
        }
    };

    if let Ok(mut cache) = REGEX_CACHE.write() {
        cache.insert(pattern.to_string(), regex.clone());
    }
    Some(regex)
}

/// Validates `value` against `pattern` (anchored at the start,
/// case-insensitive), compiling the pattern once per process.
///
/// On a match the value is returned, trimmed when `strip` is set. When `fmt`
/// is given, `{name}` placeholders in it are replaced by the named capture
/// groups and that string is returned instead.
pub fn validate_regex(value: &str, pattern: &str, strip: bool, fmt: Option<&str>) -> Option<String> {
    let regex = cached_regex(pattern)?;
    let caps = regex.captures(value)?;

    let result = match fmt {
        Some(fmt) => regex
            .capture_names()
            .flatten()
            .fold(fmt.to_string(), |acc, name| {
                let group = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                acc.replace(&format!("{{{name}}}"), group)
            }),
        None => value.to_string(),
    };

    Some(if strip { result.trim().to_string() } else { result })
}
