//! List and boolean coercion helpers used when turning URL fragments into
//! handler arguments.

use std::collections::HashSet;

use crate::url::unquote;

/// Anything that can be fed to [`parse_list`] or [`parse_values`]: a string,
/// or a collection of them (collections are flattened entry by entry).
pub trait ListInput {
    /// The raw, not yet split, string entries
    fn raw_items(&self) -> Vec<&str>;
}

impl ListInput for str {
    fn raw_items(&self) -> Vec<&str> {
        vec![self]
    }
}

impl ListInput for String {
    fn raw_items(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<T: ListInput + ?Sized> ListInput for &T {
    fn raw_items(&self) -> Vec<&str> {
        (**self).raw_items()
    }
}

impl<T: ListInput> ListInput for [T] {
    fn raw_items(&self) -> Vec<&str> {
        self.iter().flat_map(|item| item.raw_items()).collect()
    }
}

impl<T: ListInput, const N: usize> ListInput for [T; N] {
    fn raw_items(&self) -> Vec<&str> {
        self.as_slice().raw_items()
    }
}

impl<T: ListInput> ListInput for Vec<T> {
    fn raw_items(&self) -> Vec<&str> {
        self.as_slice().raw_items()
    }
}

impl<T: ListInput> ListInput for Option<T> {
    fn raw_items(&self) -> Vec<&str> {
        self.as_ref().map(|item| item.raw_items()).unwrap_or_default()
    }
}

fn is_list_delimiter(c: char, allow_whitespace: bool) -> bool {
    matches!(c, ',' | '\\' | '/' | '\r' | '\n') || (allow_whitespace && matches!(c, ' ' | '\t'))
}

fn is_value_delimiter(c: char, allow_whitespace: bool) -> bool {
    matches!(c, '[' | ']' | ';' | ',') || (allow_whitespace && c.is_whitespace())
}

/// Splits every entry on `delimiter`, trims, drops empties and keeps the
/// first occurrence of each value.
fn ordered_unique<I, F>(content: &I, delimiter: F) -> Vec<String>
where
    I: ListInput + ?Sized,
    F: Fn(char) -> bool,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for item in content.raw_items() {
        for entry in item.split(&delimiter).map(str::trim).filter(|s| !s.is_empty()) {
            if seen.insert(entry) {
                result.push(entry.to_string());
            }
        }
    }

    result
}

/// Breaks delimited content into an ordered list of unique entries.
///
/// Delimiters are runs of commas, slashes, backslashes and line breaks, plus
/// spaces and tabs unless `allow_whitespace` is false. The first occurrence
/// of a duplicate wins.
pub fn parse_list<I: ListInput + ?Sized>(content: &I, allow_whitespace: bool) -> Vec<String> {
    ordered_unique(content, |c| is_list_delimiter(c, allow_whitespace))
}

/// Like [`parse_list`] but for values that may contain `/` themselves, such
/// as MQTT topics. Delimiters are `[`, `]`, `;`, `,` and (optionally)
/// whitespace.
pub fn parse_values<I: ListInput + ?Sized>(content: &I, allow_whitespace: bool) -> Vec<String> {
    ordered_unique(content, |c| is_value_delimiter(c, allow_whitespace))
}

/// Splits a URL path into its elements.
///
/// Leading slashes are ignored, empty elements dropped and duplicates kept.
/// With `decode` each element is percent-decoded.
pub fn split_path(path: &str, decode: bool) -> Vec<String> {
    path.trim_start_matches('/')
        .split(|c| is_list_delimiter(c, true))
        .filter(|s| !s.is_empty())
        .map(|s| if decode { unquote(s) } else { s.to_string() })
        .collect()
}

const TRUTHY: [&str; 8] = ["yes", "true", "enable", "enabled", "1", "+", "on", "active"];
const FALSY: [&str; 8] = ["no", "false", "disable", "disabled", "0", "-", "off", "inactive"];

/// Interprets a textual flag; anything unrecognised yields `default`.
pub fn parse_bool(value: &str, default: bool) -> bool {
    let value = value.trim().to_ascii_lowercase();
    if TRUTHY.contains(&value.as_str()) {
        true
    } else if FALSY.contains(&value.as_str()) {
        false
    } else {
        default
    }
}
