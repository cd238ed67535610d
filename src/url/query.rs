//! Query-string splitting.
//!
//! Every `key=value` pair lands in [`QueryArgs::qsd`]. Keys starting with one
//! of the dialect prefixes are additionally stored, prefix stripped and case
//! preserved, in the matching dialect map:
//!
//! | prefix        | map         | conventional meaning      |
//! |---------------|-------------|---------------------------|
//! | `+` (or ` `)  | `qsd_plus`  | outgoing transport header |
//! | `-`           | `qsd_minus` | outgoing GET parameter    |
//! | `:`           | `qsd_colon` | payload field override    |
//!
//! Values are stored exactly as they appeared (trimmed); callers unquote the
//! ones they use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::encoding::unquote;

/// The four query dialects of a URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryArgs {
    /// Every argument; last value wins on duplicate keys
    pub qsd: BTreeMap<String, String>,
    /// `+key=value` arguments
    pub qsd_plus: BTreeMap<String, String>,
    /// `-key=value` arguments
    pub qsd_minus: BTreeMap<String, String>,
    /// `:key=value` arguments
    pub qsd_colon: BTreeMap<String, String>,
}

impl QueryArgs {
    /// Unquoted value of a plain argument
    pub fn get(&self, key: &str) -> Option<String> {
        self.qsd.get(key).map(|v| unquote(v))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.qsd.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.qsd.is_empty()
    }
}

/// Decodes a query key. The first character is kept verbatim so a literal
/// `+` prefix survives; any later `+` is form-decoded to a space.
fn decode_key(raw: &str) -> String {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let rest: String = chars.as_str().replace('+', " ");
    unquote(&format!("{first}{rest}"))
}

/// Splits a query string (without the leading `?`) into its dialect maps.
///
/// Pairs are separated by `&` or `;`; a key without `=` gets an empty value.
/// With `plus_to_space` every `+` in a value becomes a space first. With
/// `sanitize` the `qsd` keys are lowercased and trimmed.
pub fn parse_qsd(qs: &str, plus_to_space: bool, sanitize: bool) -> QueryArgs {
    let mut result = QueryArgs::default();

    for pair in qs.split(['&', ';']).filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));

        let key = decode_key(raw_key);
        if key.trim().is_empty() {
            continue;
        }

        let value = if plus_to_space {
            raw_value.replace('+', " ")
        } else {
            raw_value.to_string()
        };
        let value = value.trim().to_string();

        let qsd_key = if sanitize {
            key.trim().to_lowercase()
        } else {
            key.clone()
        };
        result.qsd.insert(qsd_key, value.clone());

        if let Some(stripped) = key.strip_prefix(['+', ' ']) {
            result.qsd_plus.insert(stripped.to_string(), value.clone());
        }
        if let Some(stripped) = key.strip_prefix('-') {
            result.qsd_minus.insert(stripped.to_string(), value.clone());
        }
        if let Some(stripped) = key.strip_prefix(':') {
            result.qsd_colon.insert(stripped.to_string(), value);
        }
    }

    result
}
