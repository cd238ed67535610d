//! Percent-encoding wrappers.
//!
//! `quote` follows the usual URL-quoting contract: ASCII alphanumerics and
//! `_.-~` are never encoded, everything else is encoded unless it appears in
//! the caller's `safe` set. `unquote` never fails.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters that are never encoded
const ALWAYS_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Percent-encodes `content`, leaving the characters in `safe` untouched.
pub fn quote(content: &str, safe: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut quoted = String::with_capacity(content.len());
    let mut buf = [0u8; 4];
    for ch in content.chars() {
        if ch.is_ascii() && safe.contains(ch) {
            quoted.push(ch);
        } else {
            quoted.extend(utf8_percent_encode(ch.encode_utf8(&mut buf), ALWAYS_SAFE));
        }
    }

    quoted
}

/// Decodes `%xx` escapes.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced with
/// U+FFFD, so the call cannot fail.
pub fn unquote(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    percent_decode_str(content).decode_utf8_lossy().into_owned()
}

/// Renders `key=value` pairs joined by `&`.
///
/// Keys and values are quoted with an empty safe set. Pairs with a `None`
/// value are skipped; pass an empty string to keep an empty value.
pub fn urlencode<I, K, V>(query: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    query
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| format!("{}={}", quote(k.as_ref(), ""), quote(v.as_ref(), ""))))
        .collect::<Vec<_>>()
        .join("&")
}
