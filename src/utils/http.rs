use std::collections::HashMap;

/// Built-in phrases for the status codes most services share
const RESPONSE_CODES: [(u16, &str); 6] = [
    (400, "Bad Request - Unsupported Parameters."),
    (401, "Verification Failed."),
    (404, "Page not found."),
    (405, "Method not allowed."),
    (500, "Internal server error."),
    (503, "Servers are overloaded."),
];

/// Human readable phrase for an HTTP status code.
///
/// `overrides` extends or replaces the built-in table for this call only.
/// Unknown codes yield an empty string.
pub fn http_response_code_lookup(code: u16, overrides: Option<&HashMap<u16, &str>>) -> String {
    if let Some(phrase) = overrides.and_then(|map| map.get(&code)) {
        return (*phrase).to_string();
    }

    RESPONSE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, phrase)| (*phrase).to_string())
        .unwrap_or_default()
}

/// Escapes text for embedding in HTML.
///
/// With `whitespace`, tabs and spaces become `&emsp;` and `&nbsp;`; with
/// `convert_new_lines`, `\n` becomes `<br/>`.
pub fn escape_html(text: &str, convert_new_lines: bool, whitespace: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' if whitespace => escaped.push_str("&emsp;"),
            ' ' if whitespace => escaped.push_str("&nbsp;"),
            '\n' if convert_new_lines => escaped.push_str("<br/>"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    escape_html(text, false, false)
}
