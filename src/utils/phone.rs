use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::parse::ListInput;

/// Shortest number accepted by default
pub const PHONE_MIN_LEN: usize = 10;

/// Longest number (in digits) accepted
pub const PHONE_MAX_LEN: usize = 14;

static IS_PHONE_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s)(+-]+\s*$").expect("Failed to compile phone number regex"));

/// A phone number broken into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub country: String,
    pub area: String,
    /// Last seven digits
    pub line: String,
    /// Every digit, no markup
    pub full: String,
    pub pretty: String,
}

/// Checks that `text` looks like a phone number of `min_len` to 14 digits and
/// breaks it apart.
pub fn is_phone_no(text: &str, min_len: usize) -> Option<PhoneNumber> {
    if !IS_PHONE_NO.is_match(text) {
        return None;
    }

    let full: String = text.chars().filter(char::is_ascii_digit).collect();
    if full.len() > PHONE_MAX_LEN || full.len() < min_len {
        return None;
    }

    // All ASCII digits from here, byte slicing is safe
    let split = full.len().saturating_sub(7);
    let (rest, line) = full.split_at(split);
    let split = rest.len().saturating_sub(3);
    let (country, area) = rest.split_at(split);

    let mut pretty = String::new();
    if !country.is_empty() {
        pretty.push_str(&format!("+{country} "));
    }
    if !area.is_empty() {
        pretty.push_str(&format!("{area}-"));
    }
    if line.len() >= 7 {
        pretty.push_str(&format!("{}-{}", &line[..3], &line[3..]));
    } else {
        pretty.push_str(line);
    }

    Some(PhoneNumber {
        country: country.to_string(),
        area: area.to_string(),
        line: line.to_string(),
        full: full.clone(),
        pretty,
    })
}

/// Groups whitespace separated tokens of one chunk into phone number
/// candidates. A candidate closes once it holds `min_len` digits.
fn candidates(chunk: &str, min_len: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut digits = 0;

    for token in chunk.split_whitespace() {
        if digits >= min_len {
            result.push(std::mem::take(&mut current));
            digits = 0;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(token);
        digits += token.chars().filter(char::is_ascii_digit).count();
    }

    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Extracts normalised phone numbers (digits, with a leading `+` kept) from
/// delimited content. Entries with too few digits are dropped with a warning.
pub fn parse_phone_no<I: ListInput + ?Sized>(content: &I) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for item in content.raw_items() {
        for chunk in item.split([',', ';', '[', ']']) {
            for candidate in candidates(chunk, PHONE_MIN_LEN) {
                let Some(phone) = is_phone_no(&candidate, PHONE_MIN_LEN) else {
                    warn!("Dropped invalid phone number ({})", candidate);
                    continue;
                };

                let normalised = if candidate.trim_start().starts_with('+') {
                    format!("+{}", phone.full)
                } else {
                    phone.full
                };

                if !result.contains(&normalised) {
                    result.push(normalised);
                }
            }
        }
    }

    result
}
