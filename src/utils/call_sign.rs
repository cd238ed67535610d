use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::parse::{ListInput, parse_values};

static IS_CALL_SIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<callsign>[a-z0-9]{2,3}[0-9][a-z]{1,3})(?:-(?P<ssid>[a-z0-9]{1,2}))?\s*$")
        .expect("Failed to compile call sign regex")
});

/// An amateur-radio call sign, uppercased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSign {
    pub callsign: String,
    /// Secondary station identifier, without the leading `-`
    pub ssid: Option<String>,
}

impl fmt::Display for CallSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ssid {
            Some(ssid) => write!(f, "{}-{}", self.callsign, ssid),
            None => f.write_str(&self.callsign),
        }
    }
}

pub fn is_call_sign(text: &str) -> Option<CallSign> {
    let caps = IS_CALL_SIGN.captures(text.trim_start())?;

    Some(CallSign {
        callsign: caps["callsign"].to_uppercase(),
        ssid: caps.name("ssid").map(|m| m.as_str().to_uppercase()),
    })
}

/// Extracts every valid call sign from delimited content, in order and
/// without duplicates. Invalid entries are logged and skipped.
pub fn parse_call_sign<I: ListInput + ?Sized>(content: &I) -> Vec<CallSign> {
    let mut result: Vec<CallSign> = Vec::new();

    for entry in parse_values(content, true) {
        match is_call_sign(&entry) {
            Some(sign) if !result.contains(&sign) => result.push(sign),
            Some(_) => {}
            None => warn!("Dropped invalid call sign ({})", entry),
        }
    }

    result
}
