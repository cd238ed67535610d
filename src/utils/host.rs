use std::net::{Ipv4Addr, Ipv6Addr};

/// Validates an IP address.
///
/// IPv4 comes back as given; IPv6 (optionally bracketed, `fe80::` zone ids
/// allowed) comes back wrapped in `[]` as needed for URLs.
pub fn is_ipaddr(addr: &str, ipv4: bool, ipv6: bool) -> Option<String> {
    if ipv4 && addr.parse::<Ipv4Addr>().is_ok() {
        return Some(addr.to_string());
    }

    if ipv6 {
        let inner = addr
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(addr);

        let (ip, zone) = match inner.split_once('%') {
            Some((ip, zone)) => (ip, Some(zone)),
            None => (inner, None),
        };

        let parsed = ip.parse::<Ipv6Addr>().ok()?;
        if let Some(zone) = zone {
            let link_local = parsed.segments()[0] & 0xffc0 == 0xfe80;
            if !link_local || zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
        }

        return Some(format!("[{inner}]"));
    }

    None
}

fn is_label(label: &str, underscore: bool) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || (underscore && c == '_');

    match label.len() {
        0 => false,
        // Single character labels must be a letter
        1 => label.chars().all(|c| c.is_ascii_alphabetic()),
        len if len > 63 => false,
        _ => {
            let first_ok = label.starts_with(|c: char| c.is_ascii_alphanumeric());
            let last_ok = !label.ends_with(['-', '_']);
            first_ok && last_ok && label.chars().all(allowed)
        }
    }
}

/// Validates a hostname (RFC 1123 labels, optionally with underscores) or
/// falls back to IP address validation.
///
/// Returns the hostname without a trailing `.`, or the normalised IP.
pub fn is_hostname(hostname: &str, ipv4: bool, ipv6: bool, underscore: bool) -> Option<String> {
    if hostname.is_empty() || hostname.len() > 253 {
        return None;
    }

    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    let labels: Vec<&str> = hostname.split('.').collect();

    if labels.len() == 4 && hostname.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return is_ipaddr(hostname, ipv4, false);
    }

    if !labels.iter().all(|label| is_label(label, underscore)) {
        return is_ipaddr(hostname, ipv4, ipv6);
    }

    Some(hostname.to_string())
}
