//! The URL grammar.
//!
//! ```text
//! schema://[user[:password]@]host[:port][/path][?query]
//! ```
//!
//! This is deliberately not an RFC 3986 parser: the schema may be followed
//! by any run of `/` or `\`, credentials may contain raw `@` (the last one
//! delimits the host) and the query string carries the dialects described in
//! [`super::query`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::assembly::{UrlParts, url_assembly};
use super::encoding::unquote;
use super::query::{QueryArgs, parse_qsd};
use crate::utils::is_hostname;

/// Switches accepted by [`parse_url`] and [`super::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Require a valid hostname or IP address
    pub verify_host: bool,
    /// Treat `+` in query values as an encoded space
    pub plus_to_space: bool,
    /// Fail the parse on an unusable port instead of dropping it
    pub strict_port: bool,
    /// Lowercase and trim query keys
    pub sanitize: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            verify_host: true,
            plus_to_space: false,
            strict_port: false,
            sanitize: true,
        }
    }
}

impl ParseOptions {
    /// Options for handlers addressed by path only (no host)
    pub fn without_host() -> Self {
        Self {
            verify_host: false,
            ..Self::default()
        }
    }
}

/// A URL broken apart by the grammar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedUrl {
    /// Lowercased scheme token
    pub schema: String,
    /// Cleaned-up re-assembly of the positional parts
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Always starts with `/`; a trailing slash is preserved
    pub fullpath: String,
    /// Directory part of `fullpath`, ending in `/`
    pub path: String,
    /// Last segment of `fullpath`, if any
    pub query: Option<String>,
    pub args: QueryArgs,
    /// True when the schema ends in `s`
    pub secure: bool,
    /// Certificate verification, on unless `verify=` says otherwise
    pub verify: bool,
    /// Raw socket read timeout from `rto=`
    pub rto: Option<String>,
    /// Raw socket connect timeout from `cto=`
    pub cto: Option<String>,
}

/// Splits `schema:` followed by one or more `/` or `\` off the front.
fn split_schema(url: &str) -> Option<(String, &str)> {
    let (schema, rest) = url.split_once(':')?;
    if schema.is_empty() || schema.chars().any(char::is_whitespace) {
        return None;
    }

    let remainder = rest.trim_start_matches(['/', '\\']);
    if remainder.len() == rest.len() {
        return None;
    }

    Some((schema.trim().to_lowercase(), remainder))
}

/// Collapses runs of `/` and guarantees a leading one.
fn tidy_fullpath(path: &str) -> String {
    let mut result = String::from("/");
    for c in path.chars() {
        if c == '/' && result.ends_with('/') {
            continue;
        }
        result.push(c);
    }
    result
}

enum PortResult {
    Absent,
    Valid(u16),
    Invalid(String),
}

/// Separates `host:port`, honouring bracketed IPv6 hosts.
fn split_port(netloc: &str) -> (&str, PortResult) {
    let split = if netloc.starts_with('[') {
        netloc
            .find("]:")
            .map(|idx| (&netloc[..=idx], &netloc[idx + 2..]))
    } else {
        netloc.split_once(':').filter(|(_, port)| !port.contains(':'))
    };

    match split {
        None => (netloc, PortResult::Absent),
        Some((host, port)) => {
            let port = port.trim();
            match port.parse::<u16>() {
                Ok(p) if p > 0 => (host, PortResult::Valid(p)),
                _ => (host, PortResult::Invalid(port.to_string())),
            }
        }
    }
}

/// Runs the raw grammar over `url`.
///
/// Returns `None` when no schema is present, when `verify_host` is set and no
/// valid host was found, or when `strict_port` is set and the port is
/// unusable. Positional parts come back percent-decoded.
pub fn parse_url(url: &str, options: &ParseOptions) -> Option<ParsedUrl> {
    let (schema, remainder) = split_schema(url.trim())?;

    let (location, qs) = match remainder.split_once('?') {
        Some((location, qs)) => (location.trim(), Some(qs.trim())),
        None => (remainder.trim(), None),
    };

    let args = qs
        .map(|qs| parse_qsd(qs, options.plus_to_space, options.sanitize))
        .unwrap_or_default();

    let (netloc, raw_path) = match location.find(['/', '\\']) {
        Some(idx) => (&location[..idx], &location[idx..]),
        None => (location, ""),
    };

    let (userinfo, hostport) = match netloc.rsplit_once('@') {
        Some((userinfo, hostport)) => (Some(userinfo), hostport),
        None => (None, netloc),
    };

    let (user, password) = match userinfo {
        Some(info) => match info.split_once(':') {
            Some((user, password)) => (Some(unquote(user)), Some(unquote(password))),
            None => (Some(unquote(info)), None),
        },
        None => (None, None),
    };

    let (host, port) = split_port(hostport);
    let port = match port {
        PortResult::Absent => None,
        PortResult::Valid(port) => Some(port),
        PortResult::Invalid(port) => {
            if options.strict_port {
                warn!("Rejected URL with invalid port ({port})");
                return None;
            }
            warn!("Ignoring invalid port ({port}); falling back to the default");
            None
        }
    };

    let host = unquote(host.trim());
    let host = if options.verify_host {
        Some(is_hostname(&host, true, true, true)?)
    } else if host.is_empty() {
        None
    } else {
        Some(host)
    };

    let decoded_path = unquote(&raw_path.replace('\\', "/"));
    let fullpath = tidy_fullpath(&decoded_path);
    let (path, query) = match fullpath.rfind('/') {
        Some(idx) if idx + 1 < fullpath.len() => (fullpath[..=idx].to_string(), Some(fullpath[idx + 1..].to_string())),
        _ => (fullpath.clone(), None),
    };

    let assembled = url_assembly(
        &UrlParts {
            schema: &schema,
            user: user.as_deref(),
            password: password.as_deref(),
            host: host.as_deref(),
            port,
            fullpath: if fullpath == "/" { "" } else { &fullpath },
            ..UrlParts::default()
        },
        false,
    );

    Some(ParsedUrl {
        secure: schema.ends_with('s'),
        schema,
        url: assembled,
        user,
        password,
        host,
        port,
        fullpath,
        path,
        query,
        args,
        verify: true,
        rto: None,
        cto: None,
    })
}
