//! Static description of a handler: its schemas, limits and URL vocabulary.
//!
//! Every handler declares one `ServiceDetails` constant. The registry runs
//! [`ServiceDetails::validate`] on it when the handler is registered, so an
//! inconsistent declaration is caught before any URL is parsed.

use std::collections::HashSet;

use crate::error::{NotifyError, NotifyResult};

/// Value type of a token or argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    String,
    Int { min: i64, max: i64 },
    Float,
    Bool,
    Choice(&'static [&'static str]),
    List,
}

/// A positional part of the URL (host, user, a path segment, ...)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateToken {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Rendered masked in privacy mode
    pub private: bool,
    /// Constructor field this token feeds, when it differs from `key`
    pub map_to: Option<&'static str>,
}

impl TemplateToken {
    pub const fn new(key: &'static str, name: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            name,
            kind,
            required: false,
            private: false,
            map_to: None,
        }
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    pub const fn private(self) -> Self {
        Self { private: true, ..self }
    }

    pub const fn map_to(self, key: &'static str) -> Self {
        Self {
            map_to: Some(key),
            ..self
        }
    }
}

/// A query-string argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateArg {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: Option<&'static str>,
    /// Another spelling of a token or argument
    pub alias_of: Option<&'static str>,
    pub map_to: Option<&'static str>,
}

impl TemplateArg {
    pub const fn new(key: &'static str, name: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            name,
            kind,
            default: None,
            alias_of: None,
            map_to: None,
        }
    }

    /// `key` is an alternate spelling of `target`
    pub const fn alias(key: &'static str, target: &'static str) -> Self {
        Self {
            key,
            name: key,
            kind: FieldKind::String,
            default: None,
            alias_of: Some(target),
            map_to: None,
        }
    }

    pub const fn default(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub const fn map_to(self, key: &'static str) -> Self {
        Self {
            map_to: Some(key),
            ..self
        }
    }
}

/// Arguments every handler understands
pub const BASE_ARGS: &[TemplateArg] = &[
    TemplateArg::new("format", "Notify Format", FieldKind::Choice(&["text", "html", "markdown"])).default("text"),
    TemplateArg::new("overflow", "Overflow Mode", FieldKind::Choice(&["upstream", "truncate", "split"]))
        .default("upstream"),
    TemplateArg::new("verify", "Verify SSL", FieldKind::Bool).default("yes"),
    TemplateArg::new("rto", "Socket Read Timeout", FieldKind::Float).default("4.0"),
    TemplateArg::new("cto", "Socket Connect Timeout", FieldKind::Float).default("4.0"),
];

/// Everything static about a handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceDetails {
    pub service_name: &'static str,
    pub service_url: Option<&'static str>,
    pub setup_url: Option<&'static str>,
    pub protocols: &'static [&'static str],
    pub secure_protocols: &'static [&'static str],
    /// 0 means the service has no title; it is folded into the body
    pub title_maxlen: usize,
    /// 0 means unlimited
    pub body_maxlen: usize,
    /// 0 means unlimited
    pub body_max_line_count: usize,
    /// Minimum seconds between two round-trips; 0 disables throttling
    pub request_rate_per_sec: f64,
    pub templates: &'static [&'static str],
    pub tokens: &'static [TemplateToken],
    pub args: &'static [TemplateArg],
}

impl ServiceDetails {
    /// Details with the generic limits
    pub const fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            service_url: None,
            setup_url: None,
            protocols: &[],
            secure_protocols: &[],
            title_maxlen: 250,
            body_maxlen: 32768,
            body_max_line_count: 0,
            request_rate_per_sec: 5.5,
            templates: &[],
            tokens: &[],
            args: &[],
        }
    }

    /// Schema used when rendering a URL
    pub fn protocol(&self, secure: bool) -> &'static str {
        let preferred = if secure {
            self.secure_protocols
        } else {
            self.protocols
        };

        preferred
            .first()
            .or_else(|| self.protocols.first())
            .or_else(|| self.secure_protocols.first())
            .copied()
            .unwrap_or_default()
    }

    /// Every schema token, insecure first
    pub fn schemas(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.protocols.iter().chain(self.secure_protocols.iter()).copied()
    }

    pub fn token(&self, key: &str) -> Option<&TemplateToken> {
        self.tokens.iter().find(|t| t.key == key)
    }

    /// Looks up an argument, handler-specific ones first
    pub fn arg(&self, key: &str) -> Option<&TemplateArg> {
        self.args.iter().chain(BASE_ARGS.iter()).find(|a| a.key == key)
    }

    /// Checks the declaration for internal consistency
    pub fn validate(&self) -> NotifyResult<()> {
        let schema = self.protocol(false);
        let fail = |reason: String| NotifyError::Registration {
            schema: schema.to_string(),
            reason,
        };

        if self.protocols.is_empty() && self.secure_protocols.is_empty() {
            return Err(fail(format!("{} declares no protocol", self.service_name)));
        }

        let mut seen = HashSet::new();
        for protocol in self.schemas() {
            let well_formed = (1..=12).contains(&protocol.len())
                && protocol.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
            if !well_formed {
                return Err(fail(format!("invalid protocol token '{}'", protocol)));
            }
            if !seen.insert(protocol) {
                return Err(fail(format!("protocol '{}' declared twice", protocol)));
            }
        }

        if !self.request_rate_per_sec.is_finite() || self.request_rate_per_sec < 0.0 {
            return Err(fail(format!(
                "request_rate_per_sec must be a non-negative number, got {}",
                self.request_rate_per_sec
            )));
        }

        let mut token_keys = HashSet::new();
        for token in self.tokens {
            if !token_keys.insert(token.key) {
                return Err(fail(format!("token '{}' declared twice", token.key)));
            }
        }

        let mut arg_keys = HashSet::new();
        for arg in self.args.iter().chain(BASE_ARGS.iter()) {
            if !arg_keys.insert(arg.key) {
                return Err(fail(format!("argument '{}' declared twice", arg.key)));
            }
            if token_keys.contains(arg.key) && arg.alias_of != Some(arg.key) {
                return Err(fail(format!(
                    "argument '{}' shadows a token without aliasing it",
                    arg.key
                )));
            }
        }

        let known = |key: &str| token_keys.contains(key) || arg_keys.contains(key);

        for token in self.tokens {
            if let Some(target) = token.map_to {
                if !known(target) {
                    return Err(fail(format!(
                        "token '{}' maps to unknown key '{}'",
                        token.key, target
                    )));
                }
            }
        }

        for arg in self.args {
            for target in [arg.alias_of, arg.map_to].into_iter().flatten() {
                if !known(target) {
                    return Err(fail(format!(
                        "argument '{}' refers to unknown key '{}'",
                        arg.key, target
                    )));
                }
            }
        }

        for template in self.templates {
            for placeholder in placeholders(template) {
                if placeholder != "schema" && !token_keys.contains(placeholder) {
                    return Err(fail(format!(
                        "template '{}' uses unknown token '{}'",
                        template, placeholder
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Names between `{` and `}` in a URL template
fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKENS: &[TemplateToken] = &[
        TemplateToken::new("host", "Hostname", FieldKind::String).required(),
        TemplateToken::new("password", "Password", FieldKind::String).private(),
        TemplateToken::new("target", "Target", FieldKind::String).map_to("targets"),
        TemplateToken::new("targets", "Targets", FieldKind::List),
    ];

    const ARGS: &[TemplateArg] = &[TemplateArg::alias("to", "targets")];

    const SAMPLE: ServiceDetails = ServiceDetails {
        protocols: &["demo"],
        secure_protocols: &["demos"],
        templates: &["{schema}://{host}/{targets}", "{schema}://{password}@{host}"],
        tokens: TOKENS,
        args: ARGS,
        ..ServiceDetails::new("Demo")
    };

    #[test]
    fn test_valid_details() {
        assert!(SAMPLE.validate().is_ok());
        assert_eq!(SAMPLE.protocol(false), "demo");
        assert_eq!(SAMPLE.protocol(true), "demos");
        assert_eq!(SAMPLE.schemas().collect::<Vec<_>>(), vec!["demo", "demos"]);
        assert_eq!(SAMPLE.arg("verify").and_then(|a| a.default), Some("yes"));
        assert!(SAMPLE.token("password").unwrap().private);
    }

    #[test]
    fn test_protocol_falls_back() {
        let details = ServiceDetails {
            protocols: &["only"],
            ..SAMPLE
        };
        let details = ServiceDetails {
            secure_protocols: &[],
            ..details
        };
        assert_eq!(details.protocol(true), "only");
    }

    #[test]
    fn test_rejects_bad_protocol() {
        let details = ServiceDetails {
            protocols: &["Demo"],
            ..SAMPLE
        };
        assert!(matches!(details.validate(), Err(NotifyError::Registration { .. })));

        let details = ServiceDetails {
            protocols: &["averyveryverylongschema"],
            ..SAMPLE
        };
        assert!(details.validate().is_err());

        let details = ServiceDetails {
            protocols: &[],
            secure_protocols: &[],
            ..SAMPLE
        };
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_template_token() {
        let details = ServiceDetails {
            templates: &["{schema}://{hostname}"],
            ..SAMPLE
        };
        let err = details.validate().unwrap_err();
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn test_rejects_dangling_alias() {
        const BAD: &[TemplateArg] = &[TemplateArg::alias("to", "recipients")];
        let details = ServiceDetails { args: BAD, ..SAMPLE };
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_arg() {
        const DUP: &[TemplateArg] = &[TemplateArg::new("verify", "Verify", FieldKind::Bool)];
        let details = ServiceDetails { args: DUP, ..SAMPLE };
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_rate() {
        let details = ServiceDetails {
            request_rate_per_sec: -1.0,
            ..SAMPLE
        };
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders("{schema}://{user}@{host}:{port}"), vec!["schema", "user", "host", "port"]);
        assert!(placeholders("plain").is_empty());
    }
}
