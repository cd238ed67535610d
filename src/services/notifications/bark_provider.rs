//! Bark notification provider implementation.
//!
//! Sends push notifications to iOS devices via a Bark server.
//!
//! Bark API Reference: https://github.com/Finb/Bark
//!
//! ```text
//! bark://[user:password@]host[:port]/device_key[/device_key...]?sound=bell&level=active
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use tracing::{debug, info, warn};

use super::base::{BaseArgs, ServiceBase, ServiceRuntime};
use super::details::{FieldKind, ServiceDetails, TemplateArg, TemplateToken};
use super::provider::{NotificationMessage, NotificationProvider, ProviderArgs, ProviderFactory};
use crate::config::Asset;
use crate::error::{NotifyError, NotifyResult};
use crate::external::build_client;
use crate::url::{ParseOptions, parse, quote, urlencode};
use crate::utils::{http_response_code_lookup, parse_list, split_path};

/// Sounds a Bark client ships with
pub const BARK_SOUNDS: &[&str] = &[
    "alarm.caf",
    "anticipate.caf",
    "bell.caf",
    "birdsong.caf",
    "bloom.caf",
    "calypso.caf",
    "chime.caf",
    "choo.caf",
    "descent.caf",
    "electronic.caf",
    "fanfare.caf",
    "glass.caf",
    "gotosleep.caf",
    "healthnotification.caf",
    "horn.caf",
    "ladder.caf",
    "mailsent.caf",
    "minuet.caf",
    "multiwayinvitation.caf",
    "newmail.caf",
    "newsflash.caf",
    "noir.caf",
    "paymentsuccess.caf",
    "shake.caf",
    "sherwoodforest.caf",
    "silence.caf",
    "spell.caf",
    "suspense.caf",
    "telegraph.caf",
    "tiptoes.caf",
    "typewriters.caf",
    "update.caf",
];

/// Interruption levels
pub const BARK_LEVELS: &[&str] = &["active", "timeSensitive", "passive"];

const DETAILS: ServiceDetails = ServiceDetails {
    service_url: Some("https://github.com/Finb/Bark"),
    protocols: &["bark"],
    secure_protocols: &["barks"],
    templates: &[
        "{schema}://{host}/{targets}",
        "{schema}://{host}:{port}/{targets}",
        "{schema}://{user}:{password}@{host}/{targets}",
        "{schema}://{user}:{password}@{host}:{port}/{targets}",
    ],
    tokens: &[
        TemplateToken::new("host", "Hostname", FieldKind::String).required(),
        TemplateToken::new("port", "Port", FieldKind::Int { min: 1, max: 65535 }),
        TemplateToken::new("user", "Username", FieldKind::String),
        TemplateToken::new("password", "Password", FieldKind::String).private(),
        TemplateToken::new("target_device", "Target Device", FieldKind::String).map_to("targets"),
        TemplateToken::new("targets", "Targets", FieldKind::List).required(),
    ],
    args: &[
        TemplateArg::alias("to", "targets"),
        TemplateArg::new("sound", "Sound", FieldKind::Choice(BARK_SOUNDS)),
        TemplateArg::new("level", "Level", FieldKind::Choice(BARK_LEVELS)),
        TemplateArg::new("click", "Click", FieldKind::String),
        TemplateArg::new("badge", "Badge", FieldKind::Int { min: 0, max: i64::MAX }),
        TemplateArg::new("category", "Category", FieldKind::String),
        TemplateArg::new("group", "Group", FieldKind::String),
        TemplateArg::new("icon", "Icon", FieldKind::String),
    ],
    ..ServiceDetails::new("Bark")
};

/// Constructor arguments of [`BarkProvider`]
#[derive(Debug, Clone, Default)]
pub struct BarkArgs {
    pub base: BaseArgs,
    pub targets: Vec<String>,
    pub sound: Option<String>,
    pub level: Option<String>,
    pub click: Option<String>,
    pub badge: Option<String>,
    pub category: Option<String>,
    pub group: Option<String>,
    pub icon: Option<String>,
}

impl ProviderArgs for BarkArgs {
    fn base_mut(&mut self) -> &mut BaseArgs {
        &mut self.base
    }
}

/// Bark notification provider
///
/// Bark is an open-source iOS push notification service that supports
/// custom icons, sounds, deep links, and more. One request is made per
/// device key.
///
/// # Example
/// ```ignore
/// let provider = BarkProvider::from_url("barks://bark.example.com/YourDeviceKey?sound=bell", asset)?;
/// let delivered = provider.notify(&NotificationMessage::new("Backup finished")).await;
/// ```
#[derive(Debug)]
pub struct BarkProvider {
    base: ServiceBase,
    runtime: ServiceRuntime,
    targets: Vec<String>,
    sound: Option<&'static str>,
    level: Option<&'static str>,
    click: Option<String>,
    badge: Option<u64>,
    category: Option<String>,
    group: Option<String>,
    icon: Option<String>,
    client: reqwest::Client,
}

/// First known sound starting with `sound`
fn match_sound(sound: &str) -> Option<&'static str> {
    let sound = sound.to_lowercase();
    BARK_SOUNDS.iter().copied().find(|s| s.starts_with(&sound))
}

/// Level sharing the first character of `level`
fn match_level(level: &str) -> Option<&'static str> {
    let first = level.chars().next()?;
    BARK_LEVELS.iter().copied().find(|l| l.starts_with(first))
}

impl BarkProvider {
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn sound(&self) -> Option<&str> {
        self.sound
    }

    pub fn level(&self) -> Option<&str> {
        self.level
    }

    pub fn badge(&self) -> Option<u64> {
        self.badge
    }

    fn default_port(&self) -> u16 {
        if self.base.secure { 443 } else { 80 }
    }

    /// `http[s]://host[:port]/push`
    fn notify_url(&self) -> String {
        format!(
            "{}://{}{}/push",
            if self.base.secure { "https" } else { "http" },
            self.base.host.as_deref().unwrap_or_default(),
            self.base.port.map(|p| format!(":{p}")).unwrap_or_default()
        )
    }

    /// Builds the request body for the Bark push API, without the device key
    fn build_request_body(&self, message: &NotificationMessage) -> serde_json::Value {
        let title = match message.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => self.runtime.asset().app_desc.as_str(),
        };

        let mut body = json!({
            "title": title,
            "body": message.body,
        });

        // Add optional fields
        if let Some(icon) = &self.icon {
            body["icon"] = json!(icon);
        }

        if let Some(sound) = self.sound {
            body["sound"] = json!(sound);
        }

        if let Some(click) = &self.click {
            body["url"] = json!(click);
        }

        if let Some(badge) = self.badge.filter(|b| *b > 0) {
            body["badge"] = json!(badge);
        }

        if let Some(level) = self.level {
            body["level"] = json!(level);
        }

        if let Some(category) = &self.category {
            body["category"] = json!(category);
        }

        if let Some(group) = &self.group {
            body["group"] = json!(group);
        }

        body
    }

    /// One POST for one device
    async fn push(&self, url: &str, payload: &serde_json::Value, target: &str) -> bool {
        debug!("Bark POST URL: {} (cert_verify={})", url, self.base.verify_certificate);
        debug!("Bark Payload: {}", payload);

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(payload.to_string());

        if let Some((user, password)) = self.base.request_auth() {
            request = request.basic_auth(user, password);
        }

        self.throttle(None, None).await;

        match request.send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("Sent Bark notification to {}.", target);
                true
            }
            Ok(response) => {
                let code = response.status().as_u16();
                let status_str = http_response_code_lookup(code, None);
                warn!(
                    "Failed to send Bark notification to {}: {}{}error={}.",
                    target,
                    status_str,
                    if status_str.is_empty() { "" } else { ", " },
                    code
                );
                debug!("Response Details:\r\n{}", response.text().await.unwrap_or_default());
                false
            }
            Err(e) => {
                warn!("A Connection error occurred sending Bark notification to {}.", target);
                debug!("Socket Exception: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl NotificationProvider for BarkProvider {
    fn details(&self) -> &'static ServiceDetails {
        &DETAILS
    }

    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn runtime(&self) -> &ServiceRuntime {
        &self.runtime
    }

    fn url(&self, privacy: bool) -> String {
        let mut params = BTreeMap::new();
        if let Some(sound) = self.sound {
            params.insert("sound".to_string(), sound.to_string());
        }
        if let Some(click) = &self.click {
            params.insert("click".to_string(), click.clone());
        }
        if let Some(badge) = self.badge.filter(|b| *b > 0) {
            params.insert("badge".to_string(), badge.to_string());
        }
        if let Some(level) = self.level {
            params.insert("level".to_string(), level.to_string());
        }
        if let Some(category) = &self.category {
            params.insert("category".to_string(), category.clone());
        }
        if let Some(group) = &self.group {
            params.insert("group".to_string(), group.clone());
        }
        if let Some(icon) = &self.icon {
            params.insert("icon".to_string(), icon.clone());
        }
        params.extend(self.base.url_parameters());

        format!(
            "{}://{}{}{}/{}?{}",
            DETAILS.protocol(self.base.secure),
            self.base.auth_prefix(privacy),
            self.base.host.as_deref().unwrap_or_default(),
            self.base.port_suffix(Some(self.default_port())),
            self.targets
                .iter()
                .map(|t| quote(t, "/"))
                .collect::<Vec<_>>()
                .join("/"),
            urlencode(params.iter().map(|(k, v)| (k, Some(v))))
        )
    }

    /// Sends to every device; one failure does not stop the rest
    async fn send(&self, message: &NotificationMessage) -> bool {
        let url = self.notify_url();
        let mut payload = self.build_request_body(message);
        let mut has_error = false;

        for target in &self.targets {
            payload["device_key"] = json!(target);
            if !self.push(&url, &payload, target).await {
                has_error = true;
            }
        }

        !has_error
    }

    fn url_identifier(&self) -> Option<Vec<Option<String>>> {
        Some(vec![
            Some(DETAILS.protocol(self.base.secure).to_string()),
            self.base.user.clone(),
            self.base.password.clone(),
            self.base.host.clone(),
            Some(self.base.port.unwrap_or_else(|| self.default_port()).to_string()),
        ])
    }

    fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl ProviderFactory for BarkProvider {
    const DETAILS: &'static ServiceDetails = &DETAILS;

    type Args = BarkArgs;

    fn parse_url(url: &str) -> Option<Self::Args> {
        let results = parse(url, &ParseOptions::default())?;
        if !DETAILS.schemas().any(|schema| schema == results.schema) {
            return None;
        }

        let option = |key: &str| results.args.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut targets = split_path(&results.fullpath, true);
        if let Some(to) = option("to") {
            targets.extend(parse_list(&to, true));
        }

        Some(BarkArgs {
            base: BaseArgs::from_parsed(&results),
            targets,
            sound: option("sound"),
            level: option("level"),
            click: option("click"),
            badge: option("badge"),
            category: option("category"),
            group: option("group"),
            icon: option("icon"),
        })
    }

    fn from_args(args: Self::Args, asset: Arc<Asset>) -> NotifyResult<Self> {
        if args.base.host.as_deref().is_none_or(str::is_empty) {
            return Err(NotifyError::validation("host", "A Bark server hostname is required"));
        }

        let targets = parse_list(&args.targets, true);
        if targets.is_empty() {
            warn!("There are no Bark devices to notify");
            return Err(NotifyError::validation("targets", "At least one Bark device key is required"));
        }

        let sound = args.sound.as_deref().and_then(|sound| {
            let matched = match_sound(sound);
            if matched.is_none() {
                warn!("The specified Bark sound ({}) was not found", sound);
            }
            matched
        });

        let level = args.level.as_deref().and_then(|level| {
            let matched = match_level(level);
            if matched.is_none() {
                warn!("The specified Bark level ({}) is not valid", level);
            }
            matched
        });

        let badge = args.badge.as_deref().and_then(|badge| match badge.trim().parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("The specified Bark badge ({}) is not valid", badge);
                None
            }
        });

        let base = ServiceBase::new(args.base)?;
        let (connect_timeout, read_timeout) = base.request_timeout();
        let client = build_client(&asset.app_id, base.verify_certificate, connect_timeout, read_timeout)?;

        Ok(Self {
            runtime: ServiceRuntime::new(&DETAILS, asset),
            base,
            targets,
            sound,
            level,
            click: args.click,
            badge,
            category: args.category,
            group: args.group,
            icon: args.icon,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn asset() -> Arc<Asset> {
        Arc::new(Asset::default())
    }

    fn provider(url: &str) -> BarkProvider {
        BarkProvider::from_url(url, asset()).unwrap()
    }

    #[test]
    fn test_details_are_valid() {
        assert!(DETAILS.validate().is_ok());
        assert_eq!(DETAILS.request_rate_per_sec, 5.5);
    }

    #[test]
    fn test_targets_from_path_and_to() {
        let provider = provider("bark://push.example.com/key1/key2?to=key3,key1");
        assert_eq!(provider.targets(), ["key1", "key2", "key3"]);
        assert_eq!(provider.target_count(), 3);
    }

    #[test]
    fn test_device_is_required() {
        let err = BarkProvider::from_url("bark://push.example.com", asset()).unwrap_err();
        assert!(err.is_construction_error());

        let err = BarkProvider::from_url("bark://push.example.com/?to=", asset()).unwrap_err();
        assert!(err.is_construction_error());
    }

    #[test]
    fn test_options_are_normalised() {
        let provider = provider("bark://push.example.com/key?sound=BE&level=t&badge=3");
        assert_eq!(provider.sound(), Some("bell.caf"));
        assert_eq!(provider.level(), Some("timeSensitive"));
        assert_eq!(provider.badge(), Some(3));
    }

    #[test]
    fn test_invalid_options_are_ignored() {
        let provider = provider("bark://push.example.com/key?sound=nope&level=x&badge=-1");
        assert_eq!(provider.sound(), None);
        assert_eq!(provider.level(), None);
        assert_eq!(provider.badge(), None);
    }

    #[test]
    fn test_build_request_body_minimal() {
        let provider = provider("bark://push.example.com/key");
        let body = provider.build_request_body(&NotificationMessage::new("Test Body"));

        assert_eq!(body["title"], "Herald Notifications");
        assert_eq!(body["body"], "Test Body");
        assert!(body.get("icon").is_none());
        assert!(body.get("sound").is_none());
        assert!(body.get("badge").is_none());
    }

    #[test]
    fn test_build_request_body_full() {
        let provider = provider(
            "bark://push.example.com/key?sound=alarm&level=passive&click=https%3A%2F%2Fexample.com&badge=2\
             &category=ops&group=backups&icon=https%3A%2F%2Fexample.com%2Ficon.png",
        );
        let message = NotificationMessage::new("Test Body").with_title("Test Title");
        let body = provider.build_request_body(&message);

        assert_eq!(body["title"], "Test Title");
        assert_eq!(body["sound"], "alarm.caf");
        assert_eq!(body["level"], "passive");
        assert_eq!(body["url"], "https://example.com");
        assert_eq!(body["badge"], 2);
        assert_eq!(body["category"], "ops");
        assert_eq!(body["group"], "backups");
        assert_eq!(body["icon"], "https://example.com/icon.png");
    }

    #[test]
    fn test_url_round_trip() {
        let original = provider(
            "barks://user:pw@push.example.com:8443/key1/key2?sound=bell&level=active&badge=4&group=g&click=x",
        );
        let url = original.url(false);
        assert!(url.starts_with("barks://user:pw@push.example.com:8443/key1/key2?"));

        let restored = provider(&url);
        assert_eq!(restored.url(false), url);
        assert_eq!(restored.url_id(), original.url_id());

        assert!(original.url(true).contains("user:****@"));
    }

    #[test]
    fn test_url_id_ignores_devices() {
        let a = provider("bark://push.example.com/key1");
        let b = provider("bark://push.example.com/key2?sound=bell");
        let c = provider("bark://other.example.com/key1");
        assert_eq!(a.url_id(), b.url_id());
        assert_ne!(a.url_id(), c.url_id());
    }

    #[test]
    fn test_url_id_survives_default_port_round_trip() {
        let explicit = provider("bark://push.example.com:80/devkey");
        let url = explicit.url(false);
        assert!(url.starts_with("bark://push.example.com/devkey?"));

        let restored = provider(&url);
        assert_eq!(restored.url_id(), explicit.url_id());
        assert_eq!(
            provider("barks://push.example.com:443/devkey").url_id(),
            provider("barks://push.example.com/devkey").url_id()
        );
        assert_ne!(provider("bark://push.example.com:8080/devkey").url_id(), explicit.url_id());
    }

    #[tokio::test]
    async fn test_send() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/push")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "title": "Hello",
                "body": "World",
                "device_key": "key1",
                "sound": "bell.caf",
            })))
            .with_status(200)
            .create_async()
            .await;

        let url = format!("bark://{}/key1?sound=bell", server.host_with_port());
        let provider = provider(&url);

        assert!(provider.notify(&NotificationMessage::new("World").with_title("Hello")).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_attempts_every_device() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", "/push")
            .match_body(Matcher::PartialJson(serde_json::json!({ "device_key": "bad" })))
            .with_status(400)
            .create_async()
            .await;
        let working = server
            .mock("POST", "/push")
            .match_body(Matcher::PartialJson(serde_json::json!({ "device_key": "good" })))
            .with_status(200)
            .create_async()
            .await;

        let url = format!("bark://{}/bad/good", server.host_with_port());
        let provider = provider(&url);

        assert!(!provider.notify(&NotificationMessage::new("World")).await);
        failing.assert_async().await;
        working.assert_async().await;
    }
}
