use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, error};

use super::bark_provider::BarkProvider;
use super::custom_http_provider::{FormProvider, JsonProvider, XmlProvider};
use super::details::ServiceDetails;
#[cfg(feature = "mqtt")]
use super::mqtt_provider::MqttProvider;
use super::provider::{NotificationProvider, ProviderArgs, ProviderFactory};
use crate::config::Asset;
use crate::error::{NotifyError, NotifyResult};
use crate::url::redact_url;

/// `schema://` at the start of a URL
static SCHEMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*([a-z0-9]{1,12})://").expect("Invalid schema regex"));

type ProviderBuilder = Box<
    dyn Fn(&str, Arc<Asset>, &[String]) -> NotifyResult<Arc<dyn NotificationProvider>> + Send + Sync,
>;

struct Entry {
    details: &'static ServiceDetails,
    build: ProviderBuilder,
}

/// Registry for mapping schema tokens to handler implementations
pub struct ProviderRegistry {
    entries: BTreeMap<&'static str, Arc<Entry>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// A registry with every compiled-in handler
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin::<JsonProvider>();
        registry.register_builtin::<FormProvider>();
        registry.register_builtin::<XmlProvider>();
        registry.register_builtin::<BarkProvider>();
        #[cfg(feature = "mqtt")]
        registry.register_builtin::<MqttProvider>();
        registry
    }

    fn register_builtin<T: ProviderFactory>(&mut self) {
        if let Err(err) = self.register::<T>() {
            error!("Built-in handler failed to register: {}", err);
        }
    }

    /// A registry with no handlers
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a handler type with the registry
    ///
    /// Fails when its details are inconsistent or one of its schemas is
    /// already taken; nothing is registered in that case.
    pub fn register<T: ProviderFactory>(&mut self) -> NotifyResult<&mut Self> {
        let details = T::DETAILS;
        details.validate()?;

        if let Some(taken) = details.schemas().find(|schema| self.entries.contains_key(schema)) {
            return Err(NotifyError::Registration {
                schema: taken.to_string(),
                reason: "schema is already registered".to_string(),
            });
        }

        let build: ProviderBuilder = Box::new(|url: &str, asset: Arc<Asset>, tags: &[String]| {
            let mut args = T::parse_url(url).ok_or_else(|| NotifyError::UnparseableUrl { url: redact_url(url) })?;
            args.base_mut().tags.extend(tags.iter().cloned());
            let provider = T::from_args(args, asset)?;
            Ok(Arc::new(provider) as Arc<dyn NotificationProvider>)
        });

        let entry = Arc::new(Entry { details, build });
        for schema in details.schemas() {
            debug!("Registered {}:// ({})", schema, details.service_name);
            self.entries.insert(schema, Arc::clone(&entry));
        }

        Ok(self)
    }

    /// Supported schema tokens, sorted
    pub fn schemas(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Static description of the handler behind `schema`
    pub fn details(&self, schema: &str) -> Option<&'static ServiceDetails> {
        self.entries.get(schema.to_lowercase().as_str()).map(|entry| entry.details)
    }

    /// Builds the handler for `url`
    pub fn instantiate(&self, url: &str, asset: Arc<Asset>) -> NotifyResult<Arc<dyn NotificationProvider>> {
        self.instantiate_with_tags(url, asset, &[])
    }

    /// Builds the handler for `url` and tags it
    pub fn instantiate_with_tags(
        &self,
        url: &str,
        asset: Arc<Asset>,
        tags: &[String],
    ) -> NotifyResult<Arc<dyn NotificationProvider>> {
        let schema = detect_schema(url).ok_or_else(|| NotifyError::UnparseableUrl { url: redact_url(url) })?;

        let entry = self
            .entries
            .get(schema.as_str())
            .ok_or_else(|| NotifyError::UnsupportedSchema { schema: schema.clone() })?;

        (entry.build)(url, asset, tags)
    }
}

/// Lowercased schema token of `url`
fn detect_schema(url: &str) -> Option<String> {
    SCHEMA_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}
