//! Core notification provider trait and types.
//!
//! This module provides the contract every handler implements. The dynamic
//! side, [`NotificationProvider`], is object safe and is what the dispatcher
//! holds. The static side, [`ProviderFactory`], is what the registry uses to
//! turn a URL into a handler.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::warn;

use super::base::{BaseArgs, ServiceBase, ServiceRuntime};
use super::common::NotifyType;
use super::details::ServiceDetails;
use super::overflow;
use crate::config::Asset;
use crate::error::{NotifyError, NotifyResult};
use crate::url::redact_url;

/// Message to be sent via notification provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Message title (optional; folded into the body by services without one)
    pub title: Option<String>,
    /// Message body (required)
    pub body: String,
    pub notify_type: NotifyType,
}

impl NotificationMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
            notify_type: NotifyType::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_type(mut self, notify_type: NotifyType) -> Self {
        self.notify_type = notify_type;
        self
    }

    /// Title or an empty string
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Trait for notification handlers (webhook, push, MQTT, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// All handlers must be Send + Sync for use in async contexts.
///
/// # Example Implementation
/// ```ignore
/// #[async_trait]
/// impl NotificationProvider for EchoProvider {
///     fn details(&self) -> &'static ServiceDetails { Self::DETAILS }
///     fn base(&self) -> &ServiceBase { &self.base }
///     fn runtime(&self) -> &ServiceRuntime { &self.runtime }
///
///     fn url(&self, privacy: bool) -> String {
///         format!("echo://{}{}", self.base.auth_prefix(privacy), self.host)
///     }
///
///     async fn send(&self, message: &NotificationMessage) -> bool {
///         self.throttle(None, None).await;
///         // one round-trip
///         true
///     }
///
///     fn url_identifier(&self) -> Option<Vec<Option<String>>> {
///         Some(self.base.identifier("echo", None))
///     }
/// }
/// ```
#[async_trait]
pub trait NotificationProvider: Send + Sync + fmt::Debug {
    /// Static description of the service
    fn details(&self) -> &'static ServiceDetails;

    /// Durable configuration
    fn base(&self) -> &ServiceBase;

    /// In-memory state
    fn runtime(&self) -> &ServiceRuntime;

    /// Renders a URL that parses back into an equivalent handler.
    ///
    /// With `privacy` the secrets are masked; such a URL is for display
    /// only.
    fn url(&self, privacy: bool) -> String;

    /// Performs one delivery attempt.
    ///
    /// Returns true only on confirmed success. Every failure is logged with
    /// `warn!` (details at `debug!`) and reported as false. Implementations
    /// call [`Self::throttle`] before each network round-trip.
    async fn send(&self, message: &NotificationMessage) -> bool;

    /// Parts identifying the account or connection behind this handler;
    /// `None` opts out of `url_id`
    fn url_identifier(&self) -> Option<Vec<Option<String>>>;

    /// Number of targets a `send` addresses
    fn target_count(&self) -> usize {
        1
    }

    /// Returns the service name for logging/debugging
    fn name(&self) -> &'static str {
        self.details().service_name
    }

    fn schemas(&self) -> Vec<&'static str> {
        self.details().schemas().collect()
    }

    /// Stable storage key for this handler's account or connection
    fn url_id(&self) -> Option<String> {
        self.runtime().url_id(|| self.url_identifier())
    }

    /// Waits out the handler's minimum interval before a round-trip
    async fn throttle(&self, last_io: Option<Instant>, wait: Option<Duration>) {
        self.runtime().throttle().throttle(last_io, wait).await
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.base().has_tag(tag)
    }

    /// Fits the message to the service's limits and sends every piece.
    ///
    /// All pieces are attempted; the result is true only if each succeeded.
    async fn notify(&self, message: &NotificationMessage) -> bool {
        if message.body.trim().is_empty() {
            warn!("There was no message body specified to deliver with {}", self.name());
            return false;
        }

        let mut success = true;
        for chunk in overflow::prepare(self.details(), self.base(), message) {
            if !self.send(&chunk).await {
                success = false;
            }
        }

        success
    }
}

/// Handler-specific constructor arguments
pub trait ProviderArgs: Send + 'static {
    fn base_mut(&mut self) -> &mut BaseArgs;
}

/// The static side of a handler: how it is built from a URL
pub trait ProviderFactory: NotificationProvider + Sized + 'static {
    const DETAILS: &'static ServiceDetails;

    type Args: ProviderArgs;

    /// Maps a URL onto constructor arguments; `None` when it does not parse
    fn parse_url(url: &str) -> Option<Self::Args>;

    /// Validates the arguments; an invalid one fails here, never at send
    fn from_args(args: Self::Args, asset: Arc<Asset>) -> NotifyResult<Self>;

    fn from_url(url: &str, asset: Arc<Asset>) -> NotifyResult<Self> {
        let args = Self::parse_url(url).ok_or_else(|| NotifyError::UnparseableUrl { url: redact_url(url) })?;
        Self::from_args(args, asset)
    }
}
