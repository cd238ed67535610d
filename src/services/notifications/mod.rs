//! Notification handlers and the dispatcher that drives them.
//!
//! Every handler implements [`NotificationProvider`] and is built from a URL
//! through [`ProviderFactory`]. The [`ProviderRegistry`] maps schema tokens to
//! handler types, and a [`Dispatcher`] fans a message out to all of them.

mod bark_provider;
mod base;
mod common;
mod custom_http_provider;
mod details;
mod dispatcher;
#[cfg(feature = "mqtt")]
mod mqtt_provider;
mod overflow;
mod provider;
mod registry;
mod throttle;

pub use bark_provider::{BARK_LEVELS, BARK_SOUNDS, BarkArgs, BarkProvider};
pub use base::{BaseArgs, DEFAULT_SOCKET_TIMEOUT, ServiceBase, ServiceRuntime, hash_identifier};
pub use common::{NotifyFormat, NotifyType, OverflowMode};
pub use custom_http_provider::{
    CustomHttpArgs, CustomHttpProvider, Form, FormProvider, Json, JsonProvider, PayloadFormat, Xml, XmlProvider,
};
pub use details::{BASE_ARGS, FieldKind, ServiceDetails, TemplateArg, TemplateToken};
pub use dispatcher::Dispatcher;
#[cfg(feature = "mqtt")]
pub use mqtt_provider::{MqttArgs, MqttProvider};
pub use overflow::prepare;
pub use provider::{NotificationMessage, NotificationProvider, ProviderArgs, ProviderFactory};
pub use registry::ProviderRegistry;
pub use throttle::Throttle;
