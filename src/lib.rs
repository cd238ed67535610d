//! Herald
//!
//! Sends one notification to many services, each described by a URL.

pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod services;
pub mod url;
pub mod utils;

pub use config::{Asset, Settings};
pub use error::{NotifyError, NotifyResult};
pub use services::notifications::{NotifyFormat, NotifyType, OverflowMode};
pub use services::{Dispatcher, NotificationMessage, NotificationProvider, ProviderRegistry};

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
