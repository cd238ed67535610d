//! Service layer: the notification handlers and their dispatcher.

pub mod notifications;

pub use notifications::{Dispatcher, NotificationMessage, NotificationProvider, ProviderRegistry};
