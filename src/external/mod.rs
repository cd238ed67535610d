//! Clients for talking to remote services.

pub mod client;

pub use client::build_client;
