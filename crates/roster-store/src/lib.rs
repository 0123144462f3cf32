//! Graph store access for roster: configuration, argument values, the
//! [`GraphStore`] query interface, and the HelixDB HTTP client.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{GraphStore, HelixClient};
pub use config::StoreConfig;
pub use error::StoreError;
pub use models::{ArgValue, Arguments};
