//! Client modules for external API interactions

pub mod qbee_client;

pub use qbee_client::{ConfigApi, QbeeClient};
