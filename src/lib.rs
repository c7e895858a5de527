//! sm-deploy - pushes a software management configuration to a qbee.io device group.
//!
//! A run reads a JSON configuration file, validates it against the software
//! management schema, fetches the group's current configuration and then,
//! depending on the chosen mode, posts and commits a change.
//!
//! # Modes
//!
//! - `add`: append items missing from the current configuration
//! - `replace`: overwrite the current configuration
//! - `if_not_present`: upload only when the group has none
//!
//! # Example
//!
//! ```no_run
//! use sm_deploy::clients::QbeeClient;
//! use sm_deploy::core::config::AppConfig;
//! use sm_deploy::core::models::{Mode, load_config_file};
//! use sm_deploy::features::{DeployRequest, apply};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     sm_deploy::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let client = QbeeClient::new("api-token", &config)?;
//!
//!     let request = DeployRequest {
//!         device_group: "root".to_string(),
//!         mode: Mode::Add,
//!         config: load_config_file("sm.json".as_ref())?,
//!         commit_message: "add nginx".to_string(),
//!     };
//!
//!     let outcome = apply(&client, &request).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod core;
pub mod errors;
pub mod features;
pub mod input;
pub mod schema;

pub use errors::SmError;

/// Configure structured JSON logging.
///
/// The level defaults to `info` and can be overridden through `RUST_LOG`.
/// Calling this more than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// sm_deploy::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
