use tracing::info;

use crate::clients::ConfigApi;
use crate::core::models::{Mode, SoftwareManagement};
use crate::errors::SmError;
use crate::features::merge::{MergeOutcome, merge_items};

/// Everything needed to deploy one configuration to one group.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub device_group: String,
    pub mode: Mode,
    pub config: SoftwareManagement,
    pub commit_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A change was posted and committed.
    Uploaded,
    /// `if_not_present` found an existing configuration.
    AlreadyPresent,
    /// `add` found every item already present.
    NoChanges,
}

/// Fetches the group's configuration and uploads according to `request.mode`.
///
/// # Errors
///
/// Any API failure or a merge mismatch aborts the run before anything else is
/// sent.
pub async fn apply<A>(api: &A, request: &DeployRequest) -> Result<Outcome, SmError>
where
    A: ConfigApi + ?Sized,
{
    let current = api.get_current_config(&request.device_group).await?;
    let has_config = current.has_software_management();

    match request.mode {
        Mode::IfNotPresent => {
            if has_config {
                info!("configuration is already present: not changing anything");
                return Ok(Outcome::AlreadyPresent);
            }
            info!("no configuration present: creating new configuration");
            upload(api, request, &request.config).await
        }
        Mode::Add => {
            info!("add config to existing");
            if !has_config {
                return upload(api, request, &request.config).await;
            }
            let existing = current.software_management()?;
            match merge_items(&existing, &request.config)? {
                MergeOutcome::Unchanged => {
                    info!("no config changes: no new software management upload");
                    Ok(Outcome::NoChanges)
                }
                MergeOutcome::Changed(merged) => {
                    info!(
                        "creating new configuration with {} items (was {})",
                        merged.items.len(),
                        existing.items.len()
                    );
                    upload(api, request, &merged).await
                }
            }
        }
        Mode::Replace => {
            info!("replacing config");
            upload(api, request, &request.config).await
        }
    }
}

async fn upload<A>(
    api: &A,
    request: &DeployRequest,
    config: &SoftwareManagement,
) -> Result<Outcome, SmError>
where
    A: ConfigApi + ?Sized,
{
    api.send_config(&request.device_group, config, &request.commit_message)
        .await?;
    Ok(Outcome::Uploaded)
}
