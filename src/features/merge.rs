use tracing::info;

use crate::core::models::{SoftwareManagement, item_label};
use crate::errors::SmError;

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Every uploaded item was already present.
    Unchanged,
    Changed(SoftwareManagement),
}

/// Appends uploaded items missing from `current`, keeping everything else of
/// `current` as is.
///
/// Both documents must agree on `enabled` and `version`.
pub fn merge_items(
    current: &SoftwareManagement,
    upload: &SoftwareManagement,
) -> Result<MergeOutcome, SmError> {
    if upload.enabled != current.enabled {
        return Err(SmError::Mismatch(
            "set 'enabled' to true or false for both".to_string(),
        ));
    }
    if upload.version != current.version {
        return Err(SmError::Mismatch("use 'version' for both".to_string()));
    }

    let mut merged = current.clone();
    for item in &upload.items {
        if current.items.contains(item) {
            info!(
                "software management entry is already present, skipping: {}",
                item_label(item)
            );
        } else {
            merged.items.push(item.clone());
        }
    }

    if merged == *current {
        Ok(MergeOutcome::Unchanged)
    } else {
        Ok(MergeOutcome::Changed(merged))
    }
}
