use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SmError;
use crate::schema;

/// Name of the bundle this tool manages, also used as the change `formtype`.
pub const SOFTWARE_MANAGEMENT: &str = "software_management";

/// How an upload interacts with an existing software management bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Append new items to the existing configuration.
    #[value(name = "add")]
    Add,
    /// Overwrite the existing configuration.
    #[value(name = "replace")]
    Replace,
    /// Upload only when the group has no software management configuration.
    #[value(name = "if_not_present")]
    IfNotPresent,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Add, Mode::Replace, Mode::IfNotPresent];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Add => "add",
            Mode::Replace => "replace",
            Mode::IfNotPresent => "if_not_present",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let options: Vec<&str> = Mode::ALL.iter().map(|m| m.as_str()).collect();
                SmError::InputError(format!(
                    "invalid mode chosen: {s}, available options are: {}",
                    options.join(", ")
                ))
            })
    }
}

/// The `software_management` bundle document.
///
/// Items stay raw JSON so that comparisons are structural and fields we do not
/// model survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareManagement {
    pub enabled: bool,
    pub version: String,
    pub items: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SoftwareManagement {
    /// JSON string form used as the `config` field of a change request.
    pub fn to_json_string(&self) -> Result<String, SmError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Short label for an item in log output.
#[must_use]
pub fn item_label(item: &Value) -> String {
    item.get("package")
        .and_then(Value::as_str)
        .map_or_else(|| item.to_string(), str::to_string)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub config: GroupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub bundles: Vec<String>,
    #[serde(default)]
    pub bundle_data: Map<String, Value>,
}

impl RemoteConfig {
    #[must_use]
    pub fn has_software_management(&self) -> bool {
        self.config.bundles.iter().any(|b| b == SOFTWARE_MANAGEMENT)
    }

    pub fn software_management(&self) -> Result<SoftwareManagement, SmError> {
        let data = self
            .config
            .bundle_data
            .get(SOFTWARE_MANAGEMENT)
            .ok_or_else(|| {
                SmError::UnexpectedResponse(format!(
                    "bundle_data has no {SOFTWARE_MANAGEMENT} entry"
                ))
            })?;

        serde_json::from_value(data.clone()).map_err(|e| {
            SmError::UnexpectedResponse(format!("current {SOFTWARE_MANAGEMENT} config: {e}"))
        })
    }
}

/// Reads, validates and parses the configuration file to upload.
pub fn load_config_file(path: &Path) -> Result<SoftwareManagement, SmError> {
    let raw = std::fs::read_to_string(path).map_err(|e| SmError::io(path, &e))?;
    let document: Value = serde_json::from_str(&raw)
        .map_err(|e| SmError::ParseError(format!("{}: {e}", path.display())))?;

    schema::validate(&document)?;

    Ok(serde_json::from_value(document)?)
}
