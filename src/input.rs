//! Command-line input for a single deployment run.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use crate::core::models::Mode;

/// Positional argument names, in the order they must be given.
pub const INPUT_NAMES: [&str; 5] = [
    "token",
    "config_file",
    "mode",
    "device_group",
    "commit_message",
];

#[derive(Parser, Clone)]
#[command(name = "sm-deploy", version)]
#[command(about = "Push a software management configuration to a qbee.io device group")]
#[command(after_help = "\
MODES:
  add             Append new items to the existing configuration
  replace         Overwrite the existing configuration
  if_not_present  Upload only if the group has no software management configuration

ENVIRONMENT:
  QBEE_API_URL            API base URL (default https://www.app.qbee.io/api/v2/)
  QBEE_HTTP_TIMEOUT_SECS  Per-request timeout in seconds (default 30)
  QBEE_RETRY_ATTEMPTS     Retries for fetching the current configuration (default 3)
  RUST_LOG                Log filter (default info)")]
pub struct Input {
    /// API bearer token
    pub token: String,
    /// Path to the JSON configuration to upload
    pub config_file: PathBuf,
    /// How to combine with an existing configuration
    #[arg(value_enum)]
    pub mode: Mode,
    /// Device group (node id) the configuration applies to
    pub device_group: String,
    /// Message recorded with the commit
    pub commit_message: String,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("token", &"<redacted>")
            .field("config_file", &self.config_file)
            .field("mode", &self.mode)
            .field("device_group", &self.device_group)
            .field("commit_message", &self.commit_message)
            .finish()
    }
}

impl Input {
    /// Parses the full argument vector, program name included.
    ///
    /// With exactly five values every value is taken verbatim, even one that
    /// looks like a flag. Otherwise help and version requests come back as
    /// errors whose [`clap::Error::use_stderr`] is `false`.
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let given = args.len().saturating_sub(1);

        if given != INPUT_NAMES.len() {
            if wants_info(&args) {
                return Self::try_parse_from(args);
            }
            return Err(wrong_count_error(given));
        }

        // everything after `--` is positional
        let at = args.len() - given;
        args.insert(at, OsString::from("--"));
        Self::try_parse_from(args)
    }
}

fn wants_info(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .any(|a| matches!(a.to_str(), Some("-h" | "--help" | "-V" | "--version")))
}

fn wrong_count_error(given: usize) -> clap::Error {
    let mut cmd = <Input as clap::CommandFactory>::command();
    cmd.error(
        ErrorKind::WrongNumberOfValues,
        format!(
            "wrong number of input arguments: expecting {}, got {given}\nprovide values for: {}",
            INPUT_NAMES.len(),
            INPUT_NAMES.join(", ")
        ),
    )
}
