use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use sm_deploy::clients::QbeeClient;
use sm_deploy::core::config::AppConfig;
use sm_deploy::core::models::load_config_file;
use sm_deploy::features::{DeployRequest, Outcome, apply};
use sm_deploy::input::Input;

async fn run(input: Input) -> Result<Outcome> {
    let config = AppConfig::from_env().context("Failed to load configuration from environment")?;
    info!("Using API at {}", config.api_url);

    let sm_config = load_config_file(&input.config_file).with_context(|| {
        format!(
            "Failed to load configuration file {}",
            input.config_file.display()
        )
    })?;
    info!(
        "Loaded configuration with {} items (version {})",
        sm_config.items.len(),
        sm_config.version
    );

    let client = QbeeClient::new(&input.token, &config)?;
    let request = DeployRequest {
        device_group: input.device_group,
        mode: input.mode,
        config: sm_config,
        commit_message: input.commit_message,
    };

    Ok(apply(&client, &request).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    sm_deploy::setup_logging();

    let input = match Input::parse_from_args(std::env::args_os()) {
        Ok(input) => input,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let span = info_span!(
        "deploy",
        run_id = %Uuid::new_v4(),
        group = %input.device_group,
        mode = %input.mode,
    );

    match run(input).instrument(span).await {
        Ok(outcome) => {
            info!("Deployment finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            error!("aborting");
            ExitCode::FAILURE
        }
    }
}
