use super::common::deployment_options;
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::deployment;
use clap::Args;
use dialoguer::Confirm;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug, Args)]
pub struct Clean {
    /// Deployed directory to clean
    #[arg(short, long)]
    pub directory: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl Clean {
    #[instrument(name = "clean", skip(self, cli_args), fields(directory = %self.directory.display()))]
    pub fn run(&self, cli_args: &Cli) -> Result<(), CliError> {
        if !self.yes {
            warn!("This removes .env, env files and override files generated by deploy.");
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Remove generated files from {}?",
                    ui::format_highlight(&self.directory.display().to_string())
                ))
                .interact()
                .map_err(|e| {
                    CliError::OperationFailed(format!("Failed to get confirmation: {}", e))
                })?;
            if !confirmed {
                info!("Clean cancelled by user.");
                return Ok(());
            }
        }

        let removed = deployment::clean(&self.directory, &deployment_options(cli_args))?;
        for file in &removed {
            info!("Removed {}", file.display());
        }
        info!(
            "{}",
            ui::format_success(&format!("Removed {} generated file(s)", removed.len()))
        );

        Ok(())
    }
}
