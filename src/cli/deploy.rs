use super::common::deployment_options;
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::deployment::{self, DeployRequest};
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

#[derive(Debug, Args)]
pub struct Deploy {
    /// Source deployment folder
    #[arg(short, long)]
    pub source: PathBuf,

    /// Target directory (deploys in place when omitted or equal to the source)
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Replace files of a previous deployment in a non-empty target
    #[arg(long)]
    pub overwrite: bool,
}

impl Deploy {
    #[instrument(name = "deploy", skip(self, cli_args), fields(source = %self.source.display()))]
    pub fn run(&self, cli_args: &Cli) -> Result<(), CliError> {
        let mut request = DeployRequest::new(&self.source)
            .with_overwrite(self.overwrite)
            .with_options(deployment_options(cli_args));
        if let Some(target) = &self.target {
            request = request.with_target(target);
        }
        debug!(?request, "Deploy request");

        let report = deployment::deploy(&request)?;

        let mode = if report.single_server {
            "single-server"
        } else {
            "multi-server"
        };
        info!(
            "{} {} ({}, servers: {})",
            ui::format_success(if report.in_place {
                "Deployed in place to"
            } else {
                "Deployed to"
            }),
            ui::format_highlight(&report.target.display().to_string()),
            mode,
            report.servers.join(", ")
        );
        for file in &report.generated_files {
            debug!("Generated {}", file.display());
        }

        Ok(())
    }
}
