use super::common::{deployment_options, print_file_table};
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::config::MergePolicy;
use crate::deployment::{Deployable, DeploymentFolder, FileSet};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;

#[derive(Debug, Args)]
pub struct Files {
    /// Source deployment folder
    #[arg(short, long)]
    pub source: PathBuf,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FilesListing<'a> {
    single_server: bool,
    servers: Vec<&'a str>,
    source_files: &'a FileSet,
    generated_files: &'a FileSet,
}

impl Files {
    #[instrument(name = "files", skip(self, cli_args), fields(source = %self.source.display()))]
    pub fn run(&self, cli_args: &Cli) -> Result<(), CliError> {
        let folder = DeploymentFolder::new(&self.source, deployment_options(cli_args))?;
        let source_files = folder.source_files()?;
        let generated_files = folder.generated_files();

        if self.json {
            let listing = FilesListing {
                single_server: folder.is_single_server(),
                servers: folder.server_folders().keys().map(String::as_str).collect(),
                source_files: &source_files,
                generated_files: &generated_files,
            };
            let json = serde_json::to_string_pretty(&listing).map_err(|e| {
                CliError::OperationFailed(format!("Failed to serialize file listing: {}", e))
            })?;
            println!("{}", json);
            return Ok(());
        }

        println!(
            "\n{}: {}",
            ui::format_header("Deployment folder"),
            ui::format_highlight(&folder.directory().display().to_string())
        );
        println!(
            "{}: {}",
            ui::format_header("Mode"),
            if folder.is_single_server() {
                "single-server"
            } else {
                "multi-server"
            }
        );
        println!(
            "{}: {}",
            ui::format_header("Merge policy"),
            match folder.merge_policy() {
                MergePolicy::Preserve => "preserve".to_string(),
                MergePolicy::AllowList(keys) => format!(
                    "allow-list ({})",
                    keys.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
            }
        );
        print_file_table("Files:", &source_files, &generated_files);

        Ok(())
    }
}
