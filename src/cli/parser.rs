use super::{clean, deploy, files};
use clap::{ArgAction, Parser, Subcommand};

const VERSION_INFO: &str = env!("CYTODEPLOY_BUILD_VERSION");

#[derive(Parser, Debug)]
#[command(name = "cytodeploy")]
#[command(about = "Cytomine deployment folder tool", long_about = None, version = VERSION_INFO)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working configuration filename
    #[arg(long, default_value = "cytomine.yml", global = true)]
    pub working_config: String,

    /// Template configuration filename
    #[arg(long, default_value = "cytomine.template", global = true)]
    pub template_config: String,

    /// Installer configuration filename
    #[arg(long, default_value = "installer.yml", global = true)]
    pub installer_config: String,

    /// Name of the static configuration folder in each server folder
    #[arg(long, default_value = "configs", global = true)]
    pub configs_folder: String,

    /// Name of the generated env files folder in each server folder
    #[arg(long, default_value = "envs", global = true)]
    pub envs_folder: String,

    /// Mount point of configuration files inside the containers
    #[arg(long, default_value = "/cm_configs", global = true)]
    pub mount_point: String,

    /// Root subdirectory that is not a server folder (repeatable)
    #[arg(long = "ignore-dir", global = true)]
    pub ignored_dirs: Vec<String>,

    /// Increase message verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the deployment files into a target directory
    Deploy(deploy::Deploy),

    /// Remove generated files from a deployed directory
    Clean(clean::Clean),

    /// List source and generated files of a deployment folder
    Files(files::Files),
}
