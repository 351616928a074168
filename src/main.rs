use colored::*;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli_args = cytodeploy::cli::parse_args();

    // INFO by default, DEBUG/TRACE with -v/-vv
    let default_level = match cli_args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("CYTODEPLOY_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cytodeploy::cli::run(cli_args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(e.exit_code());
    }
}
