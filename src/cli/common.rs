use super::parser::Cli;
use super::ui;
use crate::deployment::{DeploymentOptions, FileSet, FolderLayout};
use colored::Colorize;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Color, Modify, Style},
    Table, Tabled,
};

/// Deployment options from the global command line flags.
pub fn deployment_options(cli: &Cli) -> DeploymentOptions {
    DeploymentOptions {
        working_config_filename: cli.working_config.clone(),
        template_config_filename: cli.template_config.clone(),
        installer_config_filename: cli.installer_config.clone(),
        layout: FolderLayout {
            configs_folder: cli.configs_folder.clone(),
            envs_folder: cli.envs_folder.clone(),
            configs_mount_point: cli.mount_point.clone(),
        },
        ignored_dirs: cli.ignored_dirs.iter().cloned().collect(),
    }
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

pub fn print_file_table(title: &str, source: &FileSet, generated: &FileSet) {
    println!("\n{}", ui::format_header(title));
    if source.is_empty() && generated.is_empty() {
        println!("  {}", ui::format_warning("(None)"));
        return;
    }

    let rows: Vec<_> = source
        .iter()
        .map(|file| row(file, "source"))
        .chain(generated.iter().map(|file| row(file, "generated")))
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::blank())
        .with(Modify::new(Rows::first()).with(Color::FG_GREEN))
        .with(
            Modify::new(Rows::first())
                .with(tabled::settings::Format::content(|s| s.bold().to_string())),
        );
    println!("{}", table);
}

fn row(file: &Path, kind: &str) -> FileRow {
    let kind = if kind == "generated" {
        ui::format_highlight(kind)
    } else {
        kind.to_string()
    };
    FileRow {
        file: file.display().to_string(),
        kind,
    }
}
