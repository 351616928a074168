mod common;

use common::{fixture_path, relative_files, write, Workspace};
use std::fs;
use std::process::{Command, Output};

fn cytodeploy(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cytodeploy"))
        .args(args)
        .env("CYTODEPLOY_LOG", "warn")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run cytodeploy")
}

fn path_arg(path: &std::path::Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn test_cli_deploy_and_clean() {
    let workspace = Workspace::from_fixture("single_server");
    let target = workspace.path("target");

    let output = cytodeploy(&[
        "deploy",
        "-s",
        path_arg(&workspace.source),
        "-t",
        path_arg(&target),
    ]);
    assert!(
        output.status.success(),
        "deploy failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(target.join("docker-compose.override.yml").is_file());

    let output = cytodeploy(&["clean", "-d", path_arg(&target), "--yes"]);
    assert!(output.status.success());
    assert!(!target.join("docker-compose.override.yml").exists());
    assert!(!target.join("envs").exists());
}

#[test]
fn test_cli_exit_codes() {
    let workspace = Workspace::from_fixture("single_server");
    let target = workspace.path("target");
    write(&target.join("existing.txt"), "data\n");

    let output = cytodeploy(&[
        "deploy",
        "-s",
        path_arg(&workspace.source),
        "-t",
        path_arg(&target),
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));

    let output = cytodeploy(&[
        "deploy",
        "-s",
        path_arg(&fixture_path("single_server_two_servers")),
        "-t",
        path_arg(&workspace.path("other")),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!workspace.path("other").exists());

    fs::remove_file(workspace.source.join("cytomine.yml")).unwrap();
    fs::remove_file(workspace.source.join("cytomine.template")).unwrap();
    let output = cytodeploy(&["files", "-s", path_arg(&workspace.source)]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_files_json() {
    let source = fixture_path("multi_server");
    let before = relative_files(&source);

    let output = cytodeploy(&["files", "-s", path_arg(&source), "--json"]);
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["single_server"], false);
    assert_eq!(listing["servers"], serde_json::json!(["server-core", "server-ims"]));
    let generated = listing["generated_files"].as_array().unwrap();
    assert!(generated.contains(&serde_json::json!("server-core/envs/postgres.env")));
    assert!(listing["source_files"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("cytomine.yml")));

    // Listing never touches the folder.
    assert_eq!(relative_files(&source), before);
}

#[test]
fn test_cli_custom_layout() {
    let workspace = Workspace::from_fixture("single_server");
    let target = workspace.path("target");

    let output = cytodeploy(&[
        "--envs-folder",
        "environments",
        "--mount-point",
        "/etc/cm",
        "deploy",
        "-s",
        path_arg(&workspace.source),
        "-t",
        path_arg(&target),
    ]);
    assert!(output.status.success());
    assert!(target.join("environments/core.env").is_file());

    let override_file =
        fs::read_to_string(target.join("docker-compose.override.yml")).unwrap();
    assert!(override_file.contains("env_file: environments/core.env"));
    assert!(override_file.contains(":/etc/cm/etc/cytomine/cytomine-app.yml"));
}
