mod common;

use common::{paths, read_dotenv, read_yaml, relative_files, write, Workspace};
use cytodeploy::deployment::{
    clean, deploy, DeployRequest, Deployable, DeploymentError, DeploymentFolder,
    DeploymentOptions,
};
use serde_yaml::Value;
use std::fs;

fn volumes(override_file: &Value, service: &str) -> Vec<String> {
    override_file["services"][service]["volumes"]
        .as_sequence()
        .map(|volumes| {
            volumes
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_single_server_deploy() {
    let workspace = Workspace::from_fixture("single_server");
    let target = workspace.path("target");

    let report = deploy(&DeployRequest::new(&workspace.source).with_target(&target)).unwrap();
    assert!(report.single_server);
    assert_eq!(report.servers, vec!["default"]);

    assert_eq!(
        relative_files(&target),
        paths(&[
            ".env",
            "configs/core/etc/cytomine/cytomine-app.yml",
            "configs/core/etc/cytomine/logback.xml",
            "configs/ims/usr/local/cytom/ims.conf",
            "cytomine.template",
            "cytomine.yml",
            "docker-compose.override.yml",
            "docker-compose.yml",
            "envs/core.env",
            "envs/ims.env",
        ])
    );

    let dotenv = read_dotenv(&target.join(".env"));
    assert_eq!(dotenv["JAVAMELODY_USER"], "admin");
    assert_eq!(dotenv["JAVAMELODY_PASSWORD"], "password");
    assert_eq!(dotenv["URLS_CORE"], "core.cytomine.local");
    assert_eq!(dotenv["URLS_UPLOAD"], "upload.cytomine.local");
    assert_eq!(dotenv.len(), 5);

    let core = read_dotenv(&target.join("envs/core.env"));
    assert_eq!(core["ADMIN_EMAIL"], "admin@cytomine.local");
    assert_eq!(core["CORE_VERSION"], "2023.1");
    assert_eq!(core["JAVAMELODY_USER"], "admin");

    let ims = read_dotenv(&target.join("envs/ims.env"));
    assert_eq!(ims["IMS_URL"], "ims.cytomine.local");
    assert_eq!(ims["IMS_VAR1"].len(), 36);
    assert_eq!(ims["IMS_SECRET"].len(), 24);

    let override_file = read_yaml(&target.join("docker-compose.override.yml"));
    assert!(override_file.get("version").is_none());
    assert_eq!(override_file["services"]["core"]["env_file"], "envs/core.env");
    assert_eq!(override_file["services"]["ims"]["env_file"], "envs/ims.env");
    assert_eq!(
        volumes(&override_file, "core"),
        vec![
            "./configs/core/etc/cytomine/cytomine-app.yml:/cm_configs/etc/cytomine/cytomine-app.yml",
            "./configs/core/etc/cytomine/logback.xml:/cm_configs/etc/cytomine/logback.xml",
        ]
    );
    assert_eq!(
        volumes(&override_file, "ims"),
        vec!["./configs/ims/usr/local/cytom/ims.conf:/cm_configs/usr/local/cytom/ims.conf"]
    );
    assert!(override_file["services"].get("nginx").is_none());
    assert!(override_file["services"].get("postgres").is_none());

    // Compose file, template and static configs are copied verbatim.
    assert_eq!(
        fs::read(target.join("docker-compose.yml")).unwrap(),
        fs::read(workspace.source.join("docker-compose.yml")).unwrap()
    );
    assert_eq!(
        fs::read(target.join("cytomine.template")).unwrap(),
        fs::read(workspace.source.join("cytomine.template")).unwrap()
    );

    // Auto values are exported as constants.
    let merged = read_yaml(&target.join("cytomine.yml"));
    let ims_config = &merged["services"]["default"]["ims"];
    assert!(ims_config.get("auto").is_none());
    assert_eq!(ims_config["constant"]["IMS_VAR1"].as_str().unwrap(), ims["IMS_VAR1"]);
}

#[test]
fn test_source_and_generated_files_are_disjoint() {
    for fixture in ["single_server", "multi_server"] {
        let workspace = Workspace::from_fixture(fixture);
        let folder = DeploymentFolder::new(&workspace.source, DeploymentOptions::default()).unwrap();

        let source = folder.source_files().unwrap();
        let generated = folder.generated_files();
        assert!(source.is_disjoint(&generated), "{} overlaps", fixture);

        for server in folder.server_folders().values() {
            assert!(server
                .source_files()
                .unwrap()
                .is_disjoint(&server.generated_files()));
        }
    }
}

#[test]
fn test_deploy_then_clean_leaves_source_files() {
    for fixture in ["single_server", "multi_server"] {
        let workspace = Workspace::from_fixture(fixture);
        let target = workspace.path("target");
        deploy(&DeployRequest::new(&workspace.source).with_target(&target)).unwrap();

        let folder = DeploymentFolder::new(&workspace.source, DeploymentOptions::default()).unwrap();
        assert_eq!(relative_files(&target), folder.target_files().unwrap());

        let removed = clean(&target, &DeploymentOptions::default()).unwrap();
        assert_eq!(removed.len(), folder.generated_files().len());
        assert_eq!(relative_files(&target), folder.source_files().unwrap());
    }
}

#[test]
fn test_multi_server_deploy() {
    let workspace = Workspace::from_fixture("multi_server");
    let target = workspace.path("target");

    let report = deploy(&DeployRequest::new(&workspace.source).with_target(&target)).unwrap();
    assert!(!report.single_server);
    assert_eq!(report.servers, vec!["server-core", "server-ims"]);

    assert_eq!(
        relative_files(&target),
        paths(&[
            "cytomine.yml",
            "server-core/.env",
            "server-core/configs/core/etc/cytomine/cytomine-app.yml",
            "server-core/docker-compose.override.yml",
            "server-core/docker-compose.yml",
            "server-core/envs/core.env",
            "server-core/envs/postgres.env",
            "server-ims/.env",
            "server-ims/configs/ims/usr/local/cytom/ims.conf",
            "server-ims/docker-compose.override.yml",
            "server-ims/docker-compose.yml",
            "server-ims/envs/ims.env",
        ])
    );

    // Global namespaces land in every server's .env.
    for server in ["server-core", "server-ims"] {
        let dotenv = read_dotenv(&target.join(server).join(".env"));
        assert_eq!(dotenv["URLS_IMS"], "ims.cytomine.local");
    }
    assert_eq!(
        read_dotenv(&target.join("server-core/envs/postgres.env"))["POSTGRES_USER"],
        "docker"
    );

    let override_file = read_yaml(&target.join("server-ims/docker-compose.override.yml"));
    assert_eq!(override_file["services"]["ims"]["env_file"], "envs/ims.env");
    assert_eq!(
        volumes(&override_file, "ims"),
        vec!["./configs/ims/usr/local/cytom/ims.conf:/cm_configs/usr/local/cytom/ims.conf"]
    );
}

#[test]
fn test_redeploy_from_deployed_tree_is_stable() {
    for fixture in ["single_server", "multi_server"] {
        let workspace = Workspace::from_fixture(fixture);
        let first = workspace.path("first");
        let second = workspace.path("second");

        deploy(&DeployRequest::new(&workspace.source).with_target(&first)).unwrap();
        deploy(&DeployRequest::new(&first).with_target(&second)).unwrap();

        let files = relative_files(&first);
        assert_eq!(files, relative_files(&second));
        for file in files {
            assert_eq!(
                fs::read(first.join(&file)).unwrap(),
                fs::read(second.join(&file)).unwrap(),
                "{} differs between deployments",
                file.display()
            );
        }
    }
}

#[test]
fn test_in_place_deploy_is_repeatable() {
    let workspace = Workspace::from_fixture("single_server");
    write(&workspace.source.join("NOTES.md"), "operator notes\n");
    let initial = relative_files(&workspace.source);

    let report = deploy(&DeployRequest::new(&workspace.source)).unwrap();
    assert!(report.in_place);
    let first_env = fs::read(workspace.source.join("envs/ims.env")).unwrap();
    let first_override = fs::read(workspace.source.join("docker-compose.override.yml")).unwrap();

    deploy(&DeployRequest::new(&workspace.source).with_target(&workspace.source)).unwrap();
    assert_eq!(fs::read(workspace.source.join("envs/ims.env")).unwrap(), first_env);
    assert_eq!(
        fs::read(workspace.source.join("docker-compose.override.yml")).unwrap(),
        first_override
    );

    let mut expected = initial.clone();
    expected.extend(paths(&[
        ".env",
        "docker-compose.override.yml",
        "envs/core.env",
        "envs/ims.env",
    ]));
    assert_eq!(relative_files(&workspace.source), expected);

    clean(&workspace.source, &DeploymentOptions::default()).unwrap();
    assert_eq!(relative_files(&workspace.source), initial);
    assert_eq!(
        fs::read_to_string(workspace.source.join("NOTES.md")).unwrap(),
        "operator notes\n"
    );
}

#[test]
fn test_non_empty_target_and_overwrite() {
    let workspace = Workspace::from_fixture("single_server");
    let target = workspace.path("target");
    let request = DeployRequest::new(&workspace.source).with_target(&target);

    deploy(&request).unwrap();
    write(&target.join("backup/db.sql"), "-- dump\n");

    match deploy(&request).err().unwrap() {
        DeploymentError::InvalidTargetDirectory(_) => {}
        e => panic!("Expected InvalidTargetDirectory, got {:?}", e),
    }

    fs::remove_file(target.join("configs/core/etc/cytomine/logback.xml")).unwrap();
    deploy(&request.with_overwrite(true)).unwrap();
    assert!(target.join("configs/core/etc/cytomine/logback.xml").is_file());
    assert_eq!(
        fs::read_to_string(target.join("backup/db.sql")).unwrap(),
        "-- dump\n"
    );
}

#[test]
fn test_allow_list_updates_listed_keys() {
    let workspace = Workspace::from_fixture("single_server");
    write(
        &workspace.source.join("installer.yml"),
        "update_allow_list:\n  - JAVAMELODY_USER\n  - global.javamelody.password\n",
    );
    let target = workspace.path("target");

    deploy(&DeployRequest::new(&workspace.source).with_target(&target)).unwrap();

    let dotenv = read_dotenv(&target.join(".env"));
    assert_eq!(dotenv["JAVAMELODY_USER"], "admin");
    assert_eq!(dotenv["JAVAMELODY_PASSWORD"], "template-password");

    let core = read_dotenv(&target.join("envs/core.env"));
    assert_eq!(core["JAVAMELODY_USER"], "template-admin");
    assert_eq!(core["ADMIN_EMAIL"], "admin@cytomine.local");
    assert!(target.join("installer.yml").is_file());
}

#[test]
fn test_only_declared_services_get_env_files() {
    let workspace = Workspace::from_fixture("single_server");
    write(
        &workspace.source.join("cytomine.yml"),
        "services:\n  default:\n    core:\n      constant:\n        KEY: value\n",
    );
    fs::remove_file(workspace.source.join("cytomine.template")).unwrap();
    let target = workspace.path("target");

    deploy(&DeployRequest::new(&workspace.source).with_target(&target)).unwrap();

    assert!(target.join("envs/core.env").is_file());
    assert!(!target.join("envs/ims.env").exists());
    let override_file = read_yaml(&target.join("docker-compose.override.yml"));
    assert!(override_file["services"]["ims"].get("env_file").is_none());
}

#[test]
fn test_single_server_with_two_servers_is_rejected() {
    let workspace = Workspace::from_fixture("single_server_two_servers");
    let result = DeploymentFolder::new(&workspace.source, DeploymentOptions::default());
    match result.err().unwrap() {
        e @ DeploymentError::InvalidServerConfiguration(_) => assert!(e.is_configuration_error()),
        e => panic!("Expected InvalidServerConfiguration, got {:?}", e),
    }
}

#[test]
fn test_declared_server_without_folder_is_rejected() {
    let workspace = Workspace::from_fixture("multi_server_missing_folder");
    let result = DeploymentFolder::new(&workspace.source, DeploymentOptions::default());
    match result.err().unwrap() {
        DeploymentError::InvalidServerConfiguration(msg) => assert!(msg.contains("server-ims")),
        e => panic!("Expected InvalidServerConfiguration, got {:?}", e),
    }
}

#[test]
fn test_missing_configuration_is_rejected() {
    let workspace = Workspace::from_fixture("single_server");
    fs::remove_file(workspace.source.join("cytomine.yml")).unwrap();
    fs::remove_file(workspace.source.join("cytomine.template")).unwrap();

    let result = deploy(&DeployRequest::new(&workspace.source).with_target(workspace.path("t")));
    match result.err().unwrap() {
        DeploymentError::MissingConfig { .. } => {}
        e => panic!("Expected MissingConfig, got {:?}", e),
    }
    assert!(!workspace.path("t").exists());
}

#[test]
fn test_server_folder_without_compose_is_rejected() {
    let workspace = Workspace::from_fixture("multi_server");
    fs::remove_file(workspace.source.join("server-ims/docker-compose.yml")).unwrap();

    let result = DeploymentFolder::new(&workspace.source, DeploymentOptions::default());
    match result.err().unwrap() {
        DeploymentError::NoDockerCompose(path) => {
            assert!(path.ends_with("server-ims/docker-compose.yml"))
        }
        e => panic!("Expected NoDockerCompose, got {:?}", e),
    }
}
