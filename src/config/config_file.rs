use super::{
    auto::{AutoValue, Generator},
    env_store::{EnvScope, EnvStore, EnvVars, MergePolicy},
    errors::{ConfigError, ConfigResult},
};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    global: BTreeMap<String, Option<RawNamespace>>,
    #[serde(default)]
    services: BTreeMap<String, Option<BTreeMap<String, Option<RawNamespace>>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNamespace {
    #[serde(default)]
    constant: BTreeMap<String, Value>,
    #[serde(default)]
    auto: BTreeMap<String, AutoValue>,
}

#[derive(Serialize)]
struct ExportConfig<'a> {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    global: BTreeMap<&'a str, ExportNamespace<'a>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    services: BTreeMap<&'a str, BTreeMap<&'a str, ExportNamespace<'a>>>,
}

#[derive(Serialize)]
struct ExportNamespace<'a> {
    constant: &'a EnvVars,
}

/// A Cytomine configuration file (`cytomine.yml`, `cytomine.template`).
///
/// Values declared under `auto` are generated at load time and afterwards behave
/// exactly like `constant` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    directory: PathBuf,
    filename: String,
    global_envs: EnvStore,
    servers: BTreeMap<String, EnvStore>,
}

impl ConfigFile {
    /// An empty configuration bound to `directory/filename`.
    pub fn empty(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            global_envs: EnvStore::new(),
            servers: BTreeMap::new(),
        }
    }

    /// Loads `directory/filename`. A missing file yields an empty configuration.
    pub fn load(directory: impl AsRef<Path>, filename: &str) -> ConfigResult<Self> {
        let directory = directory.as_ref();
        let path = directory.join(filename);

        if !path.is_file() {
            debug!("{} not found, using an empty configuration", path.display());
            return Ok(Self::empty(directory, filename));
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config = Self::parse(&path, &content)?;
        config.directory = directory.to_path_buf();
        config.filename = filename.to_string();
        Ok(config)
    }

    /// Parses configuration content. `path` is only used in error messages and to name
    /// the resulting file.
    pub fn parse(path: &Path, content: &str) -> ConfigResult<Self> {
        let yaml_error = |source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        };

        let value: Value = serde_yaml::from_str(content).map_err(yaml_error)?;
        let raw: RawConfig = if value.is_null() {
            RawConfig::default()
        } else {
            serde_yaml::from_value(value).map_err(yaml_error)?
        };

        let mut config = Self::empty(
            path.parent().unwrap_or_else(|| Path::new("")),
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        for (namespace, raw_namespace) in raw.global {
            let key_path = format!("global.{}", namespace);
            let vars = resolve_namespace(path, &key_path, raw_namespace.unwrap_or_default())?;
            *config.global_envs.add_namespace(namespace) = vars;
        }

        for (server, namespaces) in raw.services {
            let store = config.servers.entry(server.clone()).or_default();
            for (namespace, raw_namespace) in namespaces.unwrap_or_default() {
                let key_path = format!("services.{}.{}", server, namespace);
                let vars =
                    resolve_namespace(path, &key_path, raw_namespace.unwrap_or_default())?;
                *store.add_namespace(namespace) = vars;
            }
        }

        Ok(config)
    }

    /// Combines a working and a template configuration. The result keeps the location
    /// of the working configuration.
    pub fn merge(working: &ConfigFile, template: &ConfigFile, policy: &MergePolicy) -> ConfigFile {
        let global_envs = EnvStore::merge(
            &working.global_envs,
            &template.global_envs,
            policy,
            EnvScope::Global,
        );

        let empty = EnvStore::new();
        let mut servers = BTreeMap::new();
        for server in working.servers().chain(template.servers()) {
            if servers.contains_key(server) {
                continue;
            }
            let merged = EnvStore::merge(
                working.server_store(server).unwrap_or(&empty),
                template.server_store(server).unwrap_or(&empty),
                policy,
                EnvScope::Server(server),
            );
            servers.insert(server.to_string(), merged);
        }

        debug!(
            "Merged {} into {} ({} server entries)",
            template.filename,
            working.filename,
            servers.len()
        );

        ConfigFile {
            directory: working.directory.clone(),
            filename: working.filename.clone(),
            global_envs,
            servers,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn filepath(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    pub fn exists(&self) -> bool {
        self.filepath().is_file()
    }

    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    pub fn has_server(&self, server: &str) -> bool {
        self.servers.contains_key(server)
    }

    pub fn server_store(&self, server: &str) -> Option<&EnvStore> {
        self.servers.get(server)
    }

    pub fn global_envs(&self) -> &EnvStore {
        &self.global_envs
    }

    /// Serializes the configuration with every value under `constant`.
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        let export = ExportConfig {
            global: export_store(&self.global_envs),
            services: self
                .servers
                .iter()
                .map(|(server, store)| (server.as_str(), export_store(store)))
                .collect(),
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    /// Writes the configuration to `directory` under its own filename.
    pub fn write_to(&self, directory: impl AsRef<Path>) -> ConfigResult<PathBuf> {
        let path = directory.as_ref().join(&self.filename);
        let content = self.to_yaml_string()?;
        fs::write(&path, content).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn export_store(store: &EnvStore) -> BTreeMap<&str, ExportNamespace<'_>> {
    store
        .as_map()
        .iter()
        .map(|(namespace, vars)| (namespace.as_str(), ExportNamespace { constant: vars }))
        .collect()
}

fn resolve_namespace(path: &Path, key_path: &str, raw: RawNamespace) -> ConfigResult<EnvVars> {
    let mut vars = EnvVars::new();

    for (key, value) in raw.constant {
        let value = scalar_to_string(&value).ok_or_else(|| {
            ConfigError::invalid_value(
                path,
                format!("{}.{}", key_path, key),
                "only scalar values are supported",
            )
        })?;
        vars.insert(key, value);
    }

    for (key, auto) in raw.auto {
        if vars.contains_key(&key) {
            continue;
        }
        let full_key = format!("{}.{}", key_path, key);
        let generator = Generator::from_auto_value(&full_key, &auto)?;
        debug!("Generating value for {} ({:?})", full_key, generator);
        vars.insert(key, generator.generate());
    }

    Ok(vars)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
