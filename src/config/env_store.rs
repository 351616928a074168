use std::collections::{BTreeMap, BTreeSet};

pub type EnvVars = BTreeMap<String, String>;

/// Where a namespace lives in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScope<'a> {
    Global,
    Server(&'a str),
}

/// How template values are combined with working values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Working values always win; the template only fills gaps.
    #[default]
    Preserve,
    /// Like `Preserve`, but template values replace working values for listed keys.
    AllowList(BTreeSet<String>),
}

impl MergePolicy {
    /// `AllowList` when at least one key is given, `Preserve` otherwise.
    pub fn from_allow_list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            MergePolicy::Preserve
        } else {
            MergePolicy::AllowList(keys)
        }
    }

    /// Whether a template value replaces an existing working value.
    ///
    /// Allow-list entries may name the bare key, `namespace.KEY`,
    /// `global.namespace.KEY` or `services.server.namespace.KEY`.
    pub fn template_overrides(&self, scope: EnvScope<'_>, namespace: &str, key: &str) -> bool {
        let allowed = match self {
            MergePolicy::Preserve => return false,
            MergePolicy::AllowList(allowed) => allowed,
        };

        let scoped = match scope {
            EnvScope::Global => format!("global.{}.{}", namespace, key),
            EnvScope::Server(server) => format!("services.{}.{}.{}", server, namespace, key),
        };

        allowed.contains(key)
            || allowed.contains(&format!("{}.{}", namespace, key))
            || allowed.contains(&scoped)
    }
}

/// Environment variables grouped by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvStore {
    namespaces: BTreeMap<String, EnvVars>,
}

impl EnvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    pub fn get_namespace_envs(&self, namespace: &str) -> Option<&EnvVars> {
        self.namespaces.get(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Registers a namespace, keeping existing variables if it is already present.
    pub fn add_namespace(&mut self, namespace: impl Into<String>) -> &mut EnvVars {
        self.namespaces.entry(namespace.into()).or_default()
    }

    pub fn set(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.add_namespace(namespace).insert(key.into(), value.into());
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, EnvVars> {
        &self.namespaces
    }

    /// Combines a working and a template store belonging to the same scope.
    pub fn merge(
        working: &EnvStore,
        template: &EnvStore,
        policy: &MergePolicy,
        scope: EnvScope<'_>,
    ) -> EnvStore {
        let mut merged = working.clone();

        for (namespace, template_vars) in &template.namespaces {
            let merged_vars = merged.add_namespace(namespace.as_str());
            for (key, value) in template_vars {
                let replace = !merged_vars.contains_key(key)
                    || policy.template_overrides(scope, namespace, key);
                if replace {
                    merged_vars.insert(key.clone(), value.clone());
                }
            }
        }

        merged
    }
}
