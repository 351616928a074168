use super::errors::{ConfigError, ConfigResult};
use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_SECRET_LENGTH: usize = 32;
const SECRET_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Declaration of a value generated when the configuration is loaded.
///
/// Accepted forms in the `auto` section:
/// ```yaml
/// auto:
///   ID: random_uuid
///   TOKEN: { type: secret, length: 48 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AutoValue {
    Named(String),
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        length: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generator {
    RandomUuid,
    Secret { length: usize },
}

impl Generator {
    pub fn from_auto_value(key: &str, value: &AutoValue) -> ConfigResult<Self> {
        let (kind, length) = match value {
            AutoValue::Named(kind) => (kind.as_str(), None),
            AutoValue::Detailed { kind, length } => (kind.as_str(), *length),
        };

        match kind {
            "random_uuid" | "uuid" => Ok(Generator::RandomUuid),
            "secret" | "random_string" => Ok(Generator::Secret {
                length: length.unwrap_or(DEFAULT_SECRET_LENGTH),
            }),
            other => Err(ConfigError::UnknownGenerator {
                key: key.to_string(),
                generator: other.to_string(),
            }),
        }
    }

    pub fn generate(&self) -> String {
        match self {
            Generator::RandomUuid => Uuid::new_v4().to_string(),
            Generator::Secret { length } => {
                let mut rng = rand::thread_rng();
                (0..*length)
                    .map(|_| SECRET_ALPHABET[rng.gen_range(0..SECRET_ALPHABET.len())] as char)
                    .collect()
            }
        }
    }
}
