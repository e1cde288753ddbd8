use std::sync::OnceLock;

use anyhow::Result;
use serde::{Deserialize, Serialize};

static USER_CONFIG: OnceLock<UserConfig> = OnceLock::new();

pub const USER_CONFIG_LOCATION: &str = "./.vista/config.yaml";

/// What to do when a single view cannot be serialized (for example, its body
/// collides with every delimiter). `Abort` fails the whole dump; `Skip`
/// leaves that one view out with a warning and keeps going.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnSerializeError {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DumpOptions {
    #[serde(default)]
    pub on_serialize_error: OnSerializeError,

    /// Extra object names to exclude from dumps, on top of the built-in
    /// bookkeeping names. Matched by exact unqualified name.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub dump_options: DumpOptions,
}

impl UserConfig {
    pub fn init(file_path: &str) -> Result<()> {
        let user_config = serde_yaml::from_str(&std::fs::read_to_string(file_path)?)?;
        USER_CONFIG
            .set(user_config)
            .expect("This should only be called by one thread in this application");

        Ok(())
    }

    /// The loaded config, or the defaults when no config file was present.
    pub fn get_global() -> &'static UserConfig {
        USER_CONFIG.get_or_init(UserConfig::default)
    }
}
