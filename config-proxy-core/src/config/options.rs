use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::DEFAULT_MAX_LENGTH;

pub const DEFAULT_ENV_LOCATION: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_SCHEMA_FILE_NAME: &str = "config.schema.json";

/// Where the JSON Schema for the configuration document comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaSource {
    /// A file next to the running executable.
    Adjacent { file_name: String },
    File { path: PathBuf },
    Inline { schema: Value },
    Disabled,
}

impl Default for SchemaSource {
    fn default() -> Self {
        Self::Adjacent {
            file_name: DEFAULT_SCHEMA_FILE_NAME.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyOptions {
    /// Environment variable holding an explicit config file path.
    pub env_location: String,
    /// File names tried, in order, inside every search directory.
    pub config_file_names: Vec<String>,
    /// Overrides the working directory + install directory search when non-empty.
    pub search_dirs: Vec<PathBuf>,
    /// When false, a missing config file yields an empty document.
    pub strict: bool,
    pub schema: SchemaSource,
    pub max_query_length: usize,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            env_location: DEFAULT_ENV_LOCATION.to_owned(),
            config_file_names: vec![DEFAULT_CONFIG_FILE_NAME.to_owned()],
            search_dirs: Vec::new(),
            strict: true,
            schema: SchemaSource::default(),
            max_query_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl ProxyOptions {
    pub fn with_env_location(mut self, env_location: impl Into<String>) -> Self {
        self.env_location = env_location.into();
        self
    }

    pub fn with_config_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_file_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_schema(mut self, schema: SchemaSource) -> Self {
        self.schema = schema;
        self
    }
}
