pub mod typed;

use std::env::VarError;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ConfigProxy, ConfigStore, ListMode, StoreProvider};
use crate::error::{Error, Result};

pub use typed::{
    FromConfig, IntProperty, ListOfIntsProperty, ListOfListsProperty, ListOfObjectsProperty,
    ListOfStringsProperty, StringProperty, TypedProperty,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Environment,
    Config,
    Default,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub value: Value,
    pub source: ValueSource,
}

/// One configuration value, resolved in order from an environment variable,
/// a path query against the config document, then a default.
///
/// ```no_run
/// use config_proxy_core::Property;
///
/// let host = Property::new()
///     .with_path("database.host")
///     .with_env("DB_HOST")
///     .with_default("localhost");
/// let value = host.value()?;
/// # Ok::<(), config_proxy_core::Error>(())
/// ```
#[derive(Clone)]
pub struct Property {
    path: Option<String>,
    env: Option<String>,
    default: Option<Value>,
    provider: Arc<dyn StoreProvider>,
}

impl Property {
    pub fn new() -> Self {
        Self {
            path: None,
            env: None,
            default: None,
            provider: ConfigProxy::global(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn StoreProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_store(self, store: Arc<ConfigStore>) -> Self {
        self.with_provider(Arc::new(store))
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn value(&self) -> Result<Value> {
        self.resolve(ListMode::Auto, false)
    }

    pub fn require(&self) -> Result<Value> {
        self.resolve(ListMode::Auto, true)
    }

    pub fn resolve(&self, mode: ListMode, forced: bool) -> Result<Value> {
        self.resolve_with_source(mode, forced)
            .map(|resolved| resolved.value)
    }

    pub fn resolve_with_source(&self, mode: ListMode, forced: bool) -> Result<ResolvedValue> {
        self.resolve_shaped(mode, forced, std::convert::identity)
    }

    /// Like [`resolve_with_source`](Self::resolve_with_source), but reshapes the
    /// config value with `shape` before deciding whether it is present.
    pub(crate) fn resolve_shaped(
        &self,
        mode: ListMode,
        forced: bool,
        shape: fn(Value) -> Value,
    ) -> Result<ResolvedValue> {
        if let Some(raw) = self.env_override() {
            return Ok(ResolvedValue {
                value: Value::String(raw),
                source: ValueSource::Environment,
            });
        }

        let store = self.provider.store()?;
        if let Some(path) = &self.path {
            let value = shape(store.get_value(path, mode)?);
            if is_present(&value) {
                return Ok(ResolvedValue {
                    value,
                    source: ValueSource::Config,
                });
            }
        }

        if let Some(default) = self.default.as_ref().filter(|value| !value.is_null()) {
            return Ok(ResolvedValue {
                value: default.clone(),
                source: ValueSource::Default,
            });
        }

        if forced {
            return Err(Error::MissingValue {
                path: self.path.clone(),
                env: self.env.clone(),
            });
        }

        let value = match mode {
            ListMode::List => Value::Array(Vec::new()),
            ListMode::Auto | ListMode::First => Value::Null,
        };
        Ok(ResolvedValue {
            value,
            source: ValueSource::Missing,
        })
    }

    fn env_override(&self) -> Option<String> {
        let name = self.env.as_deref()?;
        match std::env::var(name) {
            Ok(raw) if !raw.is_empty() => {
                tracing::debug!(
                    env = name,
                    path = ?self.path,
                    "environment overrides configuration"
                );
                Some(raw)
            }
            Ok(_) | Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => {
                tracing::warn!(env = name, "environment variable is not unicode; ignoring it");
                None
            }
        }
    }
}

impl Default for Property {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("path", &self.path)
            .field("env", &self.env)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

// Empty strings and empty collections count as "not configured"; 0 and
// false are real values.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
