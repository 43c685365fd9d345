use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::options::ProxyOptions;
use crate::config::schema::{load_schema, read_json_file, validate_document};
use crate::error::{Error, Result};
use crate::query::{PathQuery, QueryMatch, DEFAULT_MAX_LENGTH};

/// How many matches a path query should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// One match returns the bare value, zero or several return an array.
    #[default]
    Auto,
    List,
    First,
}

impl From<Option<bool>> for ListMode {
    fn from(use_list: Option<bool>) -> Self {
        match use_list {
            None => Self::Auto,
            Some(true) => Self::List,
            Some(false) => Self::First,
        }
    }
}

/// A loaded, validated configuration document. Immutable after construction.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: Option<PathBuf>,
    document: Value,
    schema: Option<Value>,
    max_query_length: usize,
}

impl ConfigStore {
    pub fn create(path: Option<&Path>, options: &ProxyOptions) -> Result<Self> {
        let Some(path) = path else {
            if options.strict {
                return Err(Error::NotFound(
                    "no configuration file path was given".to_owned(),
                ));
            }
            tracing::debug!("creating empty configuration document");
            return Ok(Self {
                config_path: None,
                document: Value::Object(Map::new()),
                schema: None,
                max_query_length: options.max_query_length,
            });
        };

        if !path.is_file() {
            return Err(Error::NotFound(format!(
                "configuration file not found in {}",
                path.display()
            )));
        }

        let document = read_json_file(path)?;
        let schema = load_schema(&options.schema)?;
        if let Some(schema) = &schema {
            validate_document(&document, schema).map_err(|err| match err {
                Error::SchemaViolation(details) => Error::SchemaViolation(format!(
                    "'{}' does not match schema: {details}",
                    path.display()
                )),
                other => other,
            })?;
        }
        tracing::info!(
            path = %path.display(),
            validated = schema.is_some(),
            "loaded configuration"
        );

        Ok(Self {
            config_path: Some(path.to_path_buf()),
            document,
            schema,
            max_query_length: options.max_query_length,
        })
    }

    /// Builds a store from an in-memory document, validating it when a
    /// schema is given.
    pub fn from_value(document: Value, schema: Option<Value>) -> Result<Self> {
        if let Some(schema) = &schema {
            validate_document(&document, schema)?;
        }
        Ok(Self {
            config_path: None,
            document,
            schema,
            max_query_length: DEFAULT_MAX_LENGTH,
        })
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    pub fn query(&self, path: &str) -> Result<Vec<QueryMatch<'_>>> {
        let query = PathQuery::parse_with_limit(path, self.max_query_length)?;
        Ok(query.select(&self.document))
    }

    pub fn get_value(&self, path: &str, mode: ListMode) -> Result<Value> {
        let mut values = self
            .query(path)?
            .into_iter()
            .map(|matched| matched.value.clone())
            .collect::<Vec<_>>();

        let value = match mode {
            ListMode::List => Value::Array(values),
            ListMode::First => {
                if values.is_empty() {
                    Value::Null
                } else {
                    values.swap_remove(0)
                }
            }
            ListMode::Auto => match values.len() {
                0 => Value::Null,
                1 => values.remove(0),
                _ => Value::Array(values),
            },
        };
        Ok(value)
    }
}
