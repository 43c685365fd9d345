use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::config::discovery::executable_dir;
use crate::config::options::SchemaSource;
use crate::error::{Error, Result};

pub(crate) fn read_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read(path)?;
    serde_json::from_slice(&content)
        .map_err(|err| Error::Parse(format!("failed to parse '{}': {err}", path.display())))
}

pub fn schema_path(source: &SchemaSource) -> Option<PathBuf> {
    match source {
        SchemaSource::Adjacent { file_name } => executable_dir().map(|dir| dir.join(file_name)),
        SchemaSource::File { path } => Some(path.clone()),
        SchemaSource::Inline { .. } | SchemaSource::Disabled => None,
    }
}

/// Loads the schema document, if there is one. A missing schema file is
/// logged and treated as "no schema".
pub fn load_schema(source: &SchemaSource) -> Result<Option<Value>> {
    match source {
        SchemaSource::Disabled => Ok(None),
        SchemaSource::Inline { schema } => Ok(Some(schema.clone())),
        SchemaSource::Adjacent { .. } | SchemaSource::File { .. } => {
            let Some(path) = schema_path(source) else {
                tracing::warn!("cannot locate executable directory; continuing without schema");
                return Ok(None);
            };
            if !path.is_file() {
                tracing::warn!(
                    path = %path.display(),
                    "configuration schema was not found; continuing without schema"
                );
                return Ok(None);
            }
            tracing::debug!(path = %path.display(), "loading configuration schema");
            read_json_file(&path).map(Some)
        }
    }
}

pub fn validate_document(document: &Value, schema: &Value) -> Result<()> {
    let compiled = JSONSchema::compile(schema)
        .map_err(|err| Error::SchemaViolation(format!("invalid configuration schema: {err}")))?;

    if let Err(errors) = compiled.validate(document) {
        let details = errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::SchemaViolation(details));
    }
    Ok(())
}
