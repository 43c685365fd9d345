use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error(
        "no value for path '{}' or environment variable '{}'",
        path.as_deref().unwrap_or("<none>"),
        env.as_deref().unwrap_or("<none>")
    )]
    MissingValue {
        path: Option<String>,
        env: Option<String>,
    },

    #[error("invalid path query: {0}")]
    InvalidQuery(String),

    #[error("cannot coerce {value} into {expected}")]
    Coercion {
        expected: &'static str,
        value: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
