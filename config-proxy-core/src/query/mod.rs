use std::borrow::Cow;

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_LENGTH: usize = 4_096;

/// A compiled path expression such as `database.ports[*]` or `$..host`.
///
/// Expressions follow RFC 9535 JSONPath. The leading `$` may be omitted, in
/// which case the expression is read relative to the document root.
#[derive(Debug)]
pub struct PathQuery {
    source: String,
    path: JsonPath,
}

/// One node selected by a [`PathQuery`], with its JSON pointer location.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch<'a> {
    pub pointer: String,
    pub value: &'a Value,
}

impl PathQuery {
    pub fn parse(expression: &str) -> Result<Self> {
        Self::parse_with_limit(expression, DEFAULT_MAX_LENGTH)
    }

    pub fn parse_with_limit(expression: &str, max_length: usize) -> Result<Self> {
        if expression.len() > max_length {
            return Err(Error::InvalidQuery(format!(
                "path exceeds max length {max_length}"
            )));
        }

        let rooted = rooted(expression.trim());
        let path = JsonPath::parse(&rooted)
            .map_err(|err| Error::InvalidQuery(format!("'{expression}': {err}")))?;

        Ok(Self {
            source: expression.to_owned(),
            path,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluates the query, returning matches in document order.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<QueryMatch<'a>> {
        self.path
            .query_located(root)
            .into_iter()
            .map(|located| QueryMatch {
                pointer: located.location().to_json_pointer(),
                value: located.node(),
            })
            .collect()
    }

    pub fn select_values<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        self.path.query(root).all()
    }
}

impl PartialEq for PathQuery {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl std::fmt::Display for PathQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for PathQuery {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

// `database.host` -> `$.database.host`, `[0]` -> `$[0]`, `..x` -> `$..x`.
fn rooted(expression: &str) -> Cow<'_, str> {
    if expression.is_empty() {
        Cow::Borrowed("$")
    } else if expression.starts_with('$') {
        Cow::Borrowed(expression)
    } else if expression.starts_with('[') || expression.starts_with('.') {
        Cow::Owned(format!("${expression}"))
    } else {
        Cow::Owned(format!("$.{expression}"))
    }
}
