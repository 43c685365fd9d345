use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::{ConfigStore, ListMode, StoreProvider};
use crate::error::{Error, Result};
use crate::property::{Property, ResolvedValue};

/// A value shape a [`TypedProperty`] can produce.
///
/// Environment overrides always arrive as strings, so every shape accepts a
/// string form too: integers parse it, lists take a JSON array or a
/// comma-separated list.
pub trait FromConfig: Sized {
    const MODE: ListMode;
    const EXPECTED: &'static str;

    /// Reshapes a value read from the config document before it is checked
    /// for presence.
    fn shape(value: Value) -> Value {
        value
    }

    fn from_config(value: Value) -> Result<Self>;
}

fn coercion_error(expected: &'static str, value: &Value) -> Error {
    Error::Coercion {
        expected,
        value: value.to_string(),
    }
}

impl FromConfig for String {
    const MODE: ListMode = ListMode::First;
    const EXPECTED: &'static str = "string";

    fn from_config(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(text),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(coercion_error(Self::EXPECTED, &other)),
        }
    }
}

impl FromConfig for i64 {
    const MODE: ListMode = ListMode::First;
    const EXPECTED: &'static str = "integer";

    fn from_config(value: Value) -> Result<Self> {
        let parsed = match &value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| coercion_error(Self::EXPECTED, &value))
    }
}

fn list_items(value: Value, expected: &'static str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') {
                return serde_json::from_str::<Vec<Value>>(trimmed).map_err(|_| Error::Coercion {
                    expected,
                    value: text.clone(),
                });
            }
            Ok(trimmed
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_owned()))
                .collect())
        }
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

// A path like `database.ports` matches the list itself rather than its items;
// a single match that already has the list shape is taken as the list.
fn unwrap_single_match(value: Value, nested: bool) -> Value {
    let mut items = match value {
        Value::Array(items) => items,
        other => return other,
    };
    let unwrap = match items.as_slice() {
        [Value::Array(inner)] => !nested || inner.iter().all(Value::is_array),
        _ => false,
    };
    if unwrap {
        if let Some(inner) = items.pop() {
            return inner;
        }
    }
    Value::Array(items)
}

fn coerce_items<T, F>(value: Value, expected: &'static str, item: F) -> Result<Vec<T>>
where
    F: Fn(Value) -> Result<T>,
{
    list_items(value, expected)?.into_iter().map(item).collect()
}

impl FromConfig for Vec<i64> {
    const MODE: ListMode = ListMode::List;
    const EXPECTED: &'static str = "list of integers";

    fn shape(value: Value) -> Value {
        unwrap_single_match(value, false)
    }

    fn from_config(value: Value) -> Result<Self> {
        coerce_items(value, Self::EXPECTED, i64::from_config)
    }
}

impl FromConfig for Vec<String> {
    const MODE: ListMode = ListMode::List;
    const EXPECTED: &'static str = "list of strings";

    fn shape(value: Value) -> Value {
        unwrap_single_match(value, false)
    }

    fn from_config(value: Value) -> Result<Self> {
        coerce_items(value, Self::EXPECTED, String::from_config)
    }
}

impl FromConfig for Vec<Map<String, Value>> {
    const MODE: ListMode = ListMode::List;
    const EXPECTED: &'static str = "list of objects";

    fn shape(value: Value) -> Value {
        unwrap_single_match(value, false)
    }

    fn from_config(value: Value) -> Result<Self> {
        coerce_items(value, Self::EXPECTED, |item| match item {
            Value::Object(map) => Ok(map),
            other => Err(coercion_error("object", &other)),
        })
    }
}

impl FromConfig for Vec<Vec<Value>> {
    const MODE: ListMode = ListMode::List;
    const EXPECTED: &'static str = "list of lists";

    fn shape(value: Value) -> Value {
        unwrap_single_match(value, true)
    }

    fn from_config(value: Value) -> Result<Self> {
        coerce_items(value, Self::EXPECTED, |item| match item {
            Value::Array(items) => Ok(items),
            other => Err(coercion_error("list", &other)),
        })
    }
}

/// A [`Property`] pinned to one value shape.
pub struct TypedProperty<T> {
    inner: Property,
    shape: PhantomData<fn() -> T>,
}

pub type StringProperty = TypedProperty<String>;
pub type IntProperty = TypedProperty<i64>;
pub type ListOfIntsProperty = TypedProperty<Vec<i64>>;
pub type ListOfStringsProperty = TypedProperty<Vec<String>>;
pub type ListOfObjectsProperty = TypedProperty<Vec<Map<String, Value>>>;
pub type ListOfListsProperty = TypedProperty<Vec<Vec<Value>>>;

impl<T: FromConfig> TypedProperty<T> {
    pub fn new() -> Self {
        Self::from(Property::new())
    }

    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.map(|inner| inner.with_path(path))
    }

    pub fn with_env(self, env: impl Into<String>) -> Self {
        self.map(|inner| inner.with_env(env))
    }

    pub fn with_default(self, default: impl Into<Value>) -> Self {
        self.map(|inner| inner.with_default(default))
    }

    pub fn with_provider(self, provider: Arc<dyn StoreProvider>) -> Self {
        self.map(|inner| inner.with_provider(provider))
    }

    pub fn with_store(self, store: Arc<ConfigStore>) -> Self {
        self.map(|inner| inner.with_store(store))
    }

    pub fn property(&self) -> &Property {
        &self.inner
    }

    /// Absent scalars are `None`; absent lists are an empty list.
    pub fn value(&self) -> Result<Option<T>> {
        let resolved = self.resolve(false)?.value;
        if resolved.is_null() {
            return Ok(None);
        }
        T::from_config(resolved).map(Some)
    }

    pub fn require(&self) -> Result<T> {
        T::from_config(self.resolve(true)?.value)
    }

    pub fn resolve_with_source(&self) -> Result<ResolvedValue> {
        self.resolve(false)
    }

    fn resolve(&self, forced: bool) -> Result<ResolvedValue> {
        self.inner.resolve_shaped(T::MODE, forced, T::shape)
    }

    fn map(self, update: impl FnOnce(Property) -> Property) -> Self {
        Self::from(update(self.inner))
    }
}

impl<T> From<Property> for TypedProperty<T> {
    fn from(inner: Property) -> Self {
        Self {
            inner,
            shape: PhantomData,
        }
    }
}

impl<T: FromConfig> Default for TypedProperty<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedProperty<T> {
    fn clone(&self) -> Self {
        Self::from(self.inner.clone())
    }
}

impl<T> std::fmt::Debug for TypedProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedProperty").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{
        IntProperty, ListOfIntsProperty, ListOfListsProperty, ListOfObjectsProperty,
        ListOfStringsProperty, StringProperty,
    };
    use crate::config::ConfigStore;
    use crate::error::Error;
    use crate::property::ValueSource;

    fn store() -> Arc<ConfigStore> {
        Arc::new(
            ConfigStore::from_value(
                json!({
                    "database": {"host": "db.internal", "port": 5432, "ports": [1, 2, 3]},
                    "hosts": ["a", "b"],
                    "services": [{"name": "api"}, {"name": "worker"}],
                    "matrix": [[1, 2], [3, 4]]
                }),
                None,
            )
            .expect("store should build"),
        )
    }

    #[test]
    fn scalar_properties_take_the_first_match() {
        let host = StringProperty::new().with_path("database.host").with_store(store());
        let port = IntProperty::new().with_path("database.port").with_store(store());
        let first_port = IntProperty::new()
            .with_path("database.ports[*]")
            .with_store(store());

        assert_eq!(host.value().expect("value"), Some("db.internal".to_owned()));
        assert_eq!(port.require().expect("value"), 5432);
        assert_eq!(first_port.require().expect("value"), 1);
    }

    #[test]
    fn list_properties_collect_every_match() {
        let ports = ListOfIntsProperty::new()
            .with_path("database.ports[*]")
            .with_store(store());
        let names = ListOfStringsProperty::new()
            .with_path("services[*].name")
            .with_store(store());

        assert_eq!(ports.require().expect("value"), vec![1, 2, 3]);
        assert_eq!(
            names.require().expect("value"),
            vec!["api".to_owned(), "worker".to_owned()]
        );
    }

    #[test]
    fn path_to_the_list_itself_is_unwrapped() {
        let ports = ListOfIntsProperty::new()
            .with_path("database.ports")
            .with_store(store());
        let matrix = ListOfListsProperty::new()
            .with_path("matrix")
            .with_store(store());
        let rows = ListOfListsProperty::new()
            .with_path("matrix[*]")
            .with_store(store());

        assert_eq!(ports.require().expect("value"), vec![1, 2, 3]);
        assert_eq!(
            matrix.require().expect("value"),
            vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]]
        );
        assert_eq!(rows.require().expect("value").len(), 2);
    }

    #[test]
    fn list_of_objects() {
        let services = ListOfObjectsProperty::new()
            .with_path("services")
            .with_store(store());

        let value = services.require().expect("value");
        assert_eq!(value.len(), 2);
        assert_eq!(value[1].get("name"), Some(&json!("worker")));
    }

    #[test]
    fn environment_strings_are_coerced() {
        std::env::set_var("CONFIG_PROXY_TEST_TYPED_PORT", " 6543 ");
        std::env::set_var("CONFIG_PROXY_TEST_TYPED_PORTS", "7, 8,9");
        std::env::set_var("CONFIG_PROXY_TEST_TYPED_SERVICES", r#"[{"name": "env"}]"#);

        let port = IntProperty::new()
            .with_path("database.port")
            .with_env("CONFIG_PROXY_TEST_TYPED_PORT")
            .with_store(store());
        let ports = ListOfIntsProperty::new()
            .with_path("database.ports[*]")
            .with_env("CONFIG_PROXY_TEST_TYPED_PORTS")
            .with_store(store());
        let services = ListOfObjectsProperty::new()
            .with_path("services")
            .with_env("CONFIG_PROXY_TEST_TYPED_SERVICES")
            .with_store(store());

        assert_eq!(port.require().expect("value"), 6543);
        assert_eq!(ports.require().expect("value"), vec![7, 8, 9]);
        assert_eq!(
            services.require().expect("value")[0].get("name"),
            Some(&json!("env"))
        );

        std::env::remove_var("CONFIG_PROXY_TEST_TYPED_PORT");
        std::env::remove_var("CONFIG_PROXY_TEST_TYPED_PORTS");
        std::env::remove_var("CONFIG_PROXY_TEST_TYPED_SERVICES");
    }

    #[test]
    fn uncoercible_values_are_errors() {
        std::env::set_var("CONFIG_PROXY_TEST_TYPED_BAD_PORT", "not-a-port");
        let port = IntProperty::new()
            .with_env("CONFIG_PROXY_TEST_TYPED_BAD_PORT")
            .with_store(store());
        let host_as_int = IntProperty::new()
            .with_path("database.host")
            .with_store(store());

        assert!(matches!(
            port.value(),
            Err(Error::Coercion { expected: "integer", .. })
        ));
        assert!(matches!(host_as_int.value(), Err(Error::Coercion { .. })));
        std::env::remove_var("CONFIG_PROXY_TEST_TYPED_BAD_PORT");
    }

    #[test]
    fn empty_list_in_config_is_absent() {
        let store = Arc::new(
            ConfigStore::from_value(json!({"m": [], "ports": []}), None).expect("store"),
        );
        let matrix = ListOfListsProperty::new().with_path("m").with_store(store.clone());
        let ports = ListOfIntsProperty::new()
            .with_path("ports")
            .with_default(json!([5432]))
            .with_store(store.clone());
        let bare_ports = ListOfIntsProperty::new().with_path("ports").with_store(store);

        assert_eq!(matrix.value().expect("value"), Some(Vec::new()));
        assert_eq!(ports.require().expect("value"), vec![5432]);
        assert_eq!(
            ports.resolve_with_source().expect("resolve").source,
            ValueSource::Default
        );
        assert!(matches!(bare_ports.require(), Err(Error::MissingValue { .. })));
    }

    #[test]
    fn absent_values_and_defaults() {
        let user = StringProperty::new()
            .with_path("database.user")
            .with_store(store());
        let tags = ListOfStringsProperty::new()
            .with_path("tags[*]")
            .with_store(store());
        let timeout = IntProperty::new()
            .with_path("database.timeout")
            .with_default(30)
            .with_store(store());

        assert_eq!(user.value().expect("value"), None);
        assert_eq!(tags.value().expect("value"), Some(Vec::new()));
        assert_eq!(timeout.require().expect("value"), 30);
        assert!(matches!(user.require(), Err(Error::MissingValue { .. })));
    }
}
