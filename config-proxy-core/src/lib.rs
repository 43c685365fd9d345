//! JSON configuration access: file discovery, optional JSON Schema
//! validation, path queries and properties resolved from environment
//! variables, the config document or defaults.

pub mod config;
pub mod error;
pub mod logging;
pub mod property;
pub mod query;

pub use config::{
    ConfigLocation, ConfigProxy, ConfigSource, ConfigStore, ListMode, ProxyOptions, SchemaSource,
    StoreProvider,
};
pub use error::{Error, Result};
pub use property::{
    FromConfig, IntProperty, ListOfIntsProperty, ListOfListsProperty, ListOfObjectsProperty,
    ListOfStringsProperty, Property, ResolvedValue, StringProperty, TypedProperty, ValueSource,
};
pub use query::{PathQuery, QueryMatch};
