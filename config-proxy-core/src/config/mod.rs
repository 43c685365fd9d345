pub mod discovery;
pub mod options;
pub mod proxy;
pub mod schema;
pub mod store;

pub use discovery::{discover, ConfigLocation, ConfigSource};
pub use options::{ProxyOptions, SchemaSource};
pub use proxy::{ConfigProxy, StoreProvider};
pub use schema::{load_schema, validate_document};
pub use store::{ConfigStore, ListMode};
