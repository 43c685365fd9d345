use std::sync::{Arc, Mutex, OnceLock};

use arc_swap::ArcSwapOption;

use crate::config::discovery::discover;
use crate::config::options::ProxyOptions;
use crate::config::store::ConfigStore;
use crate::error::Result;

/// Anything that can hand out the configuration store a property reads from.
pub trait StoreProvider: Send + Sync {
    fn store(&self) -> Result<Arc<ConfigStore>>;
}

/// A fixed store, for injection.
impl StoreProvider for Arc<ConfigStore> {
    fn store(&self) -> Result<Arc<ConfigStore>> {
        Ok(Arc::clone(self))
    }
}

/// Lazily discovers, loads and caches one [`ConfigStore`].
///
/// The cached store is swapped atomically, so readers racing a
/// [`reload`](ConfigProxy::reload) observe either the old or the new store.
pub struct ConfigProxy {
    options: ProxyOptions,
    current: ArcSwapOption<ConfigStore>,
    init: Mutex<()>,
}

impl ConfigProxy {
    pub fn new(options: ProxyOptions) -> Self {
        Self {
            options,
            current: ArcSwapOption::empty(),
            init: Mutex::new(()),
        }
    }

    /// Process-wide proxy using [`ProxyOptions::default`].
    pub fn global() -> Arc<ConfigProxy> {
        static GLOBAL: OnceLock<Arc<ConfigProxy>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ConfigProxy::new(ProxyOptions::default()))))
    }

    pub fn options(&self) -> &ProxyOptions {
        &self.options
    }

    /// The cached store, without triggering discovery.
    pub fn current(&self) -> Option<Arc<ConfigStore>> {
        self.current.load_full()
    }

    pub fn get_or_create(&self) -> Result<Arc<ConfigStore>> {
        if let Some(store) = self.current.load_full() {
            return Ok(store);
        }

        let _guard = self
            .init
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have finished loading while we waited.
        if let Some(store) = self.current.load_full() {
            return Ok(store);
        }

        let location = discover(&self.options)?;
        let path = location.as_ref().map(|location| location.path.as_path());
        let store = Arc::new(ConfigStore::create(path, &self.options)?);
        self.current.store(Some(Arc::clone(&store)));
        Ok(store)
    }

    /// Drops the cached store and reads the configuration from disk again.
    pub fn reload(&self) -> Result<Arc<ConfigStore>> {
        {
            let _guard = self
                .init
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            self.current.store(None);
        }
        tracing::info!(env = %self.options.env_location, "reloading configuration");
        self.get_or_create()
    }
}

impl Default for ConfigProxy {
    fn default() -> Self {
        Self::new(ProxyOptions::default())
    }
}

impl std::fmt::Debug for ConfigProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProxy")
            .field("options", &self.options)
            .field("loaded", &self.current.load().is_some())
            .finish()
    }
}

impl StoreProvider for ConfigProxy {
    fn store(&self) -> Result<Arc<ConfigStore>> {
        self.get_or_create()
    }
}
