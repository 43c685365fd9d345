use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `warn` globally and `default_level` for this crate.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,config_proxy_core={default_level}"))
    });

    // A host application may already own the global subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
