use std::path::{Path, PathBuf};

use crate::config::options::ProxyOptions;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Environment,
    WorkingDirectory,
    InstallDirectory,
    SearchDirectory,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::WorkingDirectory => write!(f, "working directory"),
            ConfigSource::InstallDirectory => write!(f, "install directory"),
            ConfigSource::SearchDirectory => write!(f, "search directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Directory of the running executable.
pub fn executable_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

/// Parent of the executable's directory, e.g. `target/` for `target/debug/app`.
pub fn install_dir() -> Option<PathBuf> {
    let exe_dir = executable_dir()?;
    Some(
        exe_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(exe_dir),
    )
}

/// Finds the configuration file.
///
/// Order: the `env_location` variable (used verbatim when non-empty), then
/// every configured file name in the working directory, then in the install
/// directory. `search_dirs` replaces the two directories when set.
/// Returns `Ok(None)` only in non-strict mode.
pub fn discover(options: &ProxyOptions) -> Result<Option<ConfigLocation>> {
    if let Some(path) = env_path(&options.env_location) {
        tracing::info!(
            env = %options.env_location,
            path = %path.display(),
            "using config file from environment"
        );
        return Ok(Some(ConfigLocation {
            path,
            source: ConfigSource::Environment,
        }));
    }

    for (dir, source) in search_dirs(options) {
        for file_name in &options.config_file_names {
            let candidate = dir.join(file_name);
            tracing::debug!(path = %candidate.display(), "searching for config file");
            if candidate.is_file() {
                tracing::info!(path = %candidate.display(), %source, "found config file");
                return Ok(Some(ConfigLocation {
                    path: candidate,
                    source,
                }));
            }
        }
    }

    if options.strict {
        return Err(Error::NotFound(format!(
            "configuration file {} was not found in any of the usual locations; set {} instead",
            options.config_file_names.join(", "),
            options.env_location
        )));
    }

    tracing::warn!(
        env = %options.env_location,
        "no configuration file found; continuing with an empty document"
    );
    Ok(None)
}

fn env_path(env_location: &str) -> Option<PathBuf> {
    if env_location.is_empty() {
        return None;
    }
    std::env::var_os(env_location)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn search_dirs(options: &ProxyOptions) -> Vec<(PathBuf, ConfigSource)> {
    if !options.search_dirs.is_empty() {
        return options
            .search_dirs
            .iter()
            .cloned()
            .map(|dir| (dir, ConfigSource::SearchDirectory))
            .collect();
    }

    let mut dirs = Vec::new();
    if let Ok(work_dir) = std::env::current_dir() {
        dirs.push((work_dir, ConfigSource::WorkingDirectory));
    }
    if let Some(install) = install_dir() {
        dirs.push((install, ConfigSource::InstallDirectory));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::{discover, ConfigSource};
    use crate::config::options::ProxyOptions;
    use crate::error::Error;

    fn isolated_options(env_location: &str, dirs: &[&std::path::Path]) -> ProxyOptions {
        ProxyOptions::default()
            .with_env_location(env_location)
            .with_search_dirs(dirs.iter().map(|dir| dir.to_path_buf()))
    }

    #[test]
    fn environment_variable_wins_even_if_file_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.json"), "{}").expect("write");
        std::env::set_var("CONFIG_PROXY_TEST_DISCOVERY_ENV", "/nowhere/config.json");

        let options = isolated_options("CONFIG_PROXY_TEST_DISCOVERY_ENV", &[dir.path()]);
        let location = discover(&options)
            .expect("discovery should succeed")
            .expect("location expected");

        assert_eq!(location.source, ConfigSource::Environment);
        assert_eq!(
            location.path,
            std::path::PathBuf::from("/nowhere/config.json")
        );
        std::env::remove_var("CONFIG_PROXY_TEST_DISCOVERY_ENV");
    }

    #[test]
    fn empty_environment_variable_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.json"), "{}").expect("write");
        std::env::set_var("CONFIG_PROXY_TEST_DISCOVERY_EMPTY", "");

        let options = isolated_options("CONFIG_PROXY_TEST_DISCOVERY_EMPTY", &[dir.path()]);
        let location = discover(&options)
            .expect("discovery should succeed")
            .expect("location expected");

        assert_eq!(location.source, ConfigSource::SearchDirectory);
        assert_eq!(location.path, dir.path().join("config.json"));
        std::env::remove_var("CONFIG_PROXY_TEST_DISCOVERY_EMPTY");
    }

    #[test]
    fn directories_are_searched_before_file_names() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        std::fs::write(first.path().join("settings.json"), "{}").expect("write");
        std::fs::write(second.path().join("config.json"), "{}").expect("write");

        let options = isolated_options(
            "CONFIG_PROXY_TEST_DISCOVERY_UNSET",
            &[first.path(), second.path()],
        )
        .with_config_file_names(["config.json", "settings.json"]);
        let location = discover(&options)
            .expect("discovery should succeed")
            .expect("location expected");

        assert_eq!(location.path, first.path().join("settings.json"));
    }

    #[test]
    fn strict_mode_reports_the_env_variable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = isolated_options("CONFIG_PROXY_TEST_DISCOVERY_STRICT", &[dir.path()]);

        let error = discover(&options).expect_err("discovery should fail");
        assert!(matches!(error, Error::NotFound(_)));
        assert!(error.to_string().contains("CONFIG_PROXY_TEST_DISCOVERY_STRICT"));
    }

    #[test]
    fn lenient_mode_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = isolated_options("CONFIG_PROXY_TEST_DISCOVERY_LENIENT", &[dir.path()])
            .with_strict(false);

        assert!(discover(&options).expect("discovery should succeed").is_none());
    }

    #[test]
    fn source_display() {
        assert_eq!(ConfigSource::Environment.to_string(), "environment variable");
        assert_eq!(ConfigSource::WorkingDirectory.to_string(), "working directory");
    }
}
