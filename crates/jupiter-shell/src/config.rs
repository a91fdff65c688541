//! # Configuration Persistence
//!
//! Save and load the last picked server to/from disk.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::env::DesktopEnv;
use crate::error::ConfigError;

/// Schema tag written into every config file.
pub const CONFIG_VERSION: &str = "v1";

/// File name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "thrive.config";

/// Directory created under the platform data directory.
pub const APP_DIR_NAME: &str = "jupiter";

/// Persisted desktop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Schema tag, always [`CONFIG_VERSION`] when written by this build.
    pub version: String,

    /// Last server that passed the handshake and version check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_host_web_ui_url: Option<String>,
}

impl AppConfig {
    /// Record for a freshly picked server.
    #[must_use]
    pub fn for_server(url: impl Into<String>) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            remote_host_web_ui_url: Some(url.into()),
        }
    }
}

/// What the shell runs with: the stored server, or the hosted default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopConfig {
    /// URL the window opens on.
    pub web_ui_url: String,
    /// The built-in hosted web UI.
    pub hosted_global_web_ui_url: String,
    /// `web_ui_url` is a server the user picked, not the hosted default.
    #[serde(skip)]
    pub remembered: bool,
}

impl DesktopConfig {
    /// Config pointing at the hosted web UI.
    #[must_use]
    pub fn hosted_default(env: &DesktopEnv) -> Self {
        Self {
            web_ui_url: env.hosted_global_webui_url.clone(),
            hosted_global_web_ui_url: env.hosted_global_webui_url.clone(),
            remembered: false,
        }
    }
}

/// Reads and writes [`AppConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at `<dir>/thrive.config`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CONFIG_FILE_NAME),
        }
    }

    /// Store under the platform's per-user data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDataDir`] if the platform has none.
    pub fn user_default() -> Result<Self, ConfigError> {
        dirs::data_dir()
            .map(|p| Self::in_dir(p.join(APP_DIR_NAME)))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Returns the config file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored config.
    ///
    /// # Errors
    ///
    /// Any missing, unreadable, malformed or foreign file is an error; the
    /// caller decides on the fallback.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;

        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if config.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(config.version));
        }

        Ok(config)
    }

    /// Saves the config, replacing any previous content.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Write`] if the directory or file cannot be written.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let contents = serde_json::to_string(config)?;

        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::info!(path = ?self.path, "Saved configuration");
        Ok(())
    }

    /// Loads the runtime config, falling back to the hosted default.
    ///
    /// Losing the last-server preference is not fatal: the user can pick again.
    #[must_use]
    pub fn load_or_default(&self, env: &DesktopEnv) -> DesktopConfig {
        let fallback = DesktopConfig::hosted_default(env);

        match self.load() {
            Ok(AppConfig {
                remote_host_web_ui_url: Some(url),
                ..
            }) => {
                tracing::info!(path = ?self.path, %url, "Loaded configuration");
                DesktopConfig {
                    web_ui_url: url,
                    remembered: true,
                    ..fallback
                }
            }
            Ok(_) => {
                tracing::warn!(
                    path = ?self.path,
                    error = %ConfigError::MissingRemoteHost,
                    "Using hosted default"
                );
                fallback
            }
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = ?self.path, "Config file not found, using defaults");
                fallback
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to load config, using defaults");
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env() -> DesktopEnv {
        let vars = HashMap::from([(
            "HOSTED_GLOBAL_WEBUI_URL".to_string(),
            "https://hosted.example.com".to_string(),
        )]);
        DesktopEnv::load_from(None, vars).unwrap()
    }

    #[test]
    fn test_missing_file_falls_back_to_hosted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());

        assert!(matches!(store.load(), Err(ConfigError::Read { .. })));

        let config = store.load_or_default(&env());
        assert!(!config.remembered);
        assert_eq!(config.web_ui_url, "https://hosted.example.com");
        assert_eq!(config.hosted_global_web_ui_url, "https://hosted.example.com");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_hosted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
        assert_eq!(
            store.load_or_default(&env()).web_ui_url,
            "https://hosted.example.com"
        );
    }

    #[test]
    fn test_missing_remote_host_falls_back_to_hosted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        fs::write(store.path(), r#"{"version":"v1"}"#).unwrap();

        assert_eq!(
            store.load_or_default(&env()).web_ui_url,
            "https://hosted.example.com"
        );
    }

    #[test]
    fn test_unknown_schema_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"version":"v2","remoteHostWebUiUrl":"http://x.io"}"#,
        )
        .unwrap();

        assert!(matches!(
            store.load(),
            Err(ConfigError::UnsupportedVersion(v)) if v == "v2"
        ));
        assert_eq!(
            store.load_or_default(&env()).web_ui_url,
            "https://hosted.example.com"
        );
    }

    #[test]
    fn test_stored_server_wins_over_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        store
            .save(&AppConfig::for_server("http://my-thrive-instance.io"))
            .unwrap();

        let config = store.load_or_default(&env());
        assert!(config.remembered);
        assert_eq!(config.web_ui_url, "http://my-thrive-instance.io");
        assert_eq!(config.hosted_global_web_ui_url, "https://hosted.example.com");
    }

    #[test]
    fn test_save_writes_exact_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path().join("nested"));

        store
            .save(&AppConfig::for_server("http://my-thrive-instance.io"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            r#"{"version":"v1","remoteHostWebUiUrl":"http://my-thrive-instance.io"}"#
        );
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        fs::write(store.path(), "garbage that is longer than the new document").unwrap();

        store.save(&AppConfig::for_server("https://a.io")).unwrap();

        assert_eq!(
            store.load().unwrap().remote_host_web_ui_url.as_deref(),
            Some("https://a.io")
        );
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
