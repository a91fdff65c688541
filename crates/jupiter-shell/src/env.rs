//! # Environment Settings
//!
//! Startup settings supplied by build/deploy tooling: the hosted default
//! server, the front door path, the embedded client version and the initial
//! window size.
//!
//! Sources are layered with the `config` crate, lowest priority first:
//! built-in defaults, an optional `jupiter.toml`, then the process
//! environment (`HOSTED_GLOBAL_WEBUI_URL`, `FRONTDOOR_PATTERN`, ...).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use semver::Version;
use serde::Deserialize;
use url::Url;

use crate::error::EnvError;

/// Default hosted web UI when nothing else is configured.
pub const DEFAULT_HOSTED_GLOBAL_WEBUI_URL: &str = "https://jupiter.example.com";

/// Default path of the front door route on the web UI.
pub const DEFAULT_FRONTDOOR_PATTERN: &str = "/app/frontdoor";

/// Name of the optional settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "jupiter";

#[derive(Debug, Clone, Deserialize)]
struct RawEnv {
    hosted_global_webui_url: String,
    frontdoor_pattern: String,
    client_version: String,
    initial_window_width: u32,
    initial_window_height: u32,
    probe_timeout_secs: u64,
}

/// Validated environment settings.
///
/// Constructed once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct DesktopEnv {
    /// Default web UI, used when no server was ever picked.
    pub hosted_global_webui_url: String,
    /// Front door path, resolved against the picked server.
    pub frontdoor_pattern: String,
    /// Version of this client, compared against the server's.
    pub client_version: Version,
    /// Initial window width in logical pixels.
    pub initial_window_width: u32,
    /// Initial window height in logical pixels.
    pub initial_window_height: u32,
    /// Upper bound for each handshake request.
    pub probe_timeout: Duration,
}

impl DesktopEnv {
    /// Loads settings from defaults, `jupiter.toml` and the process environment.
    ///
    /// # Errors
    ///
    /// Fails if a source is unreadable, a value has the wrong type, or the
    /// client version is not a semantic version. A broken client version is
    /// a startup failure: the handshake could never pass with it.
    pub fn load() -> Result<Self, EnvError> {
        Self::build(None, None)
    }

    /// Loads settings from an explicit settings file and the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`DesktopEnv::load`], plus a missing settings file.
    pub fn load_with_file(settings_file: &Path) -> Result<Self, EnvError> {
        Self::build(Some(settings_file), None)
    }

    /// Loads settings with an explicit settings file and no process environment.
    ///
    /// # Errors
    ///
    /// Same as [`DesktopEnv::load`].
    pub fn load_from(
        settings_file: Option<&Path>,
        vars: HashMap<String, String>,
    ) -> Result<Self, EnvError> {
        Self::build(settings_file, Some(vars))
    }

    fn build(
        settings_file: Option<&Path>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self, EnvError> {
        let file = match settings_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(SETTINGS_FILE).required(false),
        };

        let raw: RawEnv = Config::builder()
            .set_default("hosted_global_webui_url", DEFAULT_HOSTED_GLOBAL_WEBUI_URL)?
            .set_default("frontdoor_pattern", DEFAULT_FRONTDOOR_PATTERN)?
            .set_default("client_version", env!("CARGO_PKG_VERSION"))?
            .set_default("initial_window_width", 1200)?
            .set_default("initial_window_height", 800)?
            .set_default("probe_timeout_secs", 30)?
            .add_source(file)
            .add_source(Environment::default().try_parsing(true).source(vars))
            .build()?
            .try_deserialize()?;

        Self::validate(raw)
    }

    fn validate(raw: RawEnv) -> Result<Self, EnvError> {
        let client_version = Version::parse(raw.client_version.trim()).map_err(|source| {
            EnvError::InvalidClientVersion {
                raw: raw.client_version.clone(),
                source,
            }
        })?;

        match Url::parse(&raw.hosted_global_webui_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(EnvError::InvalidHostedUrl {
                    raw: raw.hosted_global_webui_url,
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                })
            }
            Err(e) => {
                return Err(EnvError::InvalidHostedUrl {
                    raw: raw.hosted_global_webui_url,
                    reason: e.to_string(),
                })
            }
        }

        Self::validate_frontdoor_pattern(&raw.frontdoor_pattern)?;

        if raw.probe_timeout_secs == 0 {
            return Err(EnvError::InvalidSetting {
                key: "probe_timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(Self {
            hosted_global_webui_url: raw.hosted_global_webui_url,
            frontdoor_pattern: raw.frontdoor_pattern,
            client_version,
            initial_window_width: raw.initial_window_width,
            initial_window_height: raw.initial_window_height,
            probe_timeout: Duration::from_secs(raw.probe_timeout_secs),
        })
    }

    /// The pattern must be a reference relative to the picked server.
    fn validate_frontdoor_pattern(pattern: &str) -> Result<(), EnvError> {
        let invalid = |reason: String| EnvError::InvalidSetting {
            key: "frontdoor_pattern",
            reason: format!("'{pattern}': {reason}"),
        };

        if Url::parse(pattern).is_ok() || pattern.starts_with("//") {
            return Err(invalid("must not name its own host".to_string()));
        }

        let base = Url::parse("http://localhost/").map_err(|e| invalid(e.to_string()))?;
        base.join(pattern).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}
