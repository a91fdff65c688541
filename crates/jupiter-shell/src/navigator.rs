//! # Window Navigation
//!
//! The application window as seen by the shell, and the front door URL it
//! is sent to after a successful pick.

use url::Url;

use crate::env::DesktopEnv;
use crate::error::PickServerError;
use crate::normalize::ServerUrl;

/// Query parameter carrying the client version.
pub const CLIENT_VERSION_PARAM: &str = "clientVersion";

/// Query parameter carrying the initial window width.
pub const INITIAL_WINDOW_WIDTH_PARAM: &str = "initialWindowWidth";

/// The window the shell drives.
///
/// The desktop binary implements this over its webview; the CLI prints.
pub trait WindowNavigator {
    /// Loads `url` in the window.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the window cannot load the URL.
    fn navigate(&self, url: &Url) -> Result<(), String>;

    /// Quits the application.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the window cannot be closed.
    fn exit(&self) -> Result<(), String>;
}

/// Resolves the front door pattern against `server` and sets the client hints.
///
/// Existing `clientVersion`/`initialWindowWidth` pairs in the pattern are
/// replaced, other pairs are kept.
///
/// # Errors
///
/// Returns [`PickServerError::NavigationFailed`] if the pattern does not
/// resolve against `server`. [`DesktopEnv`] checks the pattern at startup, so
/// this is not expected in practice.
pub fn front_door_url(server: &ServerUrl, env: &DesktopEnv) -> Result<Url, PickServerError> {
    let mut url = server
        .as_url()
        .join(&env.frontdoor_pattern)
        .map_err(|e| PickServerError::NavigationFailed {
            url: server.to_string(),
            reason: format!("front door pattern '{}': {e}", env.frontdoor_pattern),
        })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != CLIENT_VERSION_PARAM && k != INITIAL_WINDOW_WIDTH_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(CLIENT_VERSION_PARAM, &env.client_version.to_string())
        .append_pair(
            INITIAL_WINDOW_WIDTH_PARAM,
            &env.initial_window_width.to_string(),
        );

    Ok(url)
}
