//! # Desktop Window
//!
//! [`WindowNavigator`] over the Dioxus desktop webview.

use dioxus::prelude::*;
use jupiter_shell::WindowNavigator;
use url::Url;

/// The main application window.
///
/// Looks the window up on every call, so it must be used from inside the
/// Dioxus runtime (event handlers and spawned tasks).
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopWindow;

impl WindowNavigator for DesktopWindow {
    /// Replaces the current page with `url`.
    ///
    /// Navigation is fire-and-forget: the webview only reports whether the
    /// script ran, never whether the page loaded, so a failed script is
    /// logged rather than returned.
    fn navigate(&self, url: &Url) -> Result<(), String> {
        let target = serde_json::to_string(url.as_str()).map_err(|e| e.to_string())?;
        tracing::info!(%url, "Navigating window");
        // The picker page is not kept in history.
        let eval = document::eval(&format!("window.location.replace({target});"));
        let url = url.to_string();
        spawn(async move {
            if let Err(e) = eval.await {
                tracing::warn!(%url, error = %e, "Navigation script failed");
            }
        });
        Ok(())
    }

    fn exit(&self) -> Result<(), String> {
        tracing::info!("Closing window");
        dioxus::desktop::window().close();
        Ok(())
    }
}
