//! # Jupiter Desktop
//!
//! Native desktop shell for the Jupiter web UI.
//!
//! ## Architecture
//!
//! The window reopens the last picked server's front door. Without one it
//! starts on a local server picker; picking a server runs the handshake in
//! [`jupiter_shell`] and, on success, replaces the page with the server's
//! front door.
//!
//! ## Modules
//!
//! - [`views`] - Page-level view components
//! - [`window`] - The webview as a navigation target

use std::sync::Arc;

use anyhow::Context;
use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use jupiter_shell::{ConfigStore, DesktopEnv, Shell, WindowNavigator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod views;
mod window;

use views::{ServerPicker, SharedShell};
use window::DesktopWindow;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jupiter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Jupiter Desktop");

    let env = DesktopEnv::load().context("failed to load environment settings")?;
    let store = ConfigStore::user_default().context("failed to locate config file")?;
    let (width, height) = (env.initial_window_width, env.initial_window_height);

    let shell = Shell::with_http(env, store, DesktopWindow).context("failed to start shell")?;

    // Configure desktop window
    let cfg = Config::new().with_window(
        WindowBuilder::new()
            .with_title("Jupiter")
            .with_inner_size(LogicalSize::new(f64::from(width), f64::from(height)))
            .with_min_inner_size(LogicalSize::new(640.0, 480.0)),
    );

    dioxus::LaunchBuilder::desktop()
        .with_cfg(cfg)
        .with_context(Arc::new(shell))
        .launch(App);

    Ok(())
}

/// Root application component.
///
/// Reopens the remembered server on launch; the picker is shown when no
/// server was ever picked, when the window cannot open it, or on request.
#[component]
fn App() -> Element {
    let shell = use_context::<SharedShell>();
    let mut startup = use_signal(|| shell.startup_url());

    use_effect(move || {
        let Some(url) = startup.read().clone() else {
            return;
        };
        if let Err(e) = shell.window().navigate(&url) {
            tracing::warn!(%url, error = %e, "Could not reopen stored server");
            startup.set(None);
        }
    });

    match startup() {
        Some(url) => rsx! {
            div {
                class: "server-picker",
                p { "Opening {url}..." }
                button {
                    r#type: "button",
                    class: "btn-secondary",
                    onclick: move |_: MouseEvent| startup.set(None),
                    "Choose another server"
                }
            }
        },
        None => rsx! {
            ServerPicker {}
        },
    }
}
