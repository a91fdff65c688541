//! # Shell State
//!
//! The desktop process's state, built once at startup and handed to the
//! front-end. Holds the runtime config, which is replaced after every
//! successful pick.

use parking_lot::RwLock;
use url::Url;

use crate::config::{ConfigStore, DesktopConfig};
use crate::env::DesktopEnv;
use crate::error::{EnvError, PickServerError};
use crate::navigator::{front_door_url, WindowNavigator};
use crate::normalize::ServerUrl;
use crate::pick::PickServer;
use crate::probe::{HttpTransport, ProbeTransport};

/// Desktop shell state shared by the IPC handlers.
pub struct Shell<W> {
    env: DesktopEnv,
    store: ConfigStore,
    config: RwLock<DesktopConfig>,
    transport: Box<dyn ProbeTransport>,
    window: W,
}

impl<W: WindowNavigator> Shell<W> {
    /// Builds the shell, reading the stored config once.
    #[must_use]
    pub fn new(
        env: DesktopEnv,
        store: ConfigStore,
        transport: Box<dyn ProbeTransport>,
        window: W,
    ) -> Self {
        let config = store.load_or_default(&env);
        tracing::debug!(web_ui_url = %config.web_ui_url, "Shell initialized");
        Self {
            env,
            store,
            config: RwLock::new(config),
            transport,
            window,
        }
    }

    /// Builds the shell with the reqwest transport.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_http(env: DesktopEnv, store: ConfigStore, window: W) -> Result<Self, EnvError> {
        let transport = HttpTransport::new(env.probe_timeout)?;
        Ok(Self::new(env, store, Box::new(transport), window))
    }

    /// Startup settings.
    #[must_use]
    pub fn env(&self) -> &DesktopEnv {
        &self.env
    }

    /// Snapshot of the runtime config.
    #[must_use]
    pub fn config(&self) -> DesktopConfig {
        self.config.read().clone()
    }

    /// URL the window should show: the stored server or the hosted default.
    #[must_use]
    pub fn web_ui_url(&self) -> String {
        self.config.read().web_ui_url.clone()
    }

    /// The built-in hosted web UI.
    #[must_use]
    pub fn hosted_global_web_ui_url(&self) -> String {
        self.config.read().hosted_global_web_ui_url.clone()
    }

    /// Front door of the remembered server, where the window should open.
    ///
    /// `None` when no server was ever picked, or the stored one no longer
    /// parses; the front-end then shows the server picker.
    #[must_use]
    pub fn startup_url(&self) -> Option<Url> {
        let config = self.config();
        if !config.remembered {
            return None;
        }

        match ServerUrl::parse(&config.web_ui_url).and_then(|s| front_door_url(&s, &self.env)) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(web_ui_url = %config.web_ui_url, error = %e, "Ignoring stored server");
                None
            }
        }
    }

    /// The window this shell drives.
    pub fn window(&self) -> &W {
        &self.window
    }

    /// Runs one pick attempt and, on success, points the runtime config at it.
    ///
    /// # Errors
    ///
    /// The first failing stage's [`PickServerError`].
    pub async fn pick_server(&self, input: &str) -> Result<ServerUrl, PickServerError> {
        let server = PickServer {
            env: &self.env,
            transport: self.transport.as_ref(),
            window: &self.window,
            store: &self.store,
        }
        .run(input)
        .await?;

        let mut config = self.config.write();
        config.web_ui_url = server.to_string();
        config.remembered = true;
        Ok(server)
    }
}
