//! # Pick Server Flow
//!
//! Normalize, probe, check version, then navigate and persist. The first
//! failing stage ends the attempt; nothing is written unless every stage
//! before persistence passed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ConfigStore};
use crate::env::DesktopEnv;
use crate::error::PickServerError;
use crate::navigator::{front_door_url, WindowNavigator};
use crate::normalize::ServerUrl;
use crate::probe::{probe_server, ProbeTransport};
use crate::version::check_compatibility;

/// Stages of a pick attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickStage {
    /// Turning input into a URL.
    Normalizing,
    /// Handshake against the candidate.
    Probing,
    /// Comparing major versions.
    CheckingVersion,
    /// Loading the front door and saving the choice.
    NavigatingAndPersisting,
    /// All stages passed.
    Done,
}

impl fmt::Display for PickStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normalizing => "normalizing",
            Self::Probing => "probing",
            Self::CheckingVersion => "checking-version",
            Self::NavigatingAndPersisting => "navigating-and-persisting",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Result shape handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PickServerResult {
    /// The window now shows the picked server.
    Ok,
    /// The attempt failed; the form stays enabled.
    Error {
        /// Human-readable reason.
        #[serde(rename = "errorMsg")]
        error_msg: String,
    },
}

impl<T> From<Result<T, PickServerError>> for PickServerResult {
    fn from(result: Result<T, PickServerError>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => Self::Error {
                error_msg: e.to_string(),
            },
        }
    }
}

/// Everything a pick attempt needs, borrowed for its duration.
pub struct PickServer<'a, T: ?Sized, W: ?Sized> {
    /// Startup settings.
    pub env: &'a DesktopEnv,
    /// HTTP seam for the handshake.
    pub transport: &'a T,
    /// Window to navigate.
    pub window: &'a W,
    /// Where the choice is saved.
    pub store: &'a ConfigStore,
}

impl<T, W> PickServer<'_, T, W>
where
    T: ProbeTransport + ?Sized,
    W: WindowNavigator + ?Sized,
{
    /// Runs one attempt and returns the normalized server on success.
    ///
    /// The window is navigated before the config is written; a crash in
    /// between leaves the previous server saved.
    ///
    /// # Errors
    ///
    /// The first failing stage's [`PickServerError`].
    pub async fn run(&self, input: &str) -> Result<ServerUrl, PickServerError> {
        let mut stage = PickStage::Normalizing;
        let outcome = self.run_stages(input, &mut stage).await;

        match &outcome {
            Ok(server) => tracing::info!(%server, "Picked server"),
            Err(e) => tracing::warn!(input, %stage, error = %e, "Pick server failed"),
        }
        outcome
    }

    async fn run_stages(
        &self,
        input: &str,
        stage: &mut PickStage,
    ) -> Result<ServerUrl, PickServerError> {
        let server = ServerUrl::parse(input)?;

        advance(stage, PickStage::Probing);
        let raw_version = probe_server(self.transport, &server).await?;

        advance(stage, PickStage::CheckingVersion);
        let remote = check_compatibility(&self.env.client_version, &raw_version)?;
        tracing::debug!(%server, %remote, local = %self.env.client_version, "Versions compatible");

        advance(stage, PickStage::NavigatingAndPersisting);
        let front_door = front_door_url(&server, self.env)?;
        self.window
            .navigate(&front_door)
            .map_err(|reason| PickServerError::NavigationFailed {
                url: front_door.to_string(),
                reason,
            })?;
        self.store
            .save(&AppConfig::for_server(server.to_string()))
            .map_err(|e| PickServerError::PersistFailed(e.to_string()))?;

        advance(stage, PickStage::Done);
        Ok(server)
    }
}

fn advance(stage: &mut PickStage, next: PickStage) {
    tracing::trace!(from = %stage, to = %next, "Pick server stage");
    *stage = next;
}
