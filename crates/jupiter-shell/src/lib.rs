//! # Jupiter Shell
//!
//! Native side of the Jupiter desktop app: lets the web UI point at a
//! user-chosen backend server.
//!
//! ## Pick server flow
//!
//! ```text
//! raw input ──▶ ServerUrl::parse ──▶ probe_server ──▶ check_compatibility
//!                                     (1 or 2 hops)          │
//!                      ConfigStore::save ◀── navigate ◀──────┘
//! ```
//!
//! Any stage failing ends the attempt with a [`PickServerError`]; the UI
//! sees it as a flat [`PickServerResult`].
//!
//! ## Modules
//!
//! - [`env`] - startup settings from defaults, `jupiter.toml` and env vars
//! - [`config`] - the persisted `thrive.config` file
//! - [`normalize`] - user input to canonical server URL
//! - [`probe`] - redirect handshake against the candidate
//! - [`version`] - major-version compatibility
//! - [`navigator`] - window seam and front door URL
//! - [`pick`] - the flow itself
//! - [`shell`] / [`ipc`] - process state and the UI-facing dispatch table
//!
//! ## Example
//!
//! ```rust,no_run
//! use jupiter_shell::{ConfigStore, DesktopEnv, Shell, WindowNavigator};
//!
//! struct Printer;
//!
//! impl WindowNavigator for Printer {
//!     fn navigate(&self, url: &url::Url) -> Result<(), String> {
//!         println!("{url}");
//!         Ok(())
//!     }
//!     fn exit(&self) -> Result<(), String> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let env = DesktopEnv::load()?;
//! let shell = Shell::with_http(env, ConfigStore::user_default()?, Printer)?;
//! let result = shell
//!     .dispatch("pick-server", serde_json::json!(["my-instance.io"]))
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod ipc;
pub mod navigator;
pub mod normalize;
pub mod pick;
pub mod probe;
pub mod shell;
pub mod version;

pub use config::{AppConfig, ConfigStore, DesktopConfig};
pub use env::DesktopEnv;
pub use error::{ConfigError, EnvError, IpcError, PickServerError};
pub use ipc::IpcOperation;
pub use navigator::{front_door_url, WindowNavigator};
pub use normalize::ServerUrl;
pub use pick::{PickServer, PickServerResult, PickStage};
pub use probe::{probe_server, HttpTransport, ProbeResponse, ProbeTransport};
pub use shell::Shell;
pub use version::check_compatibility;
