//! # Errors
//!
//! Error types for the shell. Each concern gets its own enum; the UI only
//! ever sees the flattened [`PickServerResult`](crate::PickServerResult).

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single pick-server attempt.
///
/// The first failing stage short-circuits the flow, so an attempt produces
/// at most one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickServerError {
    /// The input could not be turned into a URL.
    #[error("malformed server URL '{input}': {reason}")]
    MalformedUrl {
        /// What the user typed.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The URL parsed but is not http or https.
    #[error("invalid protocol '{scheme}': only http and https servers are supported")]
    InvalidProtocol {
        /// The rejected scheme.
        scheme: String,
    },

    /// The probe did not get the expected redirect.
    #[error("{url} does not look like a Jupiter server instance (status {status})")]
    NotAServerInstance {
        /// URL that was requested.
        url: String,
        /// Status that came back instead of 301/302.
        status: u16,
    },

    /// Transport-level failure (DNS, refused connection, TLS, timeout).
    #[error("could not reach server: {0}")]
    NetworkError(String),

    /// The final handshake response carried no version marker.
    #[error("server response is missing the {header} header")]
    MissingVersionHeader {
        /// Name of the header that was expected.
        header: &'static str,
    },

    /// The remote version marker is not a semantic version.
    #[error("server reported an invalid version '{raw}'")]
    InvalidRemoteVersion {
        /// Raw header value.
        raw: String,
    },

    /// Major versions differ.
    #[error("server version {remote} is incompatible with this app version {local}")]
    IncompatibleVersion {
        /// The client's version.
        local: String,
        /// The server's version.
        remote: String,
    },

    /// The window refused to load the front door URL.
    #[error("could not open {url}: {reason}")]
    NavigationFailed {
        /// Front door URL.
        url: String,
        /// Window diagnostic.
        reason: String,
    },

    /// The chosen server could not be saved.
    #[error("could not save the selected server: {0}")]
    PersistFailed(String),
}

/// Errors reading or writing the persisted config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No per-user data directory on this platform.
    #[error("could not determine the user data directory")]
    NoDataDir,

    /// The file is missing or unreadable.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not the expected JSON shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The file carries a schema tag this build does not understand.
    #[error("unsupported config version '{0}'")]
    UnsupportedVersion(String),

    /// The file parsed but names no server.
    #[error("config has no remote host URL")]
    MissingRemoteHost,

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The record could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors loading the environment-driven settings at startup.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The layered sources could not be read or deserialized.
    #[error("invalid environment configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// The embedded client version is not a semantic version.
    #[error("client version '{raw}' is not a semantic version: {source}")]
    InvalidClientVersion {
        /// Raw value.
        raw: String,
        /// Parser diagnostic.
        #[source]
        source: semver::Error,
    },

    /// The hosted default web UI URL is not a valid http(s) URL.
    #[error("hosted web UI URL '{raw}' is invalid: {reason}")]
    InvalidHostedUrl {
        /// Raw value.
        raw: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A setting has a value the shell cannot run with.
    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// Setting name.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors at the IPC boundary.
#[derive(Error, Debug)]
pub enum IpcError {
    /// No handler is registered under this name.
    #[error("unknown IPC operation '{0}'")]
    UnknownOperation(String),

    /// The arguments do not match what the operation expects.
    #[error("bad arguments for '{operation}': {reason}")]
    BadArguments {
        /// Operation name.
        operation: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// The window could not be closed.
    #[error("exit failed: {0}")]
    Exit(String),

    /// The handler result could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}
