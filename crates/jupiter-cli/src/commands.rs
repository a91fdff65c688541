//! CLI command implementations.

use jupiter_shell::{
    check_compatibility, probe_server, ConfigError, ConfigStore, DesktopEnv, EnvError,
    HttpTransport, IpcError, PickServerError, PickServerResult, ServerUrl, Shell,
    WindowNavigator,
};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ipc(#[from] IpcError),

    #[error(transparent)]
    Pick(#[from] PickServerError),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from shell: {0}")]
    UnexpectedResponse(Value),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Stand-in window: there is no webview, so the front door is printed.
pub struct StdoutWindow;

impl WindowNavigator for StdoutWindow {
    fn navigate(&self, url: &Url) -> std::result::Result<(), String> {
        println!("Open {url}");
        Ok(())
    }

    fn exit(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

fn shell(env: DesktopEnv, store: ConfigStore) -> Result<Shell<StdoutWindow>> {
    Ok(Shell::with_http(env, store, StdoutWindow)?)
}

/// Validate a server and make it the one the app opens.
pub async fn pick(env: DesktopEnv, store: ConfigStore, server: &str) -> Result<()> {
    let shell = shell(env, store)?;
    let response = shell
        .dispatch("pick-server", Value::Array(vec![Value::from(server)]))
        .await?;

    match serde_json::from_value::<PickServerResult>(response.clone()) {
        Ok(PickServerResult::Ok) => {
            println!("Now using {}", shell.web_ui_url());
            Ok(())
        }
        Ok(PickServerResult::Error { error_msg }) => {
            tracing::debug!(%error_msg, "Pick rejected");
            Err(CliError::Rejected(error_msg))
        }
        Err(_) => Err(CliError::UnexpectedResponse(response)),
    }
}

/// Print the URL the app opens on.
pub async fn web_ui_url(env: DesktopEnv, store: ConfigStore) -> Result<()> {
    print_string(&shell(env, store)?, "get-web-ui-url").await
}

/// Print the hosted default URL.
pub async fn hosted_url(env: DesktopEnv, store: ConfigStore) -> Result<()> {
    print_string(&shell(env, store)?, "get-hosted-global-web-ui-url").await
}

async fn print_string(shell: &Shell<StdoutWindow>, operation: &str) -> Result<()> {
    match shell.dispatch(operation, Value::Null).await? {
        Value::String(url) => {
            println!("{url}");
            Ok(())
        }
        other => Err(CliError::UnexpectedResponse(other)),
    }
}

/// Run the handshake and version check without navigating or saving.
pub async fn probe(env: &DesktopEnv, server: &str) -> Result<String> {
    let server = ServerUrl::parse(server)?;
    let transport = HttpTransport::new(env.probe_timeout).map_err(EnvError::from)?;

    let raw = probe_server(&transport, &server).await?;
    println!("{server} reports version {raw}");

    let remote = check_compatibility(&env.client_version, &raw)?;
    println!(
        "Compatible with this client ({} vs {remote})",
        env.client_version
    );
    Ok(remote.to_string())
}

/// Show where the config lives and what it holds.
pub fn config_show(env: &DesktopEnv, store: &ConfigStore) {
    println!("Config file: {}", store.path().display());
    match store.load() {
        Ok(config) => println!(
            "Stored server: {}",
            config.remote_host_web_ui_url.as_deref().unwrap_or("(none)")
        ),
        Err(e) => println!("Stored server: (none, {e})"),
    }
    println!("Opens on: {}", store.load_or_default(env).web_ui_url);
    println!("Client version: {}", env.client_version);
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use jupiter_shell::probe::VERSION_HEADER;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn env() -> DesktopEnv {
        let vars = HashMap::from([("CLIENT_VERSION".to_string(), "3.1.0".to_string())]);
        DesktopEnv::load_from(None, vars).unwrap()
    }

    async fn versioned_server(version: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apps-latest-versions"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/web")
                    .insert_header(VERSION_HEADER, version),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_probe_reports_remote_version() {
        let mock_server = versioned_server("3.7.2").await;

        let version = probe(&env(), &mock_server.uri()).await.unwrap();
        assert_eq!(version, "3.7.2");
    }

    #[tokio::test]
    async fn test_probe_rejects_other_major() {
        let mock_server = versioned_server("2.0.0").await;

        let err = probe(&env(), &mock_server.uri()).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Pick(PickServerError::IncompatibleVersion { .. })
        ));
    }

    #[tokio::test]
    async fn test_pick_saves_server() {
        let mock_server = versioned_server("3.0.0").await;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());

        pick(env(), store.clone(), &mock_server.uri()).await.unwrap();

        assert_eq!(
            store.load().unwrap().remote_host_web_ui_url,
            Some(mock_server.uri())
        );
    }

    #[tokio::test]
    async fn test_pick_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());

        let err = pick(env(), store, "ftp://x.io").await.unwrap_err();
        assert!(matches!(&err, CliError::Rejected(msg) if msg.contains("invalid protocol")));
    }
}
