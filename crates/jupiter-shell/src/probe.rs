//! # Server Probe
//!
//! Unauthenticated handshake that confirms a candidate URL hosts a Jupiter
//! server and learns its version.
//!
//! The server answers `GET /apps-latest-versions?distribution=web` with a
//! redirect carrying `X-Jupiter-Version`. Deployments behind a plain-http
//! edge first bounce the request to https; that one hop is followed
//! manually, never more.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::PickServerError;
use crate::normalize::ServerUrl;

/// Well-known endpoint probed on the candidate server.
pub const LATEST_VERSIONS_PATH: &str = "apps-latest-versions";

/// Distribution channel selected by the probe.
pub const DISTRIBUTION: &str = "web";

/// Header carrying the server's semantic version.
pub const VERSION_HEADER: &str = "X-Jupiter-Version";

/// The parts of a handshake response the probe looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Location` header, if any.
    pub location: Option<String>,
    /// Version marker header, if any.
    pub version: Option<String>,
}

impl ProbeResponse {
    fn is_redirect(&self) -> bool {
        self.status == StatusCode::MOVED_PERMANENTLY.as_u16()
            || self.status == StatusCode::FOUND.as_u16()
    }
}

/// Issues a single GET without following redirects.
///
/// Implemented over reqwest by [`HttpTransport`]; tests script responses.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Performs the request.
    ///
    /// # Errors
    ///
    /// Returns [`PickServerError::NetworkError`] on transport failure. HTTP
    /// error statuses are not errors here.
    async fn get_manual(&self, url: &Url) -> Result<ProbeResponse, PickServerError>;
}

/// reqwest-backed transport with redirects disabled.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Builds a client that never follows redirects and gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .user_agent(format!("jupiter-desktop/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn get_manual(&self, url: &Url) -> Result<ProbeResponse, PickServerError> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        let header = |name: &str| {
            res.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(ProbeResponse {
            status: res.status().as_u16(),
            location: header(LOCATION.as_str()),
            version: header(VERSION_HEADER),
        })
    }
}

/// Message for a transport failure, preferring the wrapped cause.
fn network_error(err: &reqwest::Error) -> PickServerError {
    PickServerError::NetworkError(root_cause(err))
}

/// Display of the innermost error in `err`'s source chain.
///
/// The outer layers of a reqwest error are generic ("client error
/// (Connect)"); the OS or resolver error sits at the bottom.
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// Builds `<base>/apps-latest-versions?distribution=web`.
#[must_use]
pub fn probe_url(server: &ServerUrl) -> Url {
    let mut url = server.with_path_suffix(LATEST_VERSIONS_PATH);
    url.query_pairs_mut().append_pair("distribution", DISTRIBUTION);
    url
}

/// Runs the handshake and returns the raw version header value.
///
/// # Errors
///
/// * [`PickServerError::NetworkError`] - a request failed in transit
/// * [`PickServerError::NotAServerInstance`] - a response was not 301/302
/// * [`PickServerError::MissingVersionHeader`] - final response had no marker
pub async fn probe_server<T>(transport: &T, server: &ServerUrl) -> Result<String, PickServerError>
where
    T: ProbeTransport + ?Sized,
{
    let url = probe_url(server);
    tracing::debug!(%url, "Probing server");

    let first = transport.get_manual(&url).await?;
    let mut last = expect_redirect(&url, first)?;

    if let Some(location) = last
        .location
        .as_deref()
        .filter(|l| l.starts_with("https://"))
    {
        let upgraded = Url::parse(location).map_err(|e| {
            tracing::debug!(%location, error = %e, "Unparseable upgrade location");
            PickServerError::NotAServerInstance {
                url: url.to_string(),
                status: last.status,
            }
        })?;
        tracing::debug!(%upgraded, "Following https upgrade redirect");

        let second = transport.get_manual(&upgraded).await?;
        last = expect_redirect(&upgraded, second)?;
    }

    last.version.ok_or(PickServerError::MissingVersionHeader {
        header: VERSION_HEADER,
    })
}

fn expect_redirect(url: &Url, res: ProbeResponse) -> Result<ProbeResponse, PickServerError> {
    if res.is_redirect() {
        Ok(res)
    } else {
        Err(PickServerError::NotAServerInstance {
            url: url.to_string(),
            status: res.status,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{redirect, ScriptedTransport};
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server(uri: &str) -> ServerUrl {
        ServerUrl::parse(uri).unwrap()
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_probe_url_selects_web_distribution() {
        assert_eq!(
            probe_url(&server("example.com")).as_str(),
            "http://example.com/apps-latest-versions?distribution=web"
        );
    }

    #[tokio::test]
    async fn test_redirect_with_version_header_succeeds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apps-latest-versions"))
            .and(query_param("distribution", "web"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/releases/web/3.1.0")
                    .insert_header(VERSION_HEADER, "3.1.0"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let version = probe_server(&transport(), &server(&mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(version, "3.1.0");
    }

    #[tokio::test]
    async fn test_moved_permanently_is_accepted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apps-latest-versions"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", "/releases/web/2.0.0")
                    .insert_header(VERSION_HEADER, "2.0.0"),
            )
            .mount(&mock_server)
            .await;

        let version = probe_server(&transport(), &server(&mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(version, "2.0.0");
    }

    #[tokio::test]
    async fn test_ok_response_is_not_a_server_instance() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = probe_server(&transport(), &server(&mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PickServerError::NotAServerInstance { status: 200, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_version_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/elsewhere"))
            .mount(&mock_server)
            .await;

        let err = probe_server(&transport(), &server(&mock_server.uri()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PickServerError::MissingVersionHeader {
                header: VERSION_HEADER
            }
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = probe_server(&transport(), &server(&format!("127.0.0.1:{port}")))
            .await
            .unwrap_err();

        let PickServerError::NetworkError(msg) = err else {
            panic!("expected a network error, got {err:?}");
        };
        assert!(msg.to_lowercase().contains("refused"), "message: {msg}");
    }

    #[test]
    fn test_root_cause_is_innermost_error() {
        #[derive(Debug)]
        struct Layer(&'static str, Option<Box<Layer>>);

        impl std::fmt::Display for Layer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.0)
            }
        }

        impl std::error::Error for Layer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                self.1
                    .as_deref()
                    .map(|l| l as &(dyn std::error::Error + 'static))
            }
        }

        let chain = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("dns error: no such host", None))),
            ))),
        );

        assert_eq!(root_cause(&chain), "dns error: no such host");
        assert_eq!(root_cause(&Layer("timed out", None)), "timed out");
    }

    #[tokio::test]
    async fn test_https_upgrade_is_followed_once() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(302, "https://upgraded.example.com", None)),
            Ok(redirect(301, "/releases/web/2.0.0", Some("2.0.0"))),
        ]);

        let version = probe_server(&transport, &server("upgraded.example.com"))
            .await
            .unwrap();

        assert_eq!(version, "2.0.0");
        assert_eq!(
            *transport.requests.lock(),
            vec![
                "http://upgraded.example.com/apps-latest-versions?distribution=web".to_string(),
                "https://upgraded.example.com/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_version_is_read_from_final_response_only() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(302, "https://secure.example.com/x", Some("9.9.9"))),
            Ok(redirect(302, "/releases/web/3.0.0", None)),
        ]);

        let err = probe_server(&transport, &server("secure.example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, PickServerError::MissingVersionHeader { .. }));
    }

    #[tokio::test]
    async fn test_upgrade_hop_must_redirect_too() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(302, "https://secure.example.com", None)),
            Ok(ProbeResponse {
                status: 404,
                location: None,
                version: Some("3.0.0".to_string()),
            }),
        ]);

        let err = probe_server(&transport, &server("secure.example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PickServerError::NotAServerInstance { status: 404, .. }
        ));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_only_one_upgrade_hop() {
        let transport = ScriptedTransport::new(vec![
            Ok(redirect(302, "https://a.example.com", None)),
            Ok(redirect(302, "https://b.example.com", Some("3.0.0"))),
            Ok(redirect(302, "https://c.example.com", Some("4.0.0"))),
        ]);

        let version = probe_server(&transport, &server("a.example.com"))
            .await
            .unwrap();

        assert_eq!(version, "3.0.0");
        assert_eq!(transport.request_count(), 2);
    }
}
