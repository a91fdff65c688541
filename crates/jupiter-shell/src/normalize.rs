//! # Server URL Normalization
//!
//! Turns free-form input ("thrive-test.com", "http://host:1234") into a
//! canonical `http(s)://host[:port]` URL before anything touches the network.

use std::fmt;

use url::Url;

use crate::error::PickServerError;

/// A validated, normalized server base URL.
///
/// Always http or https, with no credentials, query or fragment. Renders
/// without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl(Url);

impl ServerUrl {
    /// Normalizes raw user input into a server URL.
    ///
    /// # Errors
    ///
    /// * [`PickServerError::MalformedUrl`] - input is empty or does not parse
    /// * [`PickServerError::InvalidProtocol`] - scheme is not http/https
    pub fn parse(input: &str) -> Result<Self, PickServerError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PickServerError::MalformedUrl {
                input: input.to_string(),
                reason: "empty input".to_string(),
            });
        }

        let candidate = if is_bare_localhost(trimmed) {
            format!("http://{trimmed}")
        } else if let Some(rest) = trimmed.strip_prefix("//") {
            format!("http://{rest}")
        } else if has_explicit_scheme(trimmed) {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let mut url = Url::parse(&candidate).map_err(|e| PickServerError::MalformedUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PickServerError::InvalidProtocol {
                scheme: url.scheme().to_string(),
            });
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(PickServerError::MalformedUrl {
                input: input.to_string(),
                reason: "missing host".to_string(),
            });
        }

        // Both setters only fail for cannot-be-a-base URLs, ruled out above.
        let _ = url.set_username("");
        let _ = url.set_password(None);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// The underlying URL. Its path keeps the `/` the URL standard requires.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Joins extra path segments onto the base path.
    ///
    /// Unlike [`Url::join`], this keeps a sub-path deployment's prefix.
    #[must_use]
    pub fn with_path_suffix(&self, suffix: &str) -> Url {
        let mut url = self.0.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}/{}", suffix.trim_start_matches('/')));
        url
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.as_str();
        f.write_str(s.strip_suffix('/').unwrap_or(s))
    }
}

/// `localhost` or `localhost:<digits>` with nothing else.
fn is_bare_localhost(input: &str) -> bool {
    let Some(rest) = input.strip_prefix("localhost") else {
        return false;
    };
    match rest.strip_prefix(':') {
        None => rest.is_empty(),
        Some(port) => !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()),
    }
}

/// RFC 3986 scheme followed by `://`.
fn has_explicit_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
