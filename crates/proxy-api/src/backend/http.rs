//! HTTP backend for the Nginx Proxy Manager REST API.
//!
//! This module provides the [`HttpBackend`] implementation, which uses three
//! endpoints:
//!
//! - `POST /api/tokens` - exchange identity/secret for a bearer token
//! - `GET /api/nginx/proxy-hosts` - list proxy hosts
//! - `PUT /api/nginx/proxy-hosts/{id}` - replace a proxy host

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{ApiErrorBody, Credentials, Token, TokenResponse};
use reconcile::{HostRecord, HostUpdate};
use ureq::Body;
use ureq::http::Response;

/// Longest slice of a non-JSON error body kept in messages.
const MAX_ERROR_BODY: usize = 200;

/// HTTP backend.
///
/// # Example
///
/// ```no_run
/// use proxy_api::backend::http::HttpBackend;
/// use proxy_api::backend::Backend;
/// use proxy_api::Credentials;
///
/// let backend = HttpBackend::new("http://localhost:81").unwrap();
/// let token = backend.authenticate(&Credentials::new("admin@example.com", "changeme")).unwrap();
/// let hosts = backend.list_proxy_hosts(&token).unwrap();
/// println!("Found {} proxy hosts", hosts.len());
/// ```
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Base URL of the admin interface, without trailing slash.
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for the admin interface at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` unless the URL starts with `http://` or
    /// `https://`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        // Non-2xx responses are read so the server's message can be reported
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();

        Ok(Self {
            agent: ureq::Agent::new_with_config(config),
            base_url,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tokens_url(&self) -> String {
        format!("{}/api/tokens", self.base_url)
    }

    fn proxy_hosts_url(&self) -> String {
        format!("{}/api/nginx/proxy-hosts", self.base_url)
    }

    fn proxy_host_url(&self, id: u64) -> String {
        format!("{}/api/nginx/proxy-hosts/{}", self.base_url, id)
    }
}

impl Backend for HttpBackend {
    fn authenticate(&self, credentials: &Credentials) -> Result<Token> {
        let url = self.tokens_url();
        log::debug!("POST {}", url);

        let response = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .send_json(credentials)?;

        let mut response = check_status(response).map_err(login_error)?;

        let body: TokenResponse = response.body_mut().read_json()?;
        if body.token.is_empty() {
            return Err(Error::InvalidResponse("empty token".to_string()));
        }
        Ok(Token::new(body.token))
    }

    fn list_proxy_hosts(&self, token: &Token) -> Result<Vec<HostRecord>> {
        let url = self.proxy_hosts_url();
        log::debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", token.bearer())
            .call()?;

        let text = check_status(response)?.body_mut().read_to_string()?;
        let hosts: Vec<HostRecord> = serde_json::from_str(&text)?;
        Ok(hosts)
    }

    fn update_proxy_host(&self, token: &Token, id: u64, update: &HostUpdate) -> Result<()> {
        let url = self.proxy_host_url(id);
        log::debug!("PUT {}", url);

        let response = self
            .agent
            .put(&url)
            .header("Accept", "application/json")
            .header("Authorization", token.bearer())
            .send_json(update)?;

        check_status(response)?;
        Ok(())
    }
}

/// Validate the scheme and strip trailing slashes.
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::InvalidUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Turn a non-2xx response into an error carrying the server's message.
fn check_status(mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.body_mut().read_to_string().unwrap_or_default();
    let code = status.as_u16();
    Err(Error::http(error_message(code, &body), Some(code)))
}

/// Rejections from the token endpoint mean bad credentials.
fn login_error(err: Error) -> Error {
    match err {
        Error::HttpError {
            message,
            status: Some(400 | 401 | 403),
        } => Error::Authentication(message),
        other => other,
    }
}

fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return format!("HTTP {}: {}", status, parsed.error.message);
    }

    let text = body.trim();
    if text.is_empty() {
        format!("HTTP {}", status)
    } else {
        let cut: String = text.chars().take(MAX_ERROR_BODY).collect();
        format!("HTTP {}: {}", status, cut)
    }
}
