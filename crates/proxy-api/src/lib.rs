//! # proxy-api
//!
//! Blocking client for the Nginx Proxy Manager administration API.
//!
//! This crate provides the three operations the reconciliation engine
//! depends on:
//! - Authenticating with an admin identity and secret
//! - Listing proxy hosts
//! - Replacing a proxy host's configuration
//!
//! ## Example
//!
//! ```no_run
//! use proxy_api::{Client, Credentials};
//!
//! let client = Client::new("http://localhost:81").expect("valid URL");
//! let session = client
//!     .login(&Credentials::new("admin@example.com", "changeme"))
//!     .expect("login failed");
//!
//! for host in session.list_hosts().expect("listing failed") {
//!     println!("{} -> {}", host.label(), host.forward_target());
//! }
//! ```
//!
//! ## Sessions
//!
//! [`Client::login`] consumes the client and returns a [`Session`] holding
//! the bearer token. A session implements [`reconcile::HostUpdater`], so it
//! can be handed straight to the reconciliation driver.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::MockBackend;
pub use error::{Error, ErrorCategory, Result};
pub use types::{Credentials, Token};

use backend::Backend;
use backend::http::HttpBackend;
use reconcile::{HostRecord, HostUpdater, UpdateIntent};

/// Unauthenticated API client.
///
/// # Example
///
/// ```
/// use proxy_api::{Client, Credentials, MockBackend};
///
/// let mock = MockBackend::new("admin@example.com", "changeme");
/// let client = Client::with_backend(Box::new(mock));
///
/// let session = client.login(&Credentials::new("admin@example.com", "changeme")).unwrap();
/// assert!(session.list_hosts().unwrap().is_empty());
/// ```
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a client for the admin interface at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            backend: Box::new(HttpBackend::new(base_url)?),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Authenticate and return a session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Authentication` if the credentials are rejected, or a
    /// network error if the server cannot be reached.
    pub fn login(self, credentials: &Credentials) -> Result<Session> {
        log::info!("Authenticating as {}", credentials.identity);
        let token = self.backend.authenticate(credentials)?;
        Ok(Session {
            backend: self.backend,
            token,
        })
    }
}

/// Authenticated API session.
pub struct Session {
    backend: Box<dyn Backend>,
    token: Token,
}

impl Session {
    /// List every proxy host in server order.
    pub fn list_hosts(&self) -> Result<Vec<HostRecord>> {
        let hosts = self.backend.list_proxy_hosts(&self.token)?;
        log::info!("Listed {} proxy hosts", hosts.len());
        Ok(hosts)
    }

    /// Send an update intent as a full replacement.
    pub fn update_host(&self, intent: &UpdateIntent) -> Result<()> {
        self.backend
            .update_proxy_host(&self.token, intent.host_id, &intent.payload)
    }
}

impl HostUpdater for Session {
    fn update(&mut self, intent: &UpdateIntent) -> anyhow::Result<()> {
        self.update_host(intent)?;
        Ok(())
    }
}
