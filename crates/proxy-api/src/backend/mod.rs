//! Backend traits and implementations for the administration API.
//!
//! This module provides the [`Backend`] trait and implementations for
//! talking to a proxy manager. The primary implementation is
//! [`http::HttpBackend`], which speaks the Nginx Proxy Manager REST API.
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without network access:
//!
//! ```
//! use proxy_api::backend::{Backend, MockBackend};
//! use proxy_api::Credentials;
//! use reconcile::HostRecord;
//!
//! let mock = MockBackend::new("admin@example.com", "changeme");
//! mock.add_host(HostRecord { id: 1, ..HostRecord::default() });
//!
//! let token = mock.authenticate(&Credentials::new("admin@example.com", "changeme")).unwrap();
//! assert_eq!(mock.list_proxy_hosts(&token).unwrap().len(), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{Credentials, Token};
use reconcile::{HostRecord, HostUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Backend trait for the three API operations the tool needs.
///
/// This abstraction allows for different transports and enables testing.
pub trait Backend: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Error::Authentication` if the credentials are rejected.
    fn authenticate(&self, credentials: &Credentials) -> Result<Token>;

    /// List every proxy host, in the order the server returns them.
    fn list_proxy_hosts(&self, token: &Token) -> Result<Vec<HostRecord>>;

    /// Replace a proxy host's configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::HttpError` with the server's message if the update is
    /// rejected.
    fn update_proxy_host(&self, token: &Token, id: u64, update: &HostUpdate) -> Result<()>;
}

const MOCK_TOKEN: &str = "mock-token";

#[derive(Debug, Default)]
struct MockState {
    identity: String,
    secret: String,
    hosts: Vec<HostRecord>,
    updates: Vec<(u64, HostUpdate)>,
    failures: HashMap<u64, String>,
}

/// Mock backend for testing without network access.
///
/// Stores hosts in memory, records every update it receives, and can be
/// told to reject updates for specific host ids.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a mock that accepts exactly these credentials.
    #[must_use]
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        let state = MockState {
            identity: identity.into(),
            secret: secret.into(),
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Add a host to the listing.
    pub fn add_host(&self, host: HostRecord) {
        self.state().hosts.push(host);
    }

    /// Make updates for `id` fail with `message`.
    pub fn fail_updates_for(&self, id: u64, message: impl Into<String>) {
        self.state().failures.insert(id, message.into());
    }

    /// Every update received, in order.
    #[must_use]
    pub fn updates(&self) -> Vec<(u64, HostUpdate)> {
        self.state().updates.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_token(token: &Token) -> Result<()> {
        if *token == Token::new(MOCK_TOKEN) {
            Ok(())
        } else {
            Err(Error::http("HTTP 401: invalid token", Some(401)))
        }
    }
}

impl Backend for MockBackend {
    fn authenticate(&self, credentials: &Credentials) -> Result<Token> {
        let state = self.state();
        if credentials.identity == state.identity && credentials.secret == state.secret {
            Ok(Token::new(MOCK_TOKEN))
        } else {
            Err(Error::Authentication("Invalid email or password".to_string()))
        }
    }

    fn list_proxy_hosts(&self, token: &Token) -> Result<Vec<HostRecord>> {
        Self::check_token(token)?;
        Ok(self.state().hosts.clone())
    }

    fn update_proxy_host(&self, token: &Token, id: u64, update: &HostUpdate) -> Result<()> {
        Self::check_token(token)?;
        let mut state = self.state();
        state.updates.push((id, update.clone()));

        if let Some(message) = state.failures.get(&id) {
            return Err(Error::http(message.clone(), Some(400)));
        }
        if !state.hosts.iter().any(|h| h.id == id) {
            return Err(Error::http(format!("HTTP 404: host {id} not found"), Some(404)));
        }
        Ok(())
    }
}
