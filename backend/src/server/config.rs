//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use volunteer_ledger::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) bootstrap_admin: Option<(String, String)>,
    pub(crate) seed_demo_data: bool,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            bootstrap_admin: None,
            seed_demo_data: false,
        }
    }

    /// Back the ledger with PostgreSQL instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Create this administrator on startup when the username is free.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, username: &str, password: &str) -> Self {
        self.bootstrap_admin = Some((username.to_owned(), password.to_owned()));
        self
    }

    /// Seed the demo roster and requests before accepting traffic.
    #[must_use]
    pub fn with_demo_data(mut self, enabled: bool) -> Self {
        self.seed_demo_data = enabled;
        self
    }
}
