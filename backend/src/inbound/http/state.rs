//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable against any store.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, LedgerQuery, LoginService, RequestLifecycleCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub lifecycle: Arc<dyn RequestLifecycleCommand>,
    pub queries: Arc<dyn LedgerQuery>,
}

impl HttpState {
    pub fn new(
        login: Arc<dyn LoginService>,
        accounts: Arc<dyn AccountCommand>,
        lifecycle: Arc<dyn RequestLifecycleCommand>,
        queries: Arc<dyn LedgerQuery>,
    ) -> Self {
        Self {
            login,
            accounts,
            lifecycle,
            queries,
        }
    }
}
