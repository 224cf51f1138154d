//! Builders wiring stores into the driving ports behind [`HttpState`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use volunteer_ledger::demo_data::{DemoSeedError, seed_demo_data};
use volunteer_ledger::domain::ports::{AccountRepository, LedgerRepository};
use volunteer_ledger::domain::{AccountService, Error, LedgerQueryService, RequestLifecycleService};
use volunteer_ledger::inbound::http::state::HttpState;
use volunteer_ledger::outbound::memory::InMemoryLedger;
use volunteer_ledger::outbound::persistence::{DieselAccountRepository, DieselLedgerRepository};

use super::ServerConfig;

/// Failures while preparing the ledger before serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bootstrap admin account: {0}")]
    BootstrapAdmin(#[source] Error),
    #[error(transparent)]
    DemoData(#[from] DemoSeedError),
}

/// Build services over `ledger` and `accounts`, then run startup tasks.
async fn assemble<L, A>(
    ledger: Arc<L>,
    accounts: Arc<A>,
    config: &ServerConfig,
) -> Result<HttpState, StartupError>
where
    L: LedgerRepository + 'static,
    A: AccountRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let account_service = Arc::new(AccountService::new(accounts, clock.clone()));
    let lifecycle = Arc::new(RequestLifecycleService::new(ledger.clone(), clock));
    let queries = Arc::new(LedgerQueryService::new(ledger));

    if let Some((username, password)) = &config.bootstrap_admin {
        let created = account_service
            .bootstrap_admin(username, password)
            .await
            .map_err(StartupError::BootstrapAdmin)?;
        if let Some(account) = created {
            info!(account_id = account.id.get(), "bootstrap admin created");
        }
    }
    if config.seed_demo_data {
        seed_demo_data(account_service.as_ref(), lifecycle.as_ref()).await?;
    }

    Ok(HttpState::new(
        account_service.clone(),
        account_service,
        lifecycle,
        queries,
    ))
}

/// Build HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory ledger.
pub(crate) async fn build_http_state(config: &ServerConfig) -> Result<HttpState, StartupError> {
    match &config.db_pool {
        Some(pool) => {
            info!(store = "postgres", "ledger store selected");
            assemble(
                Arc::new(DieselLedgerRepository::new(pool.clone())),
                Arc::new(DieselAccountRepository::new(pool.clone())),
                config,
            )
            .await
        }
        None => {
            info!(store = "memory", "ledger store selected");
            let store = Arc::new(InMemoryLedger::new());
            assemble(store.clone(), store, config).await
        }
    }
}
