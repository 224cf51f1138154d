//! Backend entry-point: loads settings, prepares the ledger store and serves
//! the REST API with its health probes and OpenAPI docs.

mod server;

use std::path::Path;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use volunteer_ledger::inbound::http::health::HealthState;
use volunteer_ledger::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use volunteer_ledger::settings::LedgerSettings;

/// `Key::derive_from` panics on shorter master keys.
const MIN_SESSION_KEY_BYTES: usize = 32;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = LedgerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let allow_ephemeral = settings
        .allow_ephemeral_session_key()
        .map_err(std::io::Error::other)?;
    let key = load_session_key(&settings.session_key_file(), allow_ephemeral)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let cookie_secure = settings.cookie_secure().map_err(std::io::Error::other)?;
    let seed_demo_data = settings.seed_demo_data().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr)
        .with_demo_data(seed_demo_data);
    if let Some((username, password)) = settings.bootstrap_admin().map_err(std::io::Error::other)? {
        config = config.with_bootstrap_admin(username, password);
    }
    if let Some(database_url) = settings.database_url.as_deref() {
        run_pending_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    } else {
        warn!("no database configured; ledger state is held in memory and lost on exit");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!(%bind_addr, "volunteer ledger listening");
    server.await
}

fn load_session_key(path: &Path, allow_ephemeral: bool) -> std::io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.len() < MIN_SESSION_KEY_BYTES => Err(std::io::Error::other(format!(
            "session key at {} must hold at least {MIN_SESSION_KEY_BYTES} bytes",
            path.display()
        ))),
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            if cfg!(debug_assertions) || allow_ephemeral {
                warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}
