//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the ledger and account ports backed by
//! PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain records. Ledger rules stay in the domain; the only logic here is
//!   the conditional update that makes approval race-free.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: Diesel and pool failures map onto the port error
//!   enums in `diesel_error_mapping.rs`.
//!
//! # Example
//!
//! ```ignore
//! use volunteer_ledger::outbound::persistence::{DbPool, DieselLedgerRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/ledger")).await?;
//! let ledger = DieselLedgerRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_error_mapping;
mod diesel_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
