//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//! - **memory**: process-local store used when no database is configured.
//!
//! Adapters translate between domain records and storage. Ledger rules stay
//! in the domain.

pub mod memory;
pub mod persistence;
