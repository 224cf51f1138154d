//! Process-local adapters used when no database is configured.

mod in_memory_ledger;

pub use in_memory_ledger::InMemoryLedger;
