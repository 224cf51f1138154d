//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`RequestLifecycleCommand`, `LedgerQuery`, `AccountCommand`,
//! `LoginService`) are called by inbound adapters. Driven ports
//! (`LedgerRepository`, `AccountRepository`, `CreditLedger`) are implemented
//! by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod credit_ledger;
mod ledger_query;
mod ledger_repository;
mod login_service;
mod request_lifecycle_command;

pub use account_command::{AccountCommand, NewAccountRequest};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
pub use credit_ledger::CreditLedger;
pub use ledger_query::{
    ConfirmedLogs, LeaderboardEntry, LedgerQuery, PendingStudentSummary, StudentAccolades,
};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{
    ApprovalCommit, LedgerRepository, LedgerRepositoryError, StudentLogs,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
pub use request_lifecycle_command::{ApprovalReceipt, RequestLifecycleCommand, SubmitHoursRequest};
