//! Domain primitives, services, and ports.
//!
//! Purpose: model the volunteer ledger independently of transport and
//! storage. Value types validate on construction; services implement the
//! driving ports in [`ports`] on top of the driven ports adapters provide.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Principal / Role: the acting account passed into every operation.
//! - ConfirmationRequest / ServiceLogEntry / Accolade: ledger records.
//! - AccoladeEngine: the single path that credits hours.
//! - RequestLifecycleService / LedgerQueryService / AccountService.

pub mod accolade;
pub mod accolade_engine;
pub mod account;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod hours;
pub mod ids;
pub mod leaderboard;
pub mod ledger_query_service;
pub mod password;
pub mod ports;
pub mod request;
pub mod request_lifecycle_service;
pub mod service_log;
pub mod trace_id;

pub use self::accolade::{
    Accolade, AccoladeKind, AccoladeLadder, NO_ACCOLADES, UnknownAccoladeError, render_badges,
};
pub use self::accolade_engine::{AccoladeEngine, CreditOutcome};
pub use self::account::{
    Account, NewAccount, Role, StoredAccount, USERNAME_MAX, UnknownRoleError, Username,
    UsernameValidationError,
};
pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError, Principal};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::hours::{
    DESCRIPTION_MAX, Description, MAX_HOURS_PER_REQUEST, REJECTION_REASON_MAX, RejectionReason,
    ServiceHours, ServiceHoursValidationError, TextTooLongError,
};
pub use self::ids::{AccoladeId, AccountId, LogEntryId, RequestId, StaffId, StudentId};
pub use self::leaderboard::{
    DEFAULT_LEADERBOARD_LIMIT, LeaderboardLimit, LeaderboardLimitError, MAX_LEADERBOARD_LIMIT,
};
pub use self::ledger_query_service::LedgerQueryService;
pub use self::password::{DEFAULT_HASH_ROUNDS, PasswordHash, PasswordHashFormatError};
pub use self::request::{
    ApprovalDraft, ConfirmationRequest, ConfirmationRequestDraft, NewConfirmationRequest,
    NotPendingError, RejectionDraft, RequestStatus, RequestValidationError, UnknownStatusError,
};
pub use self::request_lifecycle_service::RequestLifecycleService;
pub use self::service_log::{ServiceLogEntry, StaffSummary, StudentSummary};
pub use self::trace_id::TraceId;

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
