//! Authentication primitives: login credentials and the acting principal.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{AccountId, Error, Role};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
/// - The password buffer is zeroised on drop.
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("staff1", "staffpass").unwrap();
/// assert_eq!(creds.username(), "staff1");
/// assert_eq!(creds.password(), "staffpass");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// The authenticated actor on whose behalf an operation runs.
///
/// Every engine operation receives the principal explicitly; there is no
/// ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub account_id: AccountId,
    pub role: Role,
}

impl Principal {
    /// Build a principal for an authenticated account.
    pub const fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    /// Fail with `Forbidden` unless the principal holds `role`.
    pub fn require_role(&self, role: Role) -> Result<(), Error> {
        self.require_any_role(&[role])
    }

    /// Fail with `Forbidden` unless the principal holds one of `roles`.
    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), Error> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "role {} may not perform this action",
                self.role
            )))
        }
    }

    /// Whether the principal reviews requests or administers accounts.
    pub fn is_staff_or_admin(&self) -> bool {
        matches!(self.role, Role::Staff | Role::Admin)
    }
}
