//! Accounts, roles, and usernames.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountId, PasswordHash};

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 20;

/// Role attached to an account at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

impl Role {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted role string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRoleError(other.to_owned())),
        }
    }
}

/// Validation errors for [`Username`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameValidationError {
    #[error("username must not be empty")]
    Empty,
    #[error("username must be at most {max} characters")]
    TooLong { max: usize },
    #[error("username may only contain letters, digits, '.', '_' or '-'")]
    InvalidCharacters,
}

/// Unique login handle.
///
/// ## Invariants
/// - Trimmed, 1..=20 characters.
/// - ASCII letters, digits, `.`, `_` and `-` only.
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::Username;
///
/// let name = Username::new("  student1 ").unwrap();
/// assert_eq!(name.as_ref(), "student1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "student1")]
pub struct Username(String);

impl Username {
    /// Validate and normalise a username.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UsernameValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UsernameValidationError::Empty);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UsernameValidationError::TooLong { max: USERNAME_MAX });
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
        if !trimmed.chars().all(allowed) {
            return Err(UsernameValidationError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Account together with its stored credential, as held by repositories.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAccount {
    pub account: Account,
    pub password_hash: PasswordHash,
}

/// Input for persisting a new account and its role profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub username: Username,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UsernameValidationError::Empty)]
    #[case("   ", UsernameValidationError::Empty)]
    #[case("abcdefghijklmnopqrstu", UsernameValidationError::TooLong { max: USERNAME_MAX })]
    #[case("bad name", UsernameValidationError::InvalidCharacters)]
    #[case("semi;colon", UsernameValidationError::InvalidCharacters)]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UsernameValidationError) {
        assert_eq!(Username::new(raw).expect_err("invalid username"), expected);
    }

    #[rstest]
    #[case("staff1")]
    #[case("a.b-c_d")]
    #[case("abcdefghijklmnopqrst")]
    fn accepts_valid_usernames(#[case] raw: &str) {
        assert_eq!(Username::new(raw).expect("valid username").as_ref(), raw);
    }

    #[rstest]
    #[case(Role::Student)]
    #[case(Role::Staff)]
    #[case(Role::Admin)]
    fn role_parses_its_own_representation(#[case] role: Role) {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("teacher".parse::<Role>().is_err());
    }
}
