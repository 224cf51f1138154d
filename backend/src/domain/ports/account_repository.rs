//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, NewAccount, StoredAccount};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } =>
            "username {username} is already taken",
    }
}

/// Port for creating and looking up accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert the account and the profile its role requires in one
    /// transaction.
    async fn create(&self, account: NewAccount) -> Result<Account, AccountRepositoryError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredAccount>, AccountRepositoryError>;

    async fn find_by_id(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Account>, AccountRepositoryError>;
}
