//! Account administration and login.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, AccountRepository, AccountRepositoryError, LoginService, NewAccountRequest,
};
use crate::domain::{
    Account, DEFAULT_HASH_ROUNDS, Error, LoginCredentials, NewAccount, PasswordHash, Principal,
    Role, Username,
};

fn map_repository_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} is already taken"))
                .with_details(json!({ "field": "username" }))
        }
    }
}

/// Account service implementing [`AccountCommand`] and [`LoginService`].
#[derive(Clone)]
pub struct AccountService<A> {
    accounts: Arc<A>,
    clock: Arc<dyn Clock>,
    hash_rounds: u32,
}

impl<A> AccountService<A> {
    pub fn new(accounts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            clock,
            hash_rounds: DEFAULT_HASH_ROUNDS,
        }
    }

    /// Override the PBKDF2 round count applied to new passwords.
    pub fn with_hash_rounds(mut self, rounds: u32) -> Self {
        self.hash_rounds = rounds;
        self
    }
}

impl<A> AccountService<A>
where
    A: AccountRepository,
{
    async fn insert(&self, username: Username, password: &str, role: Role) -> Result<Account, Error> {
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty")
                .with_details(json!({ "field": "password" })));
        }
        let new_account = NewAccount {
            username,
            password_hash: PasswordHash::derive_with_rounds(password, self.hash_rounds),
            role,
            created_at: self.clock.utc(),
        };
        let account = self
            .accounts
            .create(new_account)
            .await
            .map_err(map_repository_error)?;
        info!(
            account_id = account.id.get(),
            role = account.role.as_str(),
            "account created"
        );
        Ok(account)
    }

    /// Create the configured administrator unless the username exists.
    ///
    /// Returns `None` when an account with that name is already present.
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, Error> {
        let username = Username::new(username).map_err(|err| {
            Error::invalid_request(format!("invalid bootstrap admin username: {err}"))
        })?;
        let existing = self
            .accounts
            .find_by_username(username.as_ref())
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            info!(username = %username, "bootstrap admin already present");
            return Ok(None);
        }
        self.insert(username, password, Role::Admin).await.map(Some)
    }

    /// Create an account without a calling principal. Used by startup
    /// seeding, which runs before any session exists.
    pub async fn provision(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Account, Error> {
        let username = Username::new(username).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "username" }))
        })?;
        self.insert(username, password, role).await
    }
}

#[async_trait]
impl<A> AccountCommand for AccountService<A>
where
    A: AccountRepository,
{
    async fn create_account(
        &self,
        principal: Principal,
        request: NewAccountRequest,
    ) -> Result<Account, Error> {
        principal.require_role(Role::Admin)?;
        self.provision(&request.username, &request.password, request.role)
            .await
    }
}

#[async_trait]
impl<A> LoginService for AccountService<A>
where
    A: AccountRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let stored = self
            .accounts
            .find_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?;
        match stored {
            Some(stored) if stored.password_hash.verify(credentials.password()) => {
                Ok(Principal::new(stored.account.id, stored.account.role))
            }
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}
