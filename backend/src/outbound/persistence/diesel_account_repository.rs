//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Creating an account also creates the profile its role needs, in the same
//! transaction: students get a `student_profiles` row with a zero total and
//! staff get a `staff_profiles` row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, NewAccount, Role, StoredAccount};

use super::models::{AccountRow, NewAccountRow, NewStaffProfileRow, NewStudentProfileRow};
use super::pool::DbPool;
use super::schema::{accounts, staff_profiles, student_profiles};

/// Diesel-backed implementation of the [`AccountRepository`] port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut pooled = self.pool.get().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let row = NewAccountRow {
            username: new_account.username.as_ref(),
            password_hash: new_account.password_hash.as_str(),
            role: new_account.role.as_str(),
            created_at: new_account.created_at,
        };
        let role = new_account.role;

        let created = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    let account = diesel::insert_into(accounts::table)
                        .values(&row)
                        .returning(AccountRow::as_returning())
                        .get_result::<AccountRow>(conn)
                        .await?;
                    match role {
                        Role::Student => {
                            diesel::insert_into(student_profiles::table)
                                .values(&NewStudentProfileRow {
                                    account_id: account.id,
                                })
                                .execute(conn)
                                .await?;
                        }
                        Role::Staff => {
                            diesel::insert_into(staff_profiles::table)
                                .values(&NewStaffProfileRow {
                                    account_id: account.id,
                                })
                                .execute(conn)
                                .await?;
                        }
                        Role::Admin => {}
                    }
                    Ok(account)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AccountRepositoryError::duplicate_username(new_account.username.to_string())
                }
                other => other.into(),
            })?;

        Ok(StoredAccount::try_from(created)?.account)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredAccount>, AccountRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = accounts::table
            .filter(accounts::username.eq(username))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(StoredAccount::try_from).transpose()?)
    }

    async fn find_by_id(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await?;
        let row = accounts::table
            .find(account_id.get())
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()?;
        Ok(row
            .map(StoredAccount::try_from)
            .transpose()?
            .map(|stored| stored.account))
    }
}
